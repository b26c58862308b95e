//! Canonical signing string and digest
//!
//! The signing string is `secret + k1v1 + k2v2 + ... + secret` over the
//! parameters in ascending key order. Pairs with an empty key, or whose
//! string value starts with `@`, are left out. `_sign` itself is never part
//! of its own input.

use md5::{Digest, Md5};
use sigil_domain::constants::{SIGN_KEY, UNSIGNED_VALUE_PREFIX};
use sigil_domain::{coerce_to_string, RequestParams};

/// Build the exact byte sequence that gets hashed.
pub fn signing_string(params: &RequestParams, secret: &str) -> String {
    let mut out = String::with_capacity(secret.len() * 2 + params.len() * 16);
    out.push_str(secret);
    for (key, value) in params {
        if key == SIGN_KEY {
            continue;
        }
        let value = coerce_to_string(value);
        if key.is_empty() || value.starts_with(UNSIGNED_VALUE_PREFIX) {
            continue;
        }
        out.push_str(key);
        out.push_str(&value);
    }
    out.push_str(secret);
    out
}

/// Upper-case hex MD5 of `input`.
pub fn digest(input: &str) -> String {
    hex::encode_upper(Md5::digest(input.as_bytes()))
}

/// Signature of `params` under `secret`.
pub fn compute_signature(params: &RequestParams, secret: &str) -> String {
    digest(&signing_string(params, secret))
}
