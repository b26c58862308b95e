//! Request parameter set
//!
//! Keys are unique and kept in ascending byte order, which is also the
//! canonical order used for signing. Callers never need to pre-sort.

use std::collections::btree_map::{self, BTreeMap};

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Caller-supplied request parameters, later extended into a signed envelope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestParams(BTreeMap<String, Value>);

impl RequestParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(key, value);
        self
    }

    /// Insert or overwrite a value, returning the previous one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// String form of a value, using the same coercion as signing.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.0.get(key).map(coerce_to_string)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate in canonical (ascending key) order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Pairs for a URL query string, values coerced exactly as for signing
    /// so the receiver can recompute the signature from the query alone.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        self.0.iter().map(|(key, value)| (key.clone(), coerce_to_string(value))).collect()
    }

    /// Render the parameters as a JSON object.
    pub fn to_json(&self) -> Value {
        Value::Object(self.0.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
    }

    pub fn into_inner(self) -> BTreeMap<String, Value> {
        self.0
    }
}

impl<K, V> FromIterator<(K, V)> for RequestParams
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Map<String, Value>> for RequestParams {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RequestParams {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Coerce a parameter value to the string form used for signing.
///
/// Strings are taken verbatim, integers use their decimal text, `true`
/// becomes `"1"`, `false` and `null` become `""`, and arrays/objects become
/// compact JSON. Floats follow [`float_text`].
pub fn coerce_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if n.is_f64() => float_text(f),
            _ => n.to_string(),
        },
        Value::Bool(true) => "1".to_string(),
        Value::Bool(false) | Value::Null => String::new(),
        compound @ (Value::Array(_) | Value::Object(_)) => compound.to_string(),
    }
}

/// Significant digits kept when a float is turned into text.
const FLOAT_DIGITS: usize = 14;

/// Float text as the deployed verifiers render it: at most 14 significant
/// digits with trailing zeros dropped, so `100.0` is `"100"` and `0.1 + 0.2`
/// is `"0.3"`. Decimal exponents outside `-4..=13` switch to `1.5E+20` form.
fn float_text(value: f64) -> String {
    if !value.is_finite() {
        return value.to_string();
    }
    if value == 0.0 {
        return if value.is_sign_negative() { "-0" } else { "0" }.to_string();
    }

    let scientific = format!("{:.*e}", FLOAT_DIGITS - 1, value);
    let Some((mantissa, exponent)) = scientific.split_once('e') else {
        return value.to_string();
    };
    let Ok(exponent) = exponent.parse::<i32>() else {
        return value.to_string();
    };

    let sign = if value < 0.0 { "-" } else { "" };
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let digits = match digits.trim_end_matches('0') {
        "" => "0",
        trimmed => trimmed,
    };

    if !(-4..14).contains(&exponent) {
        let (lead, rest) = digits.split_at(1);
        let rest = if rest.is_empty() { "0" } else { rest };
        let exp_sign = if exponent < 0 { '-' } else { '+' };
        return format!("{sign}{lead}.{rest}E{exp_sign}{}", exponent.unsigned_abs());
    }

    if exponent < 0 {
        let zeros = "0".repeat(exponent.unsigned_abs() as usize - 1);
        return format!("{sign}0.{zeros}{digits}");
    }

    let int_len = exponent as usize + 1;
    if digits.len() <= int_len {
        format!("{sign}{digits}{}", "0".repeat(int_len - digits.len()))
    } else {
        let (int_part, frac_part) = digits.split_at(int_len);
        format!("{sign}{int_part}.{frac_part}")
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn keys_iterate_in_ascending_order_regardless_of_insertion() {
        let params = RequestParams::new().with("zeta", 1).with("alpha", 2).with("Mid", 3);
        let keys: Vec<&str> = params.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Mid", "alpha", "zeta"]);
    }

    #[test]
    fn insert_overwrites_existing_key() {
        let mut params = RequestParams::new().with("a", "old");
        let previous = params.insert("a", "new");
        assert_eq!(previous, Some(json!("old")));
        assert_eq!(params.get_string("a").as_deref(), Some("new"));
        assert_eq!(params.len(), 1);
    }

    #[test]
    fn coercion_rules() {
        assert_eq!(coerce_to_string(&json!("text")), "text");
        assert_eq!(coerce_to_string(&json!(42)), "42");
        assert_eq!(coerce_to_string(&json!(-7)), "-7");
        assert_eq!(coerce_to_string(&json!(1.5)), "1.5");
        assert_eq!(coerce_to_string(&json!(true)), "1");
        assert_eq!(coerce_to_string(&json!(u64::MAX)), "18446744073709551615");
        assert_eq!(coerce_to_string(&json!(false)), "");
        assert_eq!(coerce_to_string(&Value::Null), "");
        assert_eq!(coerce_to_string(&json!([1, 2])), "[1,2]");
        assert_eq!(coerce_to_string(&json!({"k": "v"})), r#"{"k":"v"}"#);
    }

    #[test]
    fn integral_floats_drop_the_fraction() {
        assert_eq!(coerce_to_string(&json!(100.0)), "100");
        assert_eq!(coerce_to_string(&json!(-3.0)), "-3");
        assert_eq!(coerce_to_string(&json!(0.0)), "0");
        assert_eq!(coerce_to_string(&json!(1.5)), "1.5");
        assert_eq!(coerce_to_string(&json!(0.1)), "0.1");
        assert_eq!(coerce_to_string(&json!(12.25)), "12.25");
        assert_eq!(coerce_to_string(&json!(0.1 + 0.2)), "0.3");
        assert_eq!(coerce_to_string(&json!(-0.0005)), "-0.0005");
        assert_eq!(coerce_to_string(&json!(0.00001)), "1.0E-5");
        assert_eq!(coerce_to_string(&json!(1.5e20)), "1.5E+20");
        assert_eq!(coerce_to_string(&json!(1e14)), "1.0E+14");
        assert_eq!(coerce_to_string(&json!(12345678901234.0)), "12345678901234");
    }

    #[test]
    fn float_and_integer_forms_sign_alike() {
        let as_float = RequestParams::new().with("amount", 100.0);
        let as_int = RequestParams::new().with("amount", 100);
        assert_eq!(as_float.to_query_pairs(), as_int.to_query_pairs());
    }

    #[test]
    fn query_pairs_keep_null_as_empty() {
        let params =
            RequestParams::new().with("page", 2).with("q", "rust").with("unused", Value::Null);
        assert_eq!(
            params.to_query_pairs(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("q".to_string(), "rust".to_string()),
                ("unused".to_string(), String::new()),
            ]
        );
    }

    #[test]
    fn serializes_as_plain_object() {
        let params = RequestParams::new().with("b", 1).with("a", "x");
        let encoded = serde_json::to_string(&params).expect("serialize");
        assert_eq!(encoded, r#"{"a":"x","b":1}"#);

        let decoded: RequestParams = serde_json::from_str(&encoded).expect("deserialize");
        assert_eq!(decoded, params);
        assert_eq!(params.to_json(), json!({"a": "x", "b": 1}));
    }

    #[test]
    fn builds_from_iterator_and_json_map() {
        let from_pairs: RequestParams = vec![("x", 1), ("y", 2)].into_iter().collect();
        assert_eq!(from_pairs.len(), 2);

        let map = json!({"x": 1, "y": 2}).as_object().cloned().expect("object");
        assert_eq!(RequestParams::from(map), from_pairs);
    }
}
