//! Conversions from external infrastructure errors into domain errors.

use reqwest::Error as HttpError;
use sigil_core::TransportError;
use sigil_domain::SigilError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub SigilError);

impl From<InfraError> for SigilError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<SigilError> for InfraError {
    fn from(value: SigilError) -> Self {
        InfraError(value)
    }
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → TransportError */
/* -------------------------------------------------------------------------- */

/// Message describing a failed HTTP exchange. Timeouts and connect failures
/// get fixed wording so diagnostics lines stay greppable.
pub fn describe_http_error(err: &HttpError) -> String {
    if err.is_timeout() {
        return "HTTP request timed out".into();
    }

    #[cfg(not(target_arch = "wasm32"))]
    if err.is_connect() {
        return "HTTP connection failure".into();
    }

    if let Some(status) = err.status() {
        return format!(
            "HTTP {} {}",
            status.as_u16(),
            status.canonical_reason().unwrap_or("unknown status")
        );
    }

    if err.is_decode() || err.is_body() {
        return format!("failed to read HTTP response body: {err}");
    }

    err.to_string()
}

impl From<&HttpError> for InfraError {
    fn from(value: &HttpError) -> Self {
        InfraError(SigilError::Transport(describe_http_error(value)))
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError::from(&value)
    }
}

/// Map a send/receive failure onto the port error.
pub fn transport_error(err: &HttpError) -> TransportError {
    TransportError::new(describe_http_error(err))
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest::{Client, StatusCode};
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    #[tokio::test]
    async fn http_status_maps_to_transport_message() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(StatusCode::SERVICE_UNAVAILABLE))
            .mount(&server)
            .await;

        let client = Client::builder().no_proxy().build().unwrap();
        let error =
            client.get(server.uri()).send().await.unwrap().error_for_status().unwrap_err();

        assert_eq!(describe_http_error(&error), "HTTP 503 Service Unavailable");
        let mapped: SigilError = InfraError::from(error).into();
        match mapped {
            SigilError::Transport(msg) => assert!(msg.contains("503")),
            other => panic!("expected transport error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn timeout_has_fixed_wording() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(500)))
            .mount(&server)
            .await;

        let client =
            Client::builder().no_proxy().timeout(Duration::from_millis(50)).build().unwrap();
        let error = client.get(server.uri()).send().await.unwrap_err();

        assert_eq!(transport_error(&error).message, "HTTP request timed out");
    }

    #[tokio::test]
    async fn connect_failure_has_fixed_wording() {
        // Bind then drop to get a port nothing listens on.
        let port = {
            let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
            listener.local_addr().unwrap().port()
        };

        let client = Client::builder().no_proxy().build().unwrap();
        let error = client.get(format!("http://127.0.0.1:{port}/")).send().await.unwrap_err();

        assert_eq!(transport_error(&error).message, "HTTP connection failure");
    }
}
