//! HTTP client for the XSugar conversion service.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, trace};

use roundtrip_model::Direction;

use crate::error::{Result, ServiceError};

/// Response body of a conversion request.
///
/// A translation failure is still reported with HTTP 200, so `exception`
/// has to be checked explicitly.
#[derive(Debug, Deserialize)]
struct ConvertResponse {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    exception: Option<ConvertException>,
}

#[derive(Debug, Deserialize)]
struct ConvertException {
    #[serde(default)]
    cause: Option<String>,
}

/// Blocking client for the conversion endpoint.
#[derive(Debug, Clone)]
pub struct ConverterClient {
    client: Client,
    endpoint: String,
}

impl ConverterClient {
    /// Create a client posting to `endpoint` with the given request timeout.
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::Client(e.to_string()))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Convert `content` in `direction` using the grammar `grammar`.
    pub fn convert(&self, content: &str, direction: Direction, grammar: &str) -> Result<String> {
        debug!(
            endpoint = %self.endpoint,
            %direction,
            grammar,
            bytes = content.len(),
            "conversion request"
        );
        let response = self.post(content, direction, grammar)?;
        let status = response.status();
        let body = response.text()?;

        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        trace!(body = %body, "conversion response");
        parse_response(&body)
    }

    /// Lightweight liveness check: an empty conversion request that only has
    /// to be answered with a success status.
    pub fn probe(&self, grammar: &str) -> Result<()> {
        let response = self.post("", Direction::XmlToNonXml, grammar)?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(ServiceError::Status {
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            })
        }
    }

    fn post(
        &self,
        content: &str,
        direction: Direction,
        grammar: &str,
    ) -> Result<reqwest::blocking::Response> {
        let response = self
            .client
            .post(&self.endpoint)
            .form(&[
                ("content", content),
                ("type", grammar),
                ("direction", direction.as_str()),
            ])
            .send()?;
        Ok(response)
    }
}

/// Interpret a successful response body.
fn parse_response(body: &str) -> Result<String> {
    let response: ConvertResponse = serde_json::from_str(body)?;
    if let Some(exception) = response.exception {
        return Err(ServiceError::Translation {
            cause: exception
                .cause
                .unwrap_or_else(|| "unknown cause".to_string()),
        });
    }
    response
        .content
        .ok_or_else(|| ServiceError::Decode("response has neither content nor exception".into()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_content() {
        let content = parse_response(r#"{"content":"<=.1 τῶι"}"#).unwrap();
        assert_eq!(content, "<=.1 τῶι");
    }

    #[test]
    fn exception_wins_over_content() {
        let err = parse_response(r#"{"content":"","exception":{"cause":"line 3: bad token"}}"#)
            .unwrap_err();
        assert!(matches!(err, ServiceError::Translation { ref cause } if cause == "line 3: bad token"));
    }

    #[test]
    fn exception_without_cause_still_fails() {
        let err = parse_response(r#"{"exception":{}}"#).unwrap_err();
        assert!(matches!(err, ServiceError::Translation { .. }));
    }

    #[test]
    fn malformed_bodies_are_decode_errors() {
        assert!(matches!(
            parse_response("<html>oops</html>").unwrap_err(),
            ServiceError::Decode(_)
        ));
        assert!(matches!(
            parse_response("{}").unwrap_err(),
            ServiceError::Decode(_)
        ));
    }
}
