// api/envelope.rs — The response wrapper every backend endpoint returns.
//
//   { "code": 200, "message": "...", "data": ..., "type": "SUCCESS", "timeMs": 12 }

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseType {
    Info,
    Warning,
    Error,
    Success,
    #[default]
    #[serde(other)]
    None,
}

fn default_code() -> i32 {
    200
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    #[serde(default = "default_code")]
    pub code:    i32,
    #[serde(default)]
    pub message: String,
    #[serde(default = "Option::default")]
    pub data:    Option<T>,
    #[serde(rename = "type", default)]
    pub kind:    ResponseType,
    #[serde(default)]
    pub time_ms: i64,
}

impl<T> Default for ApiResponse<T> {
    fn default() -> Self {
        Self {
            code: default_code(),
            message: String::new(),
            data: None,
            kind: ResponseType::None,
            time_ms: 0,
        }
    }
}

impl<T> ApiResponse<T> {
    /// 2xx code and not explicitly flagged as an error.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.code) && self.kind != ResponseType::Error
    }

    /// Unwrap the payload, turning a failed envelope into `Error::Api`.
    pub fn into_data(self) -> Result<Option<T>> {
        if self.is_success() {
            Ok(self.data)
        } else {
            Err(Error::Api { code: self.code, message: self.message })
        }
    }
}

/// Decode a response body. An empty body counts as a successful envelope
/// with no data (the delete endpoint can answer that way).
pub fn decode<T: DeserializeOwned>(body: &str) -> Result<ApiResponse<T>> {
    if body.trim().is_empty() {
        return Ok(ApiResponse::default());
    }
    Ok(serde_json::from_str(body)?)
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;

    use super::*;
    use crate::models::Game;

    #[test]
    fn test_success_envelope() {
        let body = r#"{"code":200,"message":"ok","data":[{"title":"A"}],"type":"SUCCESS","timeMs":3}"#;
        let env: ApiResponse<Vec<Game>> = decode(body).unwrap();
        assert!(env.is_success());
        assert_eq!(env.into_data().unwrap().unwrap()[0].title, "A");
    }

    #[test]
    fn test_missing_data_is_none() {
        let env: ApiResponse<Vec<Game>> = decode(r#"{"code":200,"message":"none"}"#).unwrap();
        assert_eq!(env.kind, ResponseType::None);
        assert!(env.into_data().unwrap().is_none());
    }

    #[test]
    fn test_error_type_fails_even_with_2xx() {
        let env: ApiResponse<Game> = decode(r#"{"code":200,"message":"boom","type":"ERROR"}"#).unwrap();
        assert_matches!(env.into_data(), Err(Error::Api { code: 200, .. }));
    }

    #[test]
    fn test_unknown_type_and_empty_body() {
        let env: ApiResponse<Game> = decode(r#"{"code":202,"type":"WHATEVER"}"#).unwrap();
        assert_eq!(env.kind, ResponseType::None);
        assert!(env.is_success());

        let env: ApiResponse<Game> = decode("  ").unwrap();
        assert!(env.is_success());
        assert!(env.data.is_none());
    }

    #[test]
    fn test_malformed_json() {
        assert_matches!(decode::<Game>("{not json"), Err(Error::Malformed(_)));
        assert_matches!(decode::<Vec<Game>>(r#"{"data": 5}"#), Err(Error::Malformed(_)));
    }
}
