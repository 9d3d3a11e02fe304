use bcrypt::{hash, verify};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::error;

use crate::error::CustomError;

pub fn des_from_str<T: for<'a> Deserialize<'a>>(string: &str) -> Result<T, CustomError> {
    let body = if string.trim().is_empty() { "{}" } else { string };
    serde_json::from_str(body).map_err(|e| CustomError::Validation(format!("invalid body: {e}")))
}

pub fn ser_to_str<T: Serialize>(t: &T) -> Result<String, CustomError> {
    serde_json::to_string(t).map_err(CustomError::SerdeError)
}

pub fn encrypt(value: &str, cost: u32) -> Result<String, CustomError> {
    hash(value, cost).map_err(CustomError::HashError)
}

pub fn is_password_valid(value: &str, hashed: &str) -> bool {
    verify(value, hashed).unwrap_or(false)
}

pub fn extract_token(headers: &HashMap<String, String>) -> Option<String> {
    headers
        .get("authorization")
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Turns a handler result into a status line and JSON body.
pub fn respond<T: Serialize>(status: &'static str, result: Result<T, CustomError>) -> (String, String) {
    match result.and_then(|value| ser_to_str(&value)) {
        Ok(json) => (status.to_string(), json),
        Err(err) => error_response(&err),
    }
}

pub fn error_response(err: &CustomError) -> (String, String) {
    let status = err.status_line();
    if status == crate::constants::INTERNAL_ERROR {
        error!(error = ?err, "request failed");
    }
    let body = serde_json::json!({ "error": err.public_message() }).to_string();
    (status.to_string(), body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{INTERNAL_ERROR, NOT_FOUND};

    #[test]
    fn bearer_token_is_extracted() {
        let mut headers = HashMap::new();
        headers.insert("authorization".to_string(), "Bearer abc.def".to_string());
        assert_eq!(extract_token(&headers).as_deref(), Some("abc.def"));

        headers.insert("authorization".to_string(), "Basic abc".to_string());
        assert_eq!(extract_token(&headers), None);
    }

    #[test]
    fn server_errors_do_not_leak_detail() {
        let err = CustomError::DBError(sqlx::Error::PoolTimedOut);
        let (status, body) = error_response(&err);
        assert_eq!(status, INTERNAL_ERROR);
        assert_eq!(body, r#"{"error":"Server error"}"#);

        let (status, body) = error_response(&CustomError::NotFound("Asset not found".into()));
        assert_eq!(status, NOT_FOUND);
        assert_eq!(body, r#"{"error":"Asset not found"}"#);
    }
}
