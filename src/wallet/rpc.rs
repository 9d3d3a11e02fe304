use reqwest::Client;
use serde::{Deserialize, de::DeserializeOwned};
use serde_json::{Value, json};

use crate::error::CustomError;

#[derive(Deserialize)]
struct RpcResponse {
    result: Option<Value>,
    error: Option<RpcError>,
}

#[derive(Deserialize)]
struct RpcError {
    message: String,
}

/// One JSON-RPC 2.0 round trip, decoding `result` into `T`.
pub(crate) async fn call<T: DeserializeOwned>(
    client: &Client,
    url: &str,
    method: &str,
    params: Value,
) -> Result<T, CustomError> {
    let body = json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": method,
        "params": params,
    });

    let response = client
        .post(url)
        .json(&body)
        .send()
        .await
        .map_err(|e| CustomError::Upstream(format!("{method}: {e}")))?;

    if !response.status().is_success() {
        return Err(CustomError::Upstream(format!(
            "{method} returned {}",
            response.status()
        )));
    }

    let payload: RpcResponse = response
        .json()
        .await
        .map_err(|e| CustomError::Upstream(format!("{method}: {e}")))?;

    if let Some(err) = payload.error {
        return Err(CustomError::Upstream(format!("{method}: {}", err.message)));
    }
    let result = payload
        .result
        .ok_or_else(|| CustomError::Upstream(format!("{method}: empty result")))?;
    serde_json::from_value(result).map_err(|e| CustomError::Upstream(format!("{method}: {e}")))
}

/// Hex quantities can exceed any integer type; precision beyond f64 is not
/// needed for display.
pub(crate) fn hex_to_f64(raw: &str) -> Option<f64> {
    let digits = raw.trim().trim_start_matches("0x");
    if digits.is_empty() {
        return Some(0.0);
    }
    digits.chars().try_fold(0.0_f64, |acc, c| {
        c.to_digit(16).map(|d| acc * 16.0 + f64::from(d))
    })
}

#[cfg(test)]
mod tests {
    use super::hex_to_f64;

    #[test]
    fn parses_hex_quantities() {
        assert_eq!(hex_to_f64("0x0"), Some(0.0));
        assert_eq!(hex_to_f64("0x"), Some(0.0));
        assert_eq!(hex_to_f64("0xde0b6b3a7640000"), Some(1e18));
        assert_eq!(hex_to_f64("0xzz"), None);
    }
}
