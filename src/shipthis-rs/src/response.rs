use reqwest::StatusCode;
use serde_json::{json, Value};

use crate::{Result, ShipthisError};

/// A successful call: the HTTP status plus the unwrapped JSON payload
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

/// Map a raw HTTP response onto a result.
///
/// 401/403 are always authentication failures. 2xx bodies wrapped in the
/// `{"success": .., "data": ..}` envelope are unwrapped; `success: false` is a
/// request failure even on 2xx.
pub(crate) fn interpret(status: StatusCode, body: &[u8]) -> Result<ApiResponse> {
    let code = status.as_u16();

    match status {
        StatusCode::UNAUTHORIZED => {
            return Err(ShipthisError::Auth {
                status: code,
                message: "Authentication failed. Check your API key.".to_string(),
            })
        }
        StatusCode::FORBIDDEN => {
            return Err(ShipthisError::Auth {
                status: code,
                message: "Access denied. Check your permissions.".to_string(),
            })
        }
        _ => {}
    }

    if status.is_success() && body.iter().all(u8::is_ascii_whitespace) {
        return Ok(ApiResponse {
            status: code,
            data: Value::Null,
        });
    }

    let parsed: Option<Value> = serde_json::from_slice(body).ok();

    if !status.is_success() {
        let details = parsed.unwrap_or_else(|| json!({ "response": preview(body) }));
        let message = server_message(&details)
            .unwrap_or_else(|| format!("Request failed with status {}", code));
        return Err(ShipthisError::Request {
            status: code,
            message,
            details,
        });
    }

    let Some(result) = parsed else {
        return Err(ShipthisError::InvalidResponse {
            status: code,
            message: format!("Invalid JSON response: {}", preview(body)),
        });
    };

    let success = result.get("success").map(|v| v.as_bool() == Some(true));
    match success {
        None => Ok(ApiResponse {
            status: code,
            data: result,
        }),
        Some(true) => Ok(ApiResponse {
            status: code,
            data: result.get("data").cloned().unwrap_or(Value::Null),
        }),
        Some(false) => Err(ShipthisError::Request {
            status: code,
            message: server_message(&result).unwrap_or_else(|| "API call failed".to_string()),
            details: result,
        }),
    }
}

/// `errors[0].message`, falling back to a top-level `message`
fn server_message(body: &Value) -> Option<String> {
    let first_error = body
        .get("errors")
        .and_then(Value::as_array)
        .and_then(|errors| errors.first());
    if let Some(error) = first_error {
        return Some(
            error
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("Unknown error")
                .to_string(),
        );
    }
    body.get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn preview(body: &[u8]) -> String {
    String::from_utf8_lossy(body).chars().take(200).collect()
}
