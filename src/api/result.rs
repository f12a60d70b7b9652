use serde_json::Value;

use crate::error::{ClientError, NETWORK_MESSAGE};

/// Response body as received: the raw text, plus its JSON parse when the
/// text was valid JSON.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Body {
    pub data: Option<Value>,
    pub text: String,
}

impl Body {
    pub fn parse(text: String) -> Self {
        let data = if text.trim().is_empty() {
            None
        } else {
            serde_json::from_str(&text).ok()
        };
        Self { data, text }
    }

    /// Backend said no inside a success status (`{"ok": false}`).
    pub fn declares_failure(&self) -> bool {
        let flag = |key: &str| self.data.as_ref().and_then(|d| d.get(key)).and_then(Value::as_bool);
        flag("ok") == Some(false) || flag("success") == Some(false)
    }
}

/// Outcome of one network call. Exactly one variant, never a panic or an
/// `Err` the caller has to unwind.
#[derive(Debug, Clone, PartialEq)]
pub enum ApiResult<T> {
    Success {
        status: u16,
        data: T,
    },
    Failure {
        status: u16,
        data: Option<Value>,
        text: String,
    },
    NetworkError {
        message: String,
    },
}

impl<T> ApiResult<T> {
    pub fn is_ok(&self) -> bool {
        matches!(self, ApiResult::Success { .. })
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiResult::Success { status, .. } | ApiResult::Failure { status, .. } => Some(*status),
            ApiResult::NetworkError { .. } => None,
        }
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            ApiResult::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiResult<U> {
        match self {
            ApiResult::Success { status, data } => ApiResult::Success {
                status,
                data: f(data),
            },
            ApiResult::Failure { status, data, text } => ApiResult::Failure { status, data, text },
            ApiResult::NetworkError { message } => ApiResult::NetworkError { message },
        }
    }

    /// User-facing message for a non-success result: the backend's own
    /// `msg`/`error`/`message`, else the raw text of a non-JSON body, else
    /// `fallback`.
    pub fn error_message(&self, fallback: &str) -> Option<String> {
        match self {
            ApiResult::Success { .. } => None,
            ApiResult::NetworkError { .. } => Some(NETWORK_MESSAGE.to_string()),
            ApiResult::Failure { data, text, .. } => Some(backend_message(data.as_ref(), text, fallback)),
        }
    }

    pub fn into_result(self, fallback: &str) -> Result<T, ClientError> {
        let message = self.error_message(fallback);
        match self {
            ApiResult::Success { data, .. } => Ok(data),
            ApiResult::Failure { status, .. } => Err(ClientError::Backend {
                status,
                message: message.unwrap_or_else(|| fallback.to_string()),
            }),
            ApiResult::NetworkError { message: detail } => {
                log::warn!("Network failure surfaced to user: {}", detail);
                Err(ClientError::Network {
                    message: NETWORK_MESSAGE.to_string(),
                })
            }
        }
    }
}

impl ApiResult<Body> {
    /// Turns a raw success into a typed one. A success body that `decode`
    /// cannot make sense of is downgraded to a Failure carrying that body.
    pub fn decode<T>(self, decode: impl FnOnce(&Body) -> Option<T>) -> ApiResult<T> {
        match self {
            ApiResult::Success { status, data: body } => match decode(&body) {
                Some(value) => ApiResult::Success {
                    status,
                    data: value,
                },
                None => ApiResult::Failure {
                    status,
                    data: body.data,
                    text: body.text,
                },
            },
            ApiResult::Failure { status, data, text } => ApiResult::Failure { status, data, text },
            ApiResult::NetworkError { message } => ApiResult::NetworkError { message },
        }
    }
}

fn backend_message(data: Option<&Value>, text: &str, fallback: &str) -> String {
    let structured = data.and_then(|d| {
        ["msg", "error", "message"].iter().find_map(|key| {
            d.get(*key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
        })
    });
    if let Some(message) = structured {
        return message.to_string();
    }
    if data.is_none() && !text.trim().is_empty() {
        return text.trim().to_string();
    }
    fallback.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn failure(status: u16, text: &str) -> ApiResult<()> {
        let body = Body::parse(text.to_string());
        ApiResult::Failure {
            status,
            data: body.data,
            text: body.text,
        }
    }

    #[test]
    fn malformed_json_keeps_the_raw_text() {
        for text in ["<html>502</html>", "{\"ok\":", "not json", "   "] {
            let body = Body::parse(text.to_string());
            assert_eq!(body.data, None);
            assert_eq!(body.text, text);
        }
    }

    #[test]
    fn backend_message_is_preferred_verbatim() {
        let result = failure(401, r#"{"ok":false,"msg":"PIN incorrecto"}"#);
        assert_eq!(
            result.error_message("fallback").as_deref(),
            Some("PIN incorrecto")
        );

        let result = failure(400, r#"{"error":"missing tipo"}"#);
        assert_eq!(result.error_message("fallback").as_deref(), Some("missing tipo"));

        let result = failure(401, r#"{"ok":false,"message":"invalid credentials"}"#);
        assert_eq!(
            result.error_message("fallback").as_deref(),
            Some("invalid credentials")
        );
    }

    #[test]
    fn message_falls_back_to_text_then_generic() {
        let result = failure(502, "Bad Gateway");
        assert_eq!(result.error_message("fallback").as_deref(), Some("Bad Gateway"));

        let result = failure(500, r#"{"ok":false}"#);
        assert_eq!(result.error_message("fallback").as_deref(), Some("fallback"));

        let result = failure(500, "");
        assert_eq!(result.error_message("fallback").as_deref(), Some("fallback"));
    }

    #[test]
    fn network_errors_have_no_status() {
        let result: ApiResult<()> = ApiResult::NetworkError {
            message: "connection refused".to_string(),
        };
        assert_eq!(result.status(), None);
        assert_eq!(
            result.into_result("fallback"),
            Err(ClientError::Network {
                message: NETWORK_MESSAGE.to_string()
            })
        );
    }

    #[test]
    fn undecodable_success_becomes_failure() {
        let raw = ApiResult::Success {
            status: 200,
            data: Body::parse(r#"{"ok":true}"#.to_string()),
        };
        let typed: ApiResult<String> = raw.decode(|body| {
            body.data
                .as_ref()
                .and_then(|d| d.get("token"))
                .and_then(Value::as_str)
                .map(str::to_string)
        });
        assert_eq!(
            typed,
            ApiResult::Failure {
                status: 200,
                data: Some(json!({"ok": true})),
                text: r#"{"ok":true}"#.to_string(),
            }
        );
    }

    #[test]
    fn explicit_ok_false_is_detected() {
        assert!(Body::parse(r#"{"ok":false}"#.to_string()).declares_failure());
        assert!(Body::parse(r#"{"success":false}"#.to_string()).declares_failure());
        assert!(!Body::parse(r#"{"success":true}"#.to_string()).declares_failure());
        assert!(!Body::parse("[]".to_string()).declares_failure());
    }
}
