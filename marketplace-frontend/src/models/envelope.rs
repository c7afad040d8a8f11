use serde::{Deserialize, Serialize};

/// Response envelope shared by every backend endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub status_code: u16,
    pub timestamp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub data: T,
}

/// Error bodies carry the envelope without `data`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct ErrorEnvelope {
    #[serde(default)]
    pub message: Option<serde_json::Value>,
}

impl ErrorEnvelope {
    /// NestJS-style validation errors send `message` as a list.
    pub fn message_text(&self) -> Option<String> {
        match self.message.as_ref()? {
            serde_json::Value::String(text) => Some(text.clone()),
            serde_json::Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            other => Some(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_envelope() {
        let body = r#"{"statusCode":200,"timestamp":"2026-10-18T09:00:00.000Z","data":{"id":"1"}}"#;
        let response: ApiResponse<serde_json::Value> = serde_json::from_str(body).unwrap();

        assert_eq!(response.status_code, 200);
        assert_eq!(response.message, None);
        assert_eq!(response.data["id"], "1");
    }

    #[test]
    fn error_message_may_be_a_list() {
        let single: ErrorEnvelope =
            serde_json::from_str(r#"{"statusCode":401,"message":"Invalid credentials"}"#).unwrap();
        assert_eq!(single.message_text().as_deref(), Some("Invalid credentials"));

        let many: ErrorEnvelope =
            serde_json::from_str(r#"{"message":["email must be an email","password is too short"]}"#)
                .unwrap();
        assert_eq!(
            many.message_text().as_deref(),
            Some("email must be an email, password is too short")
        );

        assert_eq!(ErrorEnvelope::default().message_text(), None);
    }
}
