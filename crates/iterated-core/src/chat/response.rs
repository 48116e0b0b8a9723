use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Error text returned for any failure inside the endpoint
pub const INTERNAL_SERVER_ERROR: &str = "Internal server error";

/// Format a time the way JavaScript's `toISOString` does
/// (`2024-01-01T12:00:00.000Z`).
pub fn iso_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Body returned by the chat endpoint.
///
/// `success` is the discriminator: `message`/`timestamp` accompany a success,
/// `error` accompanies a failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ChatResponse {
    /// Successful reply stamped with the current time
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: Some(message.into()),
            timestamp: Some(iso_timestamp(Utc::now())),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            message: None,
            timestamp: None,
            error: Some(error.into()),
        }
    }

    /// The generic failure body the endpoint sends with a 500
    pub fn internal_error() -> Self {
        Self::failure(INTERNAL_SERVER_ERROR)
    }

    /// Tutor text, present only when the response reports success and
    /// carries a message.
    pub fn reply_text(&self) -> Option<&str> {
        if self.success {
            self.message.as_deref()
        } else {
            None
        }
    }

    pub fn parsed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
    }
}

// Some backends send the timestamp as a number of seconds, or null.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ok_response_shape() {
        let response = ChatResponse::ok("Keep going");
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["message"], "Keep going");
        assert!(value.get("error").is_none());
        assert!(response.parsed_timestamp().is_some());
    }

    #[test]
    fn test_internal_error_shape() {
        let value = serde_json::to_value(ChatResponse::internal_error()).unwrap();
        assert_eq!(value, serde_json::json!({"success": false, "error": "Internal server error"}));
    }

    #[test]
    fn test_iso_timestamp_format() {
        let at = DateTime::parse_from_rfc3339("2024-03-05T07:08:09.123456Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(iso_timestamp(at), "2024-03-05T07:08:09.123Z");
    }

    #[test]
    fn test_reply_text_requires_success() {
        let failed = ChatResponse {
            success: false,
            message: Some(String::new()),
            timestamp: None,
            error: Some("boom".to_string()),
        };
        assert_eq!(failed.reply_text(), None);

        let missing = ChatResponse {
            success: true,
            message: None,
            timestamp: None,
            error: None,
        };
        assert_eq!(missing.reply_text(), None);
    }

    #[test]
    fn test_numeric_timestamp_and_null_error_accepted() {
        let body = r#"{"success": false, "message": "", "timestamp": 1234.5, "error": null}"#;
        let response: ChatResponse = serde_json::from_str(body).unwrap();
        assert_eq!(response.timestamp.as_deref(), Some("1234.5"));
        assert_eq!(response.error, None);
        assert!(response.parsed_timestamp().is_none());
    }
}
