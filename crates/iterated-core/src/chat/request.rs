use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Body of `POST /api/chat`.
///
/// Every field defaults to empty so a body with missing fields still
/// deserializes; the endpoint does not validate values.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub answer: String,
    #[serde(default, rename = "sessionId")]
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
}

impl ChatRequest {
    /// Create a request carrying only the user's message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Default::default()
        }
    }

    /// Set the question/answer pair the session was started with
    pub fn with_problem(mut self, question: impl Into<String>, answer: impl Into<String>) -> Self {
        self.question = question.into();
        self.answer = answer.into();
        self
    }

    /// Set the session identifier
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Select the model family a real backend should use
    pub fn with_model_type(mut self, model_type: Option<String>) -> Self {
        self.model_type = model_type;
        self
    }

    pub fn with_api_key(mut self, api_key: Option<String>) -> Self {
        self.api_key = api_key;
        self
    }

    /// Build a request from arbitrary JSON without rejecting anything.
    ///
    /// String fields are taken when present, any other value or a missing
    /// field becomes empty. Only `null` is refused, since there is nothing to
    /// read fields from.
    pub fn from_json_lenient(value: &Value) -> Option<Self> {
        if value.is_null() {
            return None;
        }

        let text = |key: &str| {
            value
                .get(key)
                .and_then(Value::as_str)
                .map(str::to_string)
        };

        Some(Self {
            message: text("message").unwrap_or_default(),
            question: text("question").unwrap_or_default(),
            answer: text("answer").unwrap_or_default(),
            session_id: text("sessionId").unwrap_or_default(),
            model_type: text("model_type"),
            api_key: text("api_key"),
        })
    }
}

// api_key must never reach the logs
impl std::fmt::Debug for ChatRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatRequest")
            .field("message", &self.message)
            .field("question", &self.question)
            .field("answer", &self.answer)
            .field("session_id", &self.session_id)
            .field("model_type", &self.model_type)
            .field("api_key", &self.api_key.as_ref().map(|_| "***"))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_wire_field_names() {
        let request = ChatRequest::new("2+2?")
            .with_problem("What is 2+2?", "4")
            .with_session("abc");

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["message"], "2+2?");
        assert_eq!(value["sessionId"], "abc");
        assert!(value.get("session_id").is_none());
        assert!(value.get("model_type").is_none());
        assert!(value.get("api_key").is_none());
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let request: ChatRequest = serde_json::from_str(r#"{"message":"hi"}"#).unwrap();
        assert_eq!(request.message, "hi");
        assert_eq!(request.question, "");
        assert_eq!(request.session_id, "");
    }

    #[test]
    fn test_lenient_parsing_ignores_wrong_types() {
        let value = json!({"message": 42, "question": "q", "sessionId": "1", "extra": true});
        let request = ChatRequest::from_json_lenient(&value).unwrap();
        assert_eq!(request.message, "");
        assert_eq!(request.question, "q");
        assert_eq!(request.session_id, "1");

        assert!(ChatRequest::from_json_lenient(&json!([1, 2])).is_some());
        assert!(ChatRequest::from_json_lenient(&Value::Null).is_none());
    }

    #[test]
    fn test_debug_hides_api_key() {
        let request = ChatRequest::new("hi").with_api_key(Some("secret-key".to_string()));
        let debug = format!("{:?}", request);
        assert!(!debug.contains("secret-key"));
        assert!(debug.contains("***"));
    }
}
