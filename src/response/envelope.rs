use crate::request::types::CallbackName;
use crate::store::record::Record;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Content type of every response body, wrapped or not.
pub const CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Ok,
    Ng,
}

impl Status {
    /// `"ng"` maps to `Ng`; anything else is treated as `Ok`.
    pub fn coerce(raw: &str) -> Self {
        match raw {
            "ng" => Status::Ng,
            _ => Status::Ok,
        }
    }
}

/// The `{status, message, data}` document every request answers with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub status: Status,
    pub message: Option<String>,
    pub data: Option<Map<String, Value>>,
}

impl Envelope {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            status: Status::Ok,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn ng(message: impl Into<String>) -> Self {
        Self {
            status: Status::Ng,
            message: Some(message.into()),
            data: None,
        }
    }

    pub fn with_record(mut self, record: &Record) -> Self {
        self.data = Some(record.to_json_object());
        self
    }

    /// JSON text, or `callback(<json>)` when a callback name is given.
    pub fn render(&self, callback: Option<&CallbackName>) -> Result<String, serde_json::Error> {
        let json = serde_json::to_string(self)?;
        Ok(match callback {
            Some(callback) => format!("{}({})", callback.as_str(), json),
            None => json,
        })
    }
}

/// Builds and renders an envelope in one step.
pub fn build(
    status: &str,
    message: Option<&str>,
    data: Option<&Record>,
    callback: Option<&CallbackName>,
) -> Result<String, serde_json::Error> {
    Envelope {
        status: Status::coerce(status),
        message: message.map(str::to_string),
        data: data.map(Record::to_json_object),
    }
    .render(callback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_envelope_shape() {
        let body = build("ok", None, None, None).unwrap();

        assert_eq!(body, r#"{"status":"ok","message":null,"data":null}"#);
    }

    #[test]
    fn test_unknown_status_is_coerced_to_ok() {
        let body = build("maybe", Some("hi"), None, None).unwrap();

        let envelope: Envelope = serde_json::from_str(&body).unwrap();
        assert_eq!(envelope.status, Status::Ok);
        assert_eq!(envelope.message.as_deref(), Some("hi"));
    }

    #[test]
    fn test_ng_status() {
        let body = build("ng", Some("Data not found"), None, None).unwrap();

        assert!(body.contains(r#""status":"ng""#));
    }

    #[test]
    fn test_record_becomes_data_object() {
        let record: Record = [("a", "1"), ("c", "abc\ndef")].into_iter().collect();

        let body = Envelope::ok("Succeeded fetching data")
            .with_record(&record)
            .render(None)
            .unwrap();

        let value: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(value["data"]["a"], "1");
        assert_eq!(value["data"]["c"], "abc\ndef");
        // Rendered on one line even though a value contains a newline
        assert!(!body.contains('\n'));
    }

    #[test]
    fn test_callback_wrapping() {
        let callback = CallbackName::parse("__myCallback").unwrap();

        let body = Envelope::ng("None data").render(Some(&callback)).unwrap();

        assert!(body.starts_with("__myCallback({"));
        assert!(body.ends_with("})"));
        let inner = &body["__myCallback(".len()..body.len() - 1];
        let envelope: Envelope = serde_json::from_str(inner).unwrap();
        assert_eq!(envelope, Envelope::ng("None data"));
    }
}
