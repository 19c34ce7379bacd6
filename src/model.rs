//! The letter content record.
//!
//! [`LetterContent`] is a flat value: every field is optional and absent
//! fields render as nothing. Content usually arrives as JSON produced by some
//! other system, so decoding is deliberately forgiving: a field of the wrong
//! type is treated as absent instead of failing the whole letter.

use std::fs;
use std::path::Path;

use log::debug;
use serde::Serialize;
use serde_json::Value;

use crate::error::LetterError;

/// Text of a single letter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LetterContent {
    pub date: String,
    pub recipient: Vec<String>,
    pub title: String,
    pub salutation: String,
    pub body: Vec<String>,
    pub closing: String,
    pub signature: Vec<String>,
}

impl LetterContent {
    /// Creates an empty letter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the date line and returns the updated letter.
    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    /// Sets the recipient lines and returns the updated letter.
    pub fn with_recipient<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.recipient = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the title and returns the updated letter.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Sets the salutation and returns the updated letter.
    pub fn with_salutation(mut self, salutation: impl Into<String>) -> Self {
        self.salutation = salutation.into();
        self
    }

    /// Sets the body paragraphs and returns the updated letter.
    pub fn with_body<I, S>(mut self, paragraphs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.body = paragraphs.into_iter().map(Into::into).collect();
        self
    }

    /// Sets the closing and returns the updated letter.
    pub fn with_closing(mut self, closing: impl Into<String>) -> Self {
        self.closing = closing.into();
        self
    }

    /// Sets the signature lines and returns the updated letter.
    pub fn with_signature<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.signature = lines.into_iter().map(Into::into).collect();
        self
    }

    /// Decodes a letter from an arbitrary JSON value.
    ///
    /// A non-object value yields an empty letter. Text fields that are not
    /// strings render empty, line fields that are not arrays render no lines,
    /// and non-string array items are skipped.
    pub fn from_value(value: &Value) -> Self {
        let Some(object) = value.as_object() else {
            debug!("Letter content is not a JSON object; rendering an empty letter.");
            return Self::default();
        };

        let text = |key: &str| match object.get(key) {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(s)) => s.clone(),
            Some(other) => {
                debug!("Field '{}' is not a string ({}); rendering it empty.", key, other);
                String::new()
            }
        };

        let lines = |key: &str| match object.get(key) {
            None | Some(Value::Null) => Vec::new(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| match item {
                    Value::String(s) => Some(s.clone()),
                    other => {
                        debug!("Skipping non-string item in '{}': {}", key, other);
                        None
                    }
                })
                .collect(),
            Some(other) => {
                debug!("Field '{}' is not a list ({}); rendering no lines.", key, other);
                Vec::new()
            }
        };

        Self {
            date: text("date"),
            recipient: lines("recipient"),
            title: text("title"),
            salutation: text("salutation"),
            body: lines("body"),
            closing: text("closing"),
            signature: lines("signature"),
        }
    }

    /// Parses JSON text and decodes it with [`LetterContent::from_value`].
    pub fn from_json_str(json: &str) -> Result<Self, LetterError> {
        let value: Value = serde_json::from_str(json).map_err(LetterError::Content)?;
        Ok(Self::from_value(&value))
    }

    /// Reads a JSON content file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LetterError> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|err| LetterError::io(path, err))?;
        Self::from_json_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_complete_record() {
        let content = LetterContent::from_value(&json!({
            "date": "16 October 2026",
            "recipient": ["Mr. John Doe", "Innovate Corp."],
            "title": "Proposal",
            "salutation": "Dear Mr. Doe,",
            "body": ["First.", "Second."],
            "closing": "Sincerely,",
            "signature": ["Jane Smith"]
        }));
        assert_eq!(content.date, "16 October 2026");
        assert_eq!(content.recipient.len(), 2);
        assert_eq!(content.body, vec!["First.", "Second."]);
        assert_eq!(content.signature, vec!["Jane Smith"]);
    }

    #[test]
    fn missing_fields_are_empty() {
        let content = LetterContent::from_value(&json!({ "title": "Only a title" }));
        assert_eq!(content.title, "Only a title");
        assert!(content.date.is_empty());
        assert!(content.recipient.is_empty());
        assert!(content.body.is_empty());
    }

    #[test]
    fn non_list_recipient_renders_no_lines() {
        let content = LetterContent::from_value(&json!({ "recipient": 42, "body": "text" }));
        assert!(content.recipient.is_empty());
        assert!(content.body.is_empty());
    }

    #[test]
    fn wrong_scalar_types_render_empty() {
        let content = LetterContent::from_value(&json!({ "date": 20240101, "closing": ["x"] }));
        assert!(content.date.is_empty());
        assert!(content.closing.is_empty());
    }

    #[test]
    fn non_string_items_are_skipped() {
        let content = LetterContent::from_value(&json!({ "signature": ["Jane", 7, null, "CEO"] }));
        assert_eq!(content.signature, vec!["Jane", "CEO"]);
    }

    #[test]
    fn non_object_is_an_empty_letter() {
        assert_eq!(LetterContent::from_value(&json!([1, 2])), LetterContent::default());
    }

    #[test]
    fn invalid_json_is_a_content_error() {
        let err = LetterContent::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, LetterError::Content(_)));
    }
}
