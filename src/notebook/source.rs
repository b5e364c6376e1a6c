//! nbformat "multiline string" and MIME bundle values.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Text stored either as one string or as a list of line strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MultilineString(String);

impl MultilineString {
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl From<&str> for MultilineString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl<'de> Deserialize<'de> for MultilineString {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            One(String),
            Lines(Vec<String>),
        }

        Ok(match Repr::deserialize(deserializer)? {
            Repr::One(s) => Self(s),
            Repr::Lines(lines) => Self(lines.concat()),
        })
    }
}

/// Output data keyed by MIME type.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct MimeBundle(Map<String, Value>);

impl MimeBundle {
    #[inline]
    pub fn contains(&self, mime: &str) -> bool {
        self.0.contains_key(mime)
    }

    /// Textual payload for `mime`.
    ///
    /// Strings and line lists are joined; JSON payloads
    /// (`application/json` and friends) are serialized back to text.
    pub fn text(&self, mime: &str) -> Option<String> {
        match self.0.get(mime)? {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) if items.iter().all(Value::is_string) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .concat(),
            ),
            other => Some(other.to_string()),
        }
    }

    /// First MIME type of `priority` present in the bundle.
    pub fn pick<'a>(&self, priority: &[&'a str]) -> Option<&'a str> {
        priority.iter().copied().find(|mime| self.contains(mime))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_multiline_string_forms() {
        let one: MultilineString = serde_json::from_str(r#""a\nb""#).unwrap();
        let lines: MultilineString = serde_json::from_str(r#"["a\n", "b"]"#).unwrap();
        assert_eq!(one, lines);
        assert_eq!(one.as_str(), "a\nb");

        let empty: MultilineString = serde_json::from_str("[]").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_mime_bundle_text() {
        let bundle: MimeBundle = serde_json::from_str(
            r#"{
                "text/plain": ["1\n", "2"],
                "image/png": "iVBORw0KGgo=",
                "application/json": {"a": 1}
            }"#,
        )
        .unwrap();
        assert_eq!(bundle.text("text/plain").as_deref(), Some("1\n2"));
        assert_eq!(bundle.text("image/png").as_deref(), Some("iVBORw0KGgo="));
        assert_eq!(bundle.text("application/json").as_deref(), Some(r#"{"a":1}"#));
        assert_eq!(bundle.text("text/html"), None);
    }

    #[test]
    fn test_mime_bundle_pick() {
        let bundle: MimeBundle =
            serde_json::from_str(r#"{"text/plain": "x", "image/png": "y"}"#).unwrap();
        assert_eq!(bundle.pick(&["text/html", "image/png", "text/plain"]), Some("image/png"));
        assert_eq!(bundle.pick(&["text/latex"]), None);
    }
}
