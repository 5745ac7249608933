//! Field values and the sources they are read from.
//!
//! A form field carries zero or more [`FieldValue`]s: a text input has one,
//! a multi-file input or a group of same-named inputs has several, and a
//! missing field has none. Rules see one element at a time through [`Input`].

use bytes::Bytes;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Mime type browsers report when they cannot sniff a file.
pub const OCTET_STREAM: &str = "application/octet-stream";

// ============================================================================
// FILE VALUE
// ============================================================================

/// An uploaded file: name, reported mime type, size and content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileValue {
    name: String,
    mime: String,
    size: u64,
    bytes: Bytes,
}

impl FileValue {
    /// Creates a file whose size is the length of its content.
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self {
            name: name.into(),
            mime: mime.into(),
            size: bytes.len() as u64,
            bytes,
        }
    }

    /// The empty entry a form submits for a file input with nothing selected.
    pub fn placeholder() -> Self {
        Self::new("", OCTET_STREAM, Bytes::new())
    }

    /// Overrides the reported size, for metadata-only files.
    #[must_use = "builder methods must be chained or built"]
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = size;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    /// Text after the last `.` of the name, or the whole name without one.
    pub fn extension(&self) -> &str {
        self.name.rsplit('.').next().unwrap_or_default()
    }

    /// `true` unless the browser fell back to `application/octet-stream`.
    pub fn has_known_type(&self) -> bool {
        self.mime != OCTET_STREAM
    }

    pub fn is_placeholder(&self) -> bool {
        self.name.is_empty() && self.size == 0
    }
}

// ============================================================================
// FIELD VALUE
// ============================================================================

/// One submitted value of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    File(FileValue),
}

impl FieldValue {
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::File(_) => None,
        }
    }

    pub fn as_file(&self) -> Option<&FileValue> {
        match self {
            Self::File(file) => Some(file),
            Self::Text(_) => None,
        }
    }

    /// Borrowed view handed to rules.
    pub fn as_input(&self) -> Input<'_> {
        match self {
            Self::Text(text) => Input::Text(text),
            Self::File(file) => Input::File(file),
        }
    }

    /// Converts a JSON value into field values.
    ///
    /// `null` yields nothing, arrays yield one value per element, strings are
    /// taken as-is and every other scalar or object is rendered as JSON text.
    pub fn from_json(value: &Value) -> Vec<Self> {
        match value {
            Value::Null => Vec::new(),
            Value::String(text) => vec![Self::Text(text.clone())],
            Value::Array(items) => items.iter().flat_map(Self::from_json).collect(),
            other => vec![Self::Text(other.to_string())],
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<FileValue> for FieldValue {
    fn from(value: FileValue) -> Self {
        Self::File(value)
    }
}

/// `true` when a field has no content a user typed or selected.
pub fn is_blank(values: &[FieldValue]) -> bool {
    values.iter().all(|value| value.as_input().is_empty())
}

// ============================================================================
// INPUT
// ============================================================================

/// A single element of a field, as seen by a rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    Absent,
    Text(&'a str),
    File(&'a FileValue),
}

impl<'a> Input<'a> {
    pub fn text(self) -> Option<&'a str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn file(self) -> Option<&'a FileValue> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    /// Absent, whitespace-only text, or a file input with nothing selected.
    pub fn is_empty(self) -> bool {
        match self {
            Self::Absent => true,
            Self::Text(text) => text.trim().is_empty(),
            Self::File(file) => file.is_placeholder(),
        }
    }

    pub(crate) fn kind(self) -> &'static str {
        match self {
            Self::Absent => "absent",
            Self::Text(_) => "text",
            Self::File(_) => "file",
        }
    }
}

// ============================================================================
// SOURCES
// ============================================================================

/// Where field values come from during a validation pass.
pub trait FieldSource: Send + Sync {
    /// Every value submitted under `key`, in submission order.
    fn get_all(&self, key: &str) -> Vec<FieldValue>;

    /// The first value submitted under `key`.
    fn get(&self, key: &str) -> Option<FieldValue> {
        self.get_all(key).into_iter().next()
    }
}

/// A source with no fields at all.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptySource;

impl FieldSource for EmptySource {
    fn get_all(&self, _key: &str) -> Vec<FieldValue> {
        Vec::new()
    }
}

impl FieldSource for Map<String, Value> {
    fn get_all(&self, key: &str) -> Vec<FieldValue> {
        self.get(key).map(FieldValue::from_json).unwrap_or_default()
    }
}

/// Multi-valued form data, keyed by field name in insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: IndexMap<String, Vec<FieldValue>>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value after any existing values of `key`.
    pub fn append(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.entries.entry(key.into()).or_default().push(value.into());
    }

    /// Replaces every value of `key`.
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<FieldValue>) {
        self.entries.insert(key.into(), vec![value.into()]);
    }

    /// Replaces every value of `key` with `values`.
    pub fn set_all(&mut self, key: impl Into<String>, values: Vec<FieldValue>) {
        self.entries.insert(key.into(), values);
    }

    pub fn remove(&mut self, key: &str) -> Option<Vec<FieldValue>> {
        self.entries.shift_remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn values_of(&self, key: &str) -> &[FieldValue] {
        self.entries.get(key).map(Vec::as_slice).unwrap_or_default()
    }
}

impl FieldSource for FormData {
    fn get_all(&self, key: &str) -> Vec<FieldValue> {
        self.values_of(key).to_vec()
    }
}

impl<K, V> FromIterator<(K, V)> for FormData
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut data = Self::new();
        for (key, value) in iter {
            data.append(key, value);
        }
        data
    }
}

// ============================================================================
// LOOKUP
// ============================================================================

/// Read access to the live form, for state the submitted data cannot carry.
///
/// Used by `accept` (checkbox state), `required` (file selection on inputs
/// absent from the data) and cross-field reads that miss in the data source.
pub trait FieldLookup: Send + Sync {
    fn raw_value(&self, _key: &str) -> Option<String> {
        None
    }

    fn is_checked(&self, _key: &str) -> Option<bool> {
        None
    }

    fn selected_files(&self, _key: &str) -> usize {
        0
    }
}

/// A lookup that knows nothing; every question falls back to the data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl FieldLookup for NoLookup {}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json() {
        assert!(FieldValue::from_json(&Value::Null).is_empty());
        assert_eq!(FieldValue::from_json(&json!("a")), vec![FieldValue::text("a")]);
        assert_eq!(FieldValue::from_json(&json!(42)), vec![FieldValue::text("42")]);
        assert_eq!(FieldValue::from_json(&json!(true)), vec![FieldValue::text("true")]);
        assert_eq!(
            FieldValue::from_json(&json!(["a", 1])),
            vec![FieldValue::text("a"), FieldValue::text("1")]
        );
    }

    #[test]
    fn test_form_data_multi_value() {
        let mut data = FormData::new();
        data.append("tags", "a");
        data.append("tags", "b");
        data.set("name", "alice");

        assert_eq!(data.get_all("tags").len(), 2);
        assert_eq!(data.get("tags"), Some(FieldValue::text("a")));
        assert_eq!(data.get("name"), Some(FieldValue::text("alice")));
        assert!(data.get_all("missing").is_empty());
        assert_eq!(data.keys().collect::<Vec<_>>(), vec!["tags", "name"]);
    }

    #[test]
    fn test_blank_detection() {
        assert!(is_blank(&[]));
        assert!(is_blank(&[FieldValue::text("   ")]));
        assert!(is_blank(&[FieldValue::File(FileValue::placeholder())]));
        assert!(!is_blank(&[FieldValue::text(" x ")]));
        assert!(!is_blank(&[FieldValue::File(FileValue::new("a.png", "image/png", vec![1u8]))]));
    }

    #[test]
    fn test_file_extension() {
        let file = FileValue::new("photo.final.JPG", "image/jpeg", Vec::<u8>::new());
        assert_eq!(file.extension(), "JPG");
        let bare = FileValue::new("README", "text/plain", Vec::<u8>::new());
        assert_eq!(bare.extension(), "README");
        assert!(!FileValue::placeholder().has_known_type());
    }
}
