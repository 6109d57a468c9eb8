//! Field values, the copy-on-write value set, and per-field errors

use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Caller-supplied overrides keyed by field name
pub type InitialValues = BTreeMap<String, FieldValue>;

/// A file chosen in a file picker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileHandle {
    pub name: String,
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl FileHandle {
    /// Build a handle for a path, reading its size when the file exists
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        let size = std::fs::metadata(path).ok().map(|m| m.len());

        Self {
            name,
            path: path.to_string_lossy().into_owned(),
            size,
        }
    }
}

/// The current value of one field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
    File(FileHandle),
}

impl FieldValue {
    /// Empty string or null; required fields reject these
    pub fn is_empty(&self) -> bool {
        match self {
            FieldValue::Null => true,
            FieldValue::Text(s) => s.is_empty(),
            _ => false,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FieldValue::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FieldValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Truthiness used for checkbox state: false, null, "", 0 and NaN are falsy
    pub fn is_truthy(&self) -> bool {
        match self {
            FieldValue::Null => false,
            FieldValue::Bool(b) => *b,
            FieldValue::Number(n) => *n != 0.0 && !n.is_nan(),
            FieldValue::Text(s) => !s.is_empty(),
            FieldValue::File(_) => true,
        }
    }

    /// Text shown inside a control; null shows as empty
    pub fn display_value(&self) -> String {
        match self {
            FieldValue::Null => String::new(),
            FieldValue::Bool(b) => b.to_string(),
            FieldValue::Number(n) => format_number(*n),
            FieldValue::Text(s) => s.clone(),
            FieldValue::File(f) => f.name.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_value())
    }
}

impl From<&str> for FieldValue {
    fn from(s: &str) -> Self {
        FieldValue::Text(s.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(s: String) -> Self {
        FieldValue::Text(s)
    }
}

impl From<f64> for FieldValue {
    fn from(n: f64) -> Self {
        FieldValue::Number(n)
    }
}

impl From<i64> for FieldValue {
    fn from(n: i64) -> Self {
        FieldValue::Number(n as f64)
    }
}

impl From<bool> for FieldValue {
    fn from(b: bool) -> Self {
        FieldValue::Bool(b)
    }
}

impl From<FileHandle> for FieldValue {
    fn from(f: FileHandle) -> Self {
        FieldValue::File(f)
    }
}

/// Format a number the way form controls and messages show it
///
/// Integral values drop the fractional part (`0`, not `0.0`).
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n == 0.0 {
        "0".to_string()
    } else {
        n.to_string()
    }
}

/// Immutable mapping of field name to value
///
/// Every update produces a new mapping; `ptr_eq` tells whether two handles
/// refer to the same generation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues(Arc<BTreeMap<String, FieldValue>>);

impl FormValues {
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.0.get(name)
    }

    /// Return a new mapping with `name` set to `value`
    pub fn with(&self, name: &str, value: FieldValue) -> Self {
        let mut next = (*self.0).clone();
        next.insert(name.to_string(), value);
        Self(Arc::new(next))
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &FieldValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_map(&self) -> BTreeMap<String, FieldValue> {
        (*self.0).clone()
    }
}

impl FromIterator<(String, FieldValue)> for FormValues {
    fn from_iter<I: IntoIterator<Item = (String, FieldValue)>>(iter: I) -> Self {
        Self(Arc::new(iter.into_iter().collect()))
    }
}

impl Serialize for FormValues {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.as_ref().serialize(serializer)
    }
}

/// Validation errors, at most one per field name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.0.iter()
    }

    pub(crate) fn insert(&mut self, name: &str, message: String) {
        self.0.insert(name.to_string(), message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_untagged_values_from_yaml() {
        let map: BTreeMap<String, FieldValue> =
            serde_yml::from_str("a: hello\nb: 42\nc: true\nd: null\ne: 1.5").unwrap();
        assert_eq!(map["a"], FieldValue::Text("hello".into()));
        assert_eq!(map["b"], FieldValue::Number(42.0));
        assert_eq!(map["c"], FieldValue::Bool(true));
        assert_eq!(map["d"], FieldValue::Null);
        assert_eq!(map["e"], FieldValue::Number(1.5));
    }

    #[test]
    fn test_emptiness() {
        assert!(FieldValue::Null.is_empty());
        assert!(FieldValue::Text(String::new()).is_empty());
        assert!(!FieldValue::Bool(false).is_empty());
        assert!(!FieldValue::Number(0.0).is_empty());
    }

    #[test]
    fn test_truthiness() {
        assert!(!FieldValue::Number(0.0).is_truthy());
        assert!(!FieldValue::Number(f64::NAN).is_truthy());
        assert!(FieldValue::Text("no".into()).is_truthy());
        assert!(!FieldValue::Null.is_truthy());
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(120.0), "120");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_with_produces_new_generation() {
        let first: FormValues = [("a".to_string(), FieldValue::from("x"))].into_iter().collect();
        let second = first.with("a", FieldValue::from("y"));

        assert!(!first.ptr_eq(&second));
        assert_eq!(first.get("a"), Some(&FieldValue::from("x")));
        assert_eq!(second.get("a"), Some(&FieldValue::from("y")));

        let copy = second.clone();
        assert!(copy.ptr_eq(&second));
    }

    #[test]
    fn test_file_handle_for_missing_path() {
        let handle = FileHandle::from_path("/definitely/not/here/report.pdf");
        assert_eq!(handle.name, "report.pdf");
        assert_eq!(handle.size, None);
    }
}
