//! Insertion-ordered header fields.
//!
//! Unlike [`http::HeaderMap`], [`HeaderFields`] keeps the exact spelling of every field name
//! and the order the fields arrived in, so a message can be written back to the wire the way
//! it was received. Name lookups are ASCII case-insensitive.

use std::fmt;

/// A single `name: value` header field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderField {
    name: String,
    value: String,
}

impl HeaderField {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &str {
        &self.value
    }
}

/// Ordered collection of header fields where a repeated name overwrites the earlier value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderFields {
    fields: Vec<HeaderField>,
}

impl HeaderFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|field| field.name.eq_ignore_ascii_case(name))
    }

    /// Returns the value stored for `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name).map(|index| self.fields[index].value.as_str())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Stores `value` under `name` and returns the index of the field.
    ///
    /// An existing field with the same name keeps its position and spelling and only has its
    /// value replaced; otherwise the field is appended.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> usize {
        let name = name.into();
        let value = value.into();
        match self.position(&name) {
            Some(index) => {
                self.fields[index].value = value;
                index
            }
            None => {
                self.fields.push(HeaderField { name, value });
                self.fields.len() - 1
            }
        }
    }

    /// Overwrites the value of an existing field. Returns `false` when `name` is absent.
    pub fn set_existing(&mut self, name: &str, value: impl Into<String>) -> bool {
        match self.position(name) {
            Some(index) => {
                self.fields[index].value = value.into();
                true
            }
            None => false,
        }
    }

    /// Appends `continuation` verbatim to the value of the field at `index`.
    pub(crate) fn extend_value(&mut self, index: usize, continuation: &str) -> bool {
        match self.fields.get_mut(index) {
            Some(field) => {
                field.value.push_str(continuation);
                true
            }
            None => false,
        }
    }

    /// Removes every field named `name` and returns the value of the first one.
    pub fn remove(&mut self, name: &str) -> Option<String> {
        let index = self.position(name)?;
        let removed = self.fields.remove(index);
        self.fields.retain(|field| !field.name.eq_ignore_ascii_case(name));
        Some(removed.value)
    }

    pub fn iter(&self) -> impl Iterator<Item = &HeaderField> {
        self.fields.iter()
    }
}

impl<N: Into<String>, V: Into<String>> FromIterator<(N, V)> for HeaderFields {
    fn from_iter<T: IntoIterator<Item = (N, V)>>(iter: T) -> Self {
        let mut headers = HeaderFields::new();
        for (name, value) in iter {
            headers.insert(name, value);
        }
        headers
    }
}

impl fmt::Display for HeaderFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for field in &self.fields {
            writeln!(f, "{}: {}", field.name, field.value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overwrite_keeps_position() {
        let mut headers = HeaderFields::new();
        headers.insert("Host", "a");
        headers.insert("Accept", "*/*");
        headers.insert("host", "b");

        let names: Vec<_> = headers.iter().map(HeaderField::name).collect();
        assert_eq!(names, vec!["Host", "Accept"]);
        assert_eq!(headers.get("HOST"), Some("b"));
    }

    #[test]
    fn extend_value_appends_verbatim() {
        let mut headers = HeaderFields::new();
        let index = headers.insert("X-Long", "first");
        assert!(headers.extend_value(index, " \tsecond"));
        assert_eq!(headers.get("x-long"), Some("first \tsecond"));
        assert!(!headers.extend_value(7, "nope"));
    }

    #[test]
    fn set_existing_ignores_missing_field() {
        let mut headers: HeaderFields = [("Accept", "*/*")].into_iter().collect();
        assert!(!headers.set_existing("Host", "example.com"));
        assert!(!headers.contains("Host"));

        assert!(headers.set_existing("accept", "text/html"));
        assert_eq!(headers.get("Accept"), Some("text/html"));
    }

    #[test]
    fn remove_returns_value() {
        let mut headers: HeaderFields = [("Transfer-Encoding", "chunked"), ("Date", "today")].into_iter().collect();
        assert_eq!(headers.remove("transfer-encoding"), Some("chunked".to_string()));
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.remove("transfer-encoding"), None);
    }
}
