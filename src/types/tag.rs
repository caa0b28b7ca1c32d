use serde::{Deserialize, Serialize};

/// A tag on an Event
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Tag(Vec<String>);

impl Tag {
    const EMPTY_STRING: &'static str = "";

    /// Create a new tag
    pub fn new(fields: &[&str]) -> Tag {
        Tag(fields.iter().map(|f| (*f).to_owned()).collect())
    }

    /// Number of string fields in the tag
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Is the tag empty
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Get the string at the given index
    pub fn get_index(&self, index: usize) -> &str {
        match self.0.get(index) {
            Some(s) => s,
            None => Self::EMPTY_STRING,
        }
    }

    /// Get the tag name for the tag (the first string in the array)
    pub fn tagname(&self) -> &str {
        self.get_index(0)
    }

    /// Get the tag value (index 1, after the tag name)
    pub fn value(&self) -> &str {
        self.get_index(1)
    }

    /// Is this a single letter tag of the given letter (case sensitive, per NIP-01)
    pub fn is_letter(&self, letter: char) -> bool {
        let mut chars = self.tagname().chars();
        matches!((chars.next(), chars.next()), (Some(c), None) if c == letter)
    }

    // Mock data for testing
    #[allow(dead_code)]
    pub(crate) fn mock() -> Tag {
        Tag::new(&[
            "p",
            "7e7e9c42a91bfef19fa929e5fda1b72e0ebc1a4c1141673e2794234d86addf4e",
        ])
    }
}
