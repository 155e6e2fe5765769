use std::collections::HashMap;

/// A single named input: free-form text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputValue {
    Text(String),
    Bytes(Vec<u8>),
}

/// The named inputs for one task invocation.
///
/// A thin map of input key to string or byte value. Keys the task does not
/// list in [`TaskKind::required_inputs`](crate::task::TaskKind::required_inputs)
/// are ignored by the request builder.
#[derive(Debug, Clone, Default)]
pub struct Inputs {
    values: HashMap<String, InputValue>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a text input, chaining style.
    pub fn text(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.values.insert(key.into(), InputValue::Text(value.into()));
        self
    }

    /// Add a byte input, chaining style.
    pub fn bytes(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.values.insert(key.into(), InputValue::Bytes(value.into()));
        self
    }

    /// Add an input in place, for callers assembling inputs in a loop.
    pub fn insert(&mut self, key: impl Into<String>, value: InputValue) {
        self.values.insert(key.into(), value);
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        match self.values.get(key) {
            Some(InputValue::Text(s)) => Some(s),
            _ => None,
        }
    }

    pub fn get_bytes(&self, key: &str) -> Option<&[u8]> {
        match self.values.get(key) {
            Some(InputValue::Bytes(b)) => Some(b),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}
