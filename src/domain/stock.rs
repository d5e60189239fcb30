//! Instrument master row.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stock {
    pub code: String,
    pub name: String,
}

impl Stock {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}
