use std::fmt;

#[derive(Debug)]
pub enum ReconcileError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Profile validation error (empty marker, duplicate category, etc.).
    ConfigValidation(String),
    /// No sheet family's substring occurs in the category label.
    NoFamily(String),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "profile parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "profile validation error: {msg}"),
            Self::NoFamily(label) => write!(f, "no sheet family matches category '{label}'"),
        }
    }
}

impl std::error::Error for ReconcileError {}
