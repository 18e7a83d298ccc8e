use thiserror::Error;

/// Failures that signal a gap in the lookup tables or malformed input rather
/// than an infrastructure problem.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("no query classification for account `{account}`")]
    UnsupportedClassification { account: String },

    #[error("invalid reverse dictionary row at line {line}: {reason}")]
    InvalidDictionary { line: u64, reason: String },
}

impl LookupError {
    pub fn unsupported(account: impl Into<String>) -> Self {
        LookupError::UnsupportedClassification {
            account: account.into(),
        }
    }
}
