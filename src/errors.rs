use std::io;

use thiserror::Error;

/// Error type for split configuration, data sufficiency, and export failures.
#[derive(Debug, Error)]
pub enum SplitError {
    /// Fractions, thresholds, task indices, or caller lists that cannot be honored.
    #[error("invalid split configuration: {0}")]
    InvalidConfiguration(String),
    /// The dataset is too small or sparse for the requested partition.
    #[error("insufficient data: {0}")]
    InsufficientData(String),
    /// The strategy does not implement the requested entry point.
    #[error("unsupported operation: {0}")]
    UnsupportedOperation(String),
    /// Reading or writing an assignment file failed.
    #[error(transparent)]
    Io(#[from] io::Error),
    /// JSON encoding or decoding failed.
    #[error("serialization failure: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SplitError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::InvalidConfiguration(message.into())
    }

    pub(crate) fn insufficient(message: impl Into<String>) -> Self {
        Self::InsufficientData(message.into())
    }

    pub(crate) fn unsupported(message: impl Into<String>) -> Self {
        Self::UnsupportedOperation(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_failure_category() {
        assert_eq!(
            SplitError::config("fractions sum to 1.2").to_string(),
            "invalid split configuration: fractions sum to 1.2"
        );
        assert!(SplitError::insufficient("empty dataset").to_string().starts_with("insufficient data"));
        assert!(SplitError::unsupported("k-fold").to_string().starts_with("unsupported operation"));
        let io: SplitError = io::Error::new(io::ErrorKind::NotFound, "split.json").into();
        assert_eq!(io.to_string(), "split.json");
    }
}
