//! Error types for the training-set generator

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for pipeline operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration errors, detected before any work starts
    #[error("configuration error: {0}")]
    Config(String),

    /// Unusable input data (tuple files, digit streams)
    #[error("input error: {0}")]
    Input(String),

    /// File IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding errors
    #[error("serialization error: {0}")]
    Serialization(serde_json::Error),

    /// CSV encoding errors
    #[error("csv error: {0}")]
    Csv(csv::Error),

    /// A pipeline stage stopped unexpectedly
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new input error
    pub fn input(msg: impl Into<String>) -> Self {
        Self::Input(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error stems from user configuration
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

// Encoders wrap failures of the underlying writer; those surface as `Io`.

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Self::Io(e.into())
        } else {
            Self::Serialization(e)
        }
    }
}

impl From<csv::Error> for Error {
    fn from(e: csv::Error) -> Self {
        if !e.is_io_error() {
            return Self::Csv(e);
        }
        match e.into_kind() {
            csv::ErrorKind::Io(io) => Self::Io(io),
            kind => Self::internal(format!("csv error: {:?}", kind)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Write};

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("no space left"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_json_write_failure_is_io() {
        let err: Error = serde_json::to_writer(FullDisk, &[1, 2, 3]).unwrap_err().into();
        assert!(matches!(err, Error::Io(_)), "{:?}", err);
    }

    #[test]
    fn test_json_syntax_error_is_serialization() {
        let err: Error = serde_json::from_str::<u64>("nope").unwrap_err().into();
        assert!(matches!(err, Error::Serialization(_)));
    }

    #[test]
    fn test_csv_write_failure_is_io() {
        let mut writer = csv::WriterBuilder::new().buffer_capacity(1).from_writer(FullDisk);
        let result = writer
            .write_record(["1", "2"])
            .and_then(|_| writer.flush().map_err(csv::Error::from));
        let err: Error = result.unwrap_err().into();
        assert!(matches!(err, Error::Io(_)), "{:?}", err);
    }
}
