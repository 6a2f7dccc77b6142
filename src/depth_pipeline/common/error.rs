use thiserror::Error;

/// Coarse error classes surfaced to callers of the batch tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Source missing or corrupt, destination not writable.
    Io,
    /// Missing manifest field or out-of-domain parameter.
    Config,
    /// Degenerate numeric input such as a non-finite zmax.
    Value,
}

#[derive(Error, Debug)]
pub enum DepthError {
    #[error("Failed to read input file: {0}")]
    InputReadError(String),

    #[error("Failed to write output file: {0}")]
    OutputWriteError(String),

    #[error("Failed to decode depth image: {0}")]
    DecodeError(String),

    #[error("Failed to encode image: {0}")]
    EncodeError(String),

    #[error("Invalid image dimensions: width={0}, height={1}")]
    InvalidDimensions(usize, usize),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("frame {frame}: {source}")]
    Frame {
        frame: String,
        #[source]
        source: Box<DepthError>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl DepthError {
    /// Attaches a manifest frame identifier to an error.
    pub fn in_frame(self, frame: impl Into<String>) -> Self {
        DepthError::Frame {
            frame: frame.into(),
            source: Box::new(self),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            DepthError::InputReadError(_)
            | DepthError::OutputWriteError(_)
            | DepthError::DecodeError(_)
            | DepthError::EncodeError(_)
            | DepthError::UnsupportedFormat(_)
            | DepthError::IoError(_) => ErrorKind::Io,
            DepthError::ConfigError(_) | DepthError::InvalidDimensions(_, _) => ErrorKind::Config,
            DepthError::InvalidValue(_) => ErrorKind::Value,
            DepthError::Frame { source, .. } => source.kind(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DepthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_wrapper_keeps_kind_and_id() {
        let err = DepthError::ConfigError("missing depth_exr_gt".to_string()).in_frame("7");
        assert_eq!(err.kind(), ErrorKind::Config);
        assert_eq!(
            err.to_string(),
            "frame 7: Invalid configuration: missing depth_exr_gt"
        );
    }

    #[test]
    fn test_io_errors_classified_as_io() {
        let err: DepthError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
        assert_eq!(err.kind(), ErrorKind::Io);
        assert_eq!(DepthError::DecodeError("bad".into()).kind(), ErrorKind::Io);
        assert_eq!(DepthError::InvalidValue("nan".into()).kind(), ErrorKind::Value);
    }
}
