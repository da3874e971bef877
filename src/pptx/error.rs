use thiserror::Error;

/// Errors raised while reading or writing a `.pptx` package.
#[derive(Debug, Error)]
pub enum PptxError {
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("xml error in {part}: {message}")]
    Xml { part: String, message: String },

    #[error("missing part: {0}")]
    MissingPart(String),

    #[error("layout {0} does not exist")]
    UnknownLayout(usize),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl PptxError {
    pub(crate) fn xml(part: &str, message: impl std::fmt::Display) -> Self {
        PptxError::Xml {
            part: part.to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PptxError>;
