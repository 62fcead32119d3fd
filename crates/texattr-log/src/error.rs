use crate::ir::{Delimiter, Frame};

pub type Result<T> = std::result::Result<T, AnnotateError>;

/// A closing delimiter found a frame it cannot close.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("`{}` cannot close {}", delimiter.closing_char(), top.describe())]
pub struct CloseError {
    pub delimiter: Delimiter,
    pub top: Frame,
}

/// Errors raised while annotating a transcript.
#[derive(Debug, thiserror::Error)]
pub enum AnnotateError {
    /// A closing delimiter did not match the nesting the transcript built up.
    #[error("stack underflow on line {line}: {source}")]
    StackUnderflow {
        line: usize,
        #[source]
        source: CloseError,
    },

    /// End of input reached with contexts still open.
    #[error(
        "unbalanced transcript: {} context(s) still open at end of input: {}",
        open.len(),
        open.join(", ")
    )]
    UnbalancedTranscript { open: Vec<String> },

    /// A line was not valid UTF-8. Recovered by emitting the raw bytes.
    #[error("line {line} is not valid UTF-8: {source}")]
    Decode {
        line: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("no complete compiler run found in transcript")]
    NoRunFound,

    #[error("compiler run starting on line {line} never terminated")]
    UnterminatedRun { line: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AnnotateError {
    pub(crate) fn underflow(line: usize, source: CloseError) -> Self {
        AnnotateError::StackUnderflow { line, source }
    }
}
