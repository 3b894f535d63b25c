//! Parser error type.

use text_size::TextRange;

use crate::base::LineIndex;
use crate::error::ModelError;

/// A syntax error with location and message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxError {
    pub message: String,
    pub range: TextRange,
}

impl SyntaxError {
    pub fn new(message: impl Into<String>, range: TextRange) -> Self {
        Self {
            message: message.into(),
            range,
        }
    }

    /// Convert to the library error, resolving the byte range to a
    /// 1-indexed line/column against the source text's line index.
    pub fn into_model_error(self, line_index: &LineIndex) -> ModelError {
        let line_col = line_index.line_col(self.range.start());
        ModelError::Syntax {
            message: self.message,
            line: line_col.line + 1,
            column: line_col.col + 1,
        }
    }
}

impl std::fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.range, self.message)
    }
}

impl std::error::Error for SyntaxError {}
