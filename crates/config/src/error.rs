//! Error types for settings loading and validation.

use std::{
    cmp::{max, min},
    fmt::Write as _,
    path::{Path, PathBuf},
    result::Result as StdResult,
};

use ron::error::SpannedError;
use thiserror::Error;

/// Result type for settings loading.
pub type Result<T> = StdResult<T, Error>;

#[derive(Debug, Error, Clone)]
/// Errors produced while loading, parsing, or validating a settings file.
pub enum Error {
    #[error("{message}")]
    /// I/O or filesystem read error.
    Read {
        /// Optional path associated with the read error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
    #[error("{message}")]
    /// RON syntax or type error with a concrete line/column location and excerpt.
    Parse {
        /// Optional path associated with the parse error.
        path: Option<PathBuf>,
        /// 1-based line number.
        line: usize,
        /// 1-based column number.
        col: usize,
        /// Human-readable error message.
        message: String,
        /// Rendered excerpt including a caret at the error location.
        excerpt: String,
    },
    #[error("{message}")]
    /// The file parsed but a value is out of range.
    Validation {
        /// Optional path associated with the validation error.
        path: Option<PathBuf>,
        /// Human-readable error message.
        message: String,
    },
}

impl Error {
    /// Render a human-friendly error message including location and an excerpt when available.
    pub fn pretty(&self) -> String {
        match self {
            Self::Read { path, message } => match path {
                Some(p) => format!("Read error at {}: {}", p.display(), message),
                None => format!("Read error: {}", message),
            },
            Self::Parse {
                path,
                line,
                col,
                message,
                excerpt,
            } => match path {
                Some(p) => format!(
                    "Config parse error at {}:{}:{}\n{}\n{}",
                    p.display(),
                    line,
                    col,
                    message,
                    excerpt
                ),
                None => format!(
                    "Config parse error at line {}, column {}\n{}\n{}",
                    line, col, message, excerpt
                ),
            },
            Self::Validation { path, message } => match path {
                Some(p) => format!("Config validation error in {}\n{}", p.display(), message),
                None => format!("Config validation error\n{}", message),
            },
        }
    }

    /// Convert a RON error into [`Error::Parse`], pointing at where the parser
    /// stopped.
    pub(crate) fn from_ron(source: &str, path: Option<&Path>, err: &SpannedError) -> Self {
        let line = err.span.start.line.max(1);
        let col = err.span.start.col.max(1);
        Self::Parse {
            path: path.map(Path::to_path_buf),
            line,
            col,
            message: err.code.to_string(),
            excerpt: excerpt_at(source, line, col),
        }
    }

    /// Validation failure for `path`.
    pub(crate) fn invalid(path: Option<&Path>, message: impl Into<String>) -> Self {
        Self::Validation {
            path: path.map(Path::to_path_buf),
            message: message.into(),
        }
    }

    /// Access the optional path attached to this error.
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Read { path, .. } | Self::Parse { path, .. } | Self::Validation { path, .. } => {
                path.as_deref()
            }
        }
    }
}

/// Build a small excerpt of up to four lines with a caret at `(line_no, col_no)`.
pub fn excerpt_at(source: &str, line_no: usize, col_no: usize) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let total = lines.len();
    let start = max(1usize, line_no.saturating_sub(2));
    let end = min(total, line_no + 1);

    let mut out = String::new();
    for n in start..=end {
        let text = lines.get(n - 1).copied().unwrap_or("");
        let _ignored = writeln!(out, " {:>4} | {}", n, text);
        if n == line_no {
            let prefix = format!(" {:>4} | ", n);
            let _ignored = writeln!(
                out,
                "{}{}^",
                " ".repeat(prefix.len()),
                " ".repeat(col_no.saturating_sub(1))
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn excerpt_marks_column() {
        let src = "(\n    port: 1,\n    bogus: 2,\n)";
        let ex = excerpt_at(src, 3, 5);
        let lines: Vec<&str> = ex.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[2].ends_with("bogus: 2,"));
        assert_eq!(lines[3].trim_end(), format!("{}^", " ".repeat(12)));
    }

    #[test]
    fn pretty_validation_names_path() {
        let err = Error::invalid(Some(Path::new("/tmp/netmotion.ron")), "speed must be > 0");
        assert_eq!(
            err.pretty(),
            "Config validation error in /tmp/netmotion.ron\nspeed must be > 0"
        );
        assert_eq!(err.to_string(), "speed must be > 0");
    }
}
