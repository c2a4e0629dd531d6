//! Typed errors for failures callers may want to match on

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum HookError {
    /// The file is neither an OOXML package nor a format calamine understands
    #[error("unsupported workbook format: {}", .0.display())]
    UnsupportedWorkbook(PathBuf),

    /// A part referenced by the package relationships is absent
    #[error("missing package part '{0}'")]
    MissingPart(String),

    /// A cell reference that is not in A1 notation
    #[error("invalid cell reference '{0}'")]
    InvalidCellReference(String),

    /// Configuration rejected by `HookConfig::validate`
    #[error("configuration error: {0}")]
    Config(String),
}
