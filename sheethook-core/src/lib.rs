//! sheethook-core: turn Excel workbooks into reviewable text artifacts
//!
//! The library behind the `sheethook` pre-commit hook. It discovers workbooks
//! in a directory tree, extracts their VBA modules as plain source files and
//! renders seven text reports per workbook (values, formatting, conditional
//! formatting, merged cells, data validations, hyperlinks and named ranges).

pub mod config;
pub mod discovery;
pub mod error;
pub mod hook;
pub mod reader;
pub mod report;
pub mod vba;

pub use config::{HookConfig, MatchMode};
pub use discovery::WorkbookFile;
pub use error::HookError;
pub use hook::{Hook, NoProgress, OutputLedger, ProgressSink, RunSummary};
pub use report::{ReportCategory, ReportOptions, ReportSet};
pub use vba::VbaModule;
