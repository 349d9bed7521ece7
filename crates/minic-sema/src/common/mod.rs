//! Common infrastructure shared across the tree and analysis modules

mod error;
mod span;

pub use error::{AnalyzeError, AnalyzeResult, DiagnosticReporter};
pub use span::Span;
