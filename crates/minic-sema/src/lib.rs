//! MiniC semantic analyzer
//!
//! A three-pass static analyzer for the MiniC teaching language, operating
//! over an externally produced parse tree:
//!
//! - **Tree** (`tree/`): arena parse-tree representation plus the textual
//!   dump format used to exchange trees with the parser
//! - **Sema** (`sema/`): scope tree construction, scope resolution, and
//!   type checking
//! - **Common** (`common/`): shared infrastructure (errors, spans,
//!   diagnostics)
//!
//! ```
//! use minic_sema::{analyze, ParseTree};
//!
//! let tree = ParseTree::from_sexpr(
//!     "(statement (decl_list (decl_init (type INT) (variable ID:x))) SEMICOLON)",
//! )?;
//! let analysis = analyze(&tree)?;
//! assert!(analysis.is_clean());
//! # Ok::<(), minic_sema::AnalyzeError>(())
//! ```

pub mod common;
pub mod sema;
pub mod tree;

// Re-exports for convenience
pub use common::{AnalyzeError, AnalyzeResult, DiagnosticReporter, Span};
pub use sema::{analyze, Analysis, ScopeTree, TypeError};
pub use tree::{NodeId, ParseTree, Production, Terminal};
