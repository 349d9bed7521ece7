//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use thiserror::Error;

use super::Span;

/// Analysis error
#[derive(Error, Debug)]
pub enum AnalyzeError {
    #[error("Tree error at {span:?}: {message}")]
    Tree { message: String, span: Span },

    #[error("Malformed declaration: {message}")]
    Construction { message: String },

    /// A re-traversal pass ran out of child scopes while descending into a
    /// scope-introducing node. The parse tree being walked does not match
    /// the one the scope tree was built from.
    #[error("Scope tree desynchronized at '{construct}' node")]
    ScopeDesync { construct: &'static str },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyzeError {
    pub fn tree(message: impl Into<String>, span: Span) -> Self {
        Self::Tree {
            message: message.into(),
            span,
        }
    }

    pub fn construction(message: impl Into<String>) -> Self {
        Self::Construction {
            message: message.into(),
        }
    }
}

pub type AnalyzeResult<T> = Result<T, AnalyzeError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    pub fn report_error(&self, file_id: usize, error: &AnalyzeError) {
        let diagnostic = match error {
            AnalyzeError::Tree { message, span } => Diagnostic::error()
                .with_message("Tree error")
                .with_labels(vec![
                    Label::primary(file_id, span.start..span.end).with_message(message),
                ]),

            AnalyzeError::Construction { message } => Diagnostic::error()
                .with_message(format!("Malformed declaration: {}", message)),

            AnalyzeError::ScopeDesync { construct } => Diagnostic::bug()
                .with_message(format!("scope tree desynchronized at '{}' node", construct)),

            AnalyzeError::Io(err) => Diagnostic::error().with_message(format!("IO error: {}", err)),
        };

        self.emit(&diagnostic);
    }

    /// Report an undefined identifier found by the scope resolver
    pub fn report_undefined(&self, name: &str) {
        self.emit(
            &Diagnostic::error().with_message(format!("Scope error: undefined variable '{}'", name)),
        );
    }

    /// Report a formatted type error found by the type checker
    pub fn report_type_error(&self, message: &str) {
        self.emit(&Diagnostic::error().with_message(format!("Type error: {}", message)));
    }

    fn emit(&self, diagnostic: &Diagnostic<usize>) {
        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, diagnostic);
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}
