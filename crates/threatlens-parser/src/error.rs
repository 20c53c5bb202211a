//! Diagnostics reported while extracting a diagram.
//!
//! Diagram sources routinely contain text the extractor does not understand
//! (styling directives, includes, free text), so nothing here is fatal. A
//! statement that starts like a declaration or relationship but does not
//! match the grammar is skipped, and a [`Diagnostic`] records where and why.
//!
//! # Example
//!
//! ```
//! # use threatlens_parser::error::{Diagnostic, ErrorCode};
//! # use threatlens_parser::Span;
//!
//! let diag = Diagnostic::warning("entity `db` is declared more than once")
//!     .with_code(ErrorCode::E200)
//!     .with_label(Span::new(120..122), "this declaration wins")
//!     .with_secondary_label(Span::new(40..42), "earlier declaration")
//!     .with_help("rename one of the entities");
//! ```

mod collector;
mod diagnostic;
mod error_code;
mod label;
mod severity;

pub(crate) use collector::DiagnosticCollector;

pub use diagnostic::Diagnostic;
pub use error_code::ErrorCode;
pub use label::Label;
pub use severity::Severity;
