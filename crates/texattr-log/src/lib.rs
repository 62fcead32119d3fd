//! # texattr Log Annotator
//!
//! Attributes every line of a TeX engine transcript to the file, page or
//! figure that was open when the engine printed it.
//!
//! ## Overview
//!
//! pdfTeX reports what it is doing with unlabelled delimiters mixed into
//! free text:
//!
//! - **Files**: `(./chapter.tex` ... `)`
//! - **Pages**: `[1{/path/pdftex.map}]`
//! - **Figures**: `<./fig.png>` or `<./fig.png, id=1, ...>`
//!
//! Plain text uses the same characters (`(see above)`), so a `(` only opens
//! a file when a [`FileOracle`](oracle::FileOracle) confirms the path exists.
//! Every other parenthesis is tracked as an anonymous group so that its `)`
//! does not close a file.
//!
//! ## Architecture
//!
//! ```text
//! raw lines ──► LogAnnotator ──► LineAttributor ──► DelimiterResolver
//!               (merges package      (shallowest        (angle, square,
//!                blocks, box and      depth per line)    round; mutates
//!                error context)                          the ContextStack)
//!                     │
//!                     ▼
//!              AttributedLine ──► RunSelector (optional, last run only)
//! ```
//!
//! - [`words`]: lossless token/whitespace splitting
//! - [`stack`]: the [`ContextStack`](stack::ContextStack) with its root sentinel
//! - [`resolve`]: scanners and resolvers per delimiter family
//! - [`attributor`]: per-line label computation
//! - [`parser`]: the streaming [`LogAnnotator`](parser::LogAnnotator)
//! - [`runs`]: [`RunSelector`](runs::RunSelector)
//!
//! ## Examples
//!
//! ```
//! use texattr_log::{AnnotateOptions, KnownFiles, LogAnnotator};
//!
//! let oracle: KnownFiles = ["./main.tex", "./intro.tex"].into_iter().collect();
//! let log = "(./main.tex\n(./intro.tex\nLaTeX Warning: Citation `knuth' undefined.\n))\n";
//! let lines = LogAnnotator::new(oracle, AnnotateOptions::default()).annotate_str(log)?;
//!
//! assert_eq!(lines[2].render(), "./intro.tex:LaTeX Warning: Citation `knuth' undefined.\n");
//! # Ok::<(), texattr_log::AnnotateError>(())
//! ```
//!
//! Nesting that never closes is an error rather than a warning:
//!
//! ```
//! use texattr_log::{AnnotateError, AnnotateOptions, KnownFiles, LogAnnotator};
//!
//! let oracle: KnownFiles = ["./main.tex"].into_iter().collect();
//! let annotator = LogAnnotator::new(oracle, AnnotateOptions::default());
//! let result = annotator.annotate_str("(./main.tex\n");
//! assert!(matches!(result, Err(AnnotateError::UnbalancedTranscript { .. })));
//! ```

/// Per-line label computation.
pub mod attributor;
/// Annotation options.
pub mod config;
/// Error types.
pub mod error;
/// Frames and attributed lines.
pub mod ir;
/// File existence oracles.
pub mod oracle;
/// Streaming annotator and multi-line structuring.
pub mod parser;
pub mod resolve;
/// Last-run extraction.
pub mod runs;
pub mod stack;
pub mod words;


pub use config::AnnotateOptions;
pub use error::{AnnotateError, Result};
pub use ir::{AttributedLine, Frame, LineContent};
pub use oracle::{FileOracle, Filesystem, KnownFiles};
pub use parser::LogAnnotator;
pub use runs::RunSelector;
