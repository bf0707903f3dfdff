//! Contract between the job worker and a document translation engine.
//!
//! The engine itself (document parsing, provider calls) is an external
//! collaborator. This crate defines how it is invoked: a fully resolved
//! [`EngineInvocation`], an optional [`UnitObserver`] for progress, and the
//! artifact naming rule the worker relies on to find the result.

pub mod error;
pub mod invocation;
pub mod naming;
pub mod observer;
pub mod passthrough;

pub use error::EngineError;
pub use invocation::EngineInvocation;
pub use observer::UnitObserver;
pub use passthrough::PassthroughEngine;

/// A document translation engine.
///
/// Implementations block the calling thread for the whole run.
pub trait TranslationEngine: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &str;

    /// Translate `invocation.book_path` and write the artifact next to it,
    /// named per [`naming::output_file_name`].
    ///
    /// `observer`, when given, is notified after each processed unit.
    fn make_bilingual_book(
        &self,
        invocation: &EngineInvocation,
        observer: Option<&dyn UnitObserver>,
    ) -> Result<(), EngineError>;
}
