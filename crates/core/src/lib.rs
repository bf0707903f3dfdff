//! Domain building blocks for the translation job service: job ids, the
//! per-job progress record, the job registry, static catalogs and the
//! configuration payload.

pub mod catalog;
pub mod error;
pub mod progress;
pub mod registry;
pub mod settings;
pub mod types;
