//! Background job worker: resolves a job's configuration, drives the
//! translation engine on a dedicated thread, relays progress into the job's
//! record, places the artifact and moves the job to the completed partition.

pub mod error;
pub mod invocation;
pub mod relay;
pub mod worker;

pub use error::WorkerError;
pub use worker::{JobSpec, JobWorker};
