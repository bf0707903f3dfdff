//! Background execution of translation jobs.
//!
//! Each job runs on its own OS thread for its whole lifetime: the engine
//! call blocks for the duration of the translation and nothing in here
//! yields or checks for cancellation. Pause, resume and cancel only change
//! the status label other callers see; a cancelled job's thread keeps going
//! until the engine returns.

use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use bbm_core::progress::{LogLevel, ProgressRecord};
use bbm_core::registry::JobRegistry;
use bbm_core::settings::TranslationSettings;
use bbm_core::types::JobId;
use bbm_engine::naming::output_path;
use bbm_engine::{EngineInvocation, TranslationEngine};

use crate::error::WorkerError;
use crate::invocation::build_invocation;
use crate::relay::ProgressRelay;

/// One submitted job, ready to run.
#[derive(Debug, Clone)]
pub struct JobSpec {
    pub id: JobId,
    /// Stored upload, `{upload_dir}/{job_id}/{filename}`.
    pub book_path: PathBuf,
    pub settings: TranslationSettings,
}

/// Drives jobs from `pending` to a terminal status.
///
/// Shared as `Arc<JobWorker>`; every call to [`JobWorker::spawn`] starts an
/// independent thread. There is no limit on concurrently running jobs.
pub struct JobWorker {
    registry: Arc<JobRegistry>,
    engine: Arc<dyn TranslationEngine>,
    output_dir: PathBuf,
}

impl JobWorker {
    pub fn new(
        registry: Arc<JobRegistry>,
        engine: Arc<dyn TranslationEngine>,
        output_dir: PathBuf,
    ) -> Self {
        Self {
            registry,
            engine,
            output_dir,
        }
    }

    /// Run `spec` on a new, named thread and return immediately.
    pub fn spawn(self: &Arc<Self>, spec: JobSpec) -> std::io::Result<thread::JoinHandle<()>> {
        let worker = Arc::clone(self);
        thread::Builder::new()
            .name(format!("translate-{}", spec.id))
            .spawn(move || worker.run(spec))
    }

    /// Execute one job to completion on the calling thread, then complete it
    /// in the registry exactly once.
    pub fn run(&self, spec: JobSpec) {
        let record = match self.registry.lookup(spec.id) {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(job_id = %spec.id, error = %e, "Job vanished before it started");
                return;
            }
        };

        record.mark_running();
        record.append_log("Starting translation process...", LogLevel::Info);
        tracing::info!(job_id = %spec.id, engine = self.engine.name(), "Job started");

        let outcome = self.execute(&spec, &record);

        // The terminal transition and the move to `completed` happen under
        // one registry write lock.
        let applied = self.registry.complete(spec.id, |record| match &outcome {
            Ok(output) => record.mark_completed(output.as_deref()),
            Err(e) => record.mark_failed(&e.to_string()),
        });

        match (applied, &outcome) {
            (Ok(true), Ok(output)) => {
                tracing::info!(job_id = %spec.id, output = ?output, "Job completed");
            }
            (Ok(true), Err(e @ WorkerError::Configuration(_))) => {
                tracing::warn!(job_id = %spec.id, error = %e, "Job configuration rejected");
            }
            (Ok(true), Err(e)) => {
                tracing::error!(job_id = %spec.id, error = %e, "Job failed");
            }
            (Ok(false), _) => {
                tracing::warn!(
                    job_id = %spec.id,
                    status = record.status().as_str(),
                    "Job finished after reaching a terminal status; result not recorded",
                );
            }
            (Err(e), _) => {
                tracing::error!(job_id = %spec.id, error = %e, "Failed to complete job");
            }
        }
    }

    /// Steps between validation and artifact placement. Returns the
    /// relocated artifact path, or `None` when the engine produced nothing
    /// under the expected name.
    fn execute(
        &self,
        spec: &JobSpec,
        record: &Arc<ProgressRecord>,
    ) -> Result<Option<PathBuf>, WorkerError> {
        let invocation = build_invocation(&spec.book_path, &spec.settings)?;
        let relay = ProgressRelay::new(Arc::clone(record));

        record.append_log(
            format!("Processing file: {}", spec.book_path.display()),
            LogLevel::Info,
        );
        self.invoke_engine(&invocation, &relay)?;

        let produced = output_path(&invocation.book_path, invocation.output_mode);
        if !produced.exists() {
            record.append_log("Warning: Output file not found", LogLevel::Warning);
            return Ok(None);
        }

        let file_name = produced
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let destination = self.output_dir.join(format!("{}_{file_name}", spec.id));
        relocate(&produced, &destination)?;

        record.append_log("Translation completed successfully!", LogLevel::Success);
        Ok(Some(destination))
    }

    /// Call the engine, turning a panic inside it into a job failure.
    fn invoke_engine(
        &self,
        invocation: &EngineInvocation,
        relay: &ProgressRelay,
    ) -> Result<(), WorkerError> {
        let engine = self.engine.as_ref();
        match panic::catch_unwind(AssertUnwindSafe(|| {
            engine.make_bilingual_book(invocation, Some(relay))
        })) {
            Ok(result) => result.map_err(WorkerError::from),
            Err(payload) => Err(WorkerError::EnginePanicked(panic_message(payload.as_ref()))),
        }
    }
}

/// Move `from` to `to`, copying when a rename is not possible (e.g. across
/// filesystems).
fn relocate(from: &Path, to: &Path) -> Result<(), WorkerError> {
    let err = |source| WorkerError::Relocate {
        from: from.display().to_string(),
        to: to.display().to_string(),
        source,
    };
    if std::fs::rename(from, to).is_ok() {
        return Ok(());
    }
    std::fs::copy(from, to).map_err(err)?;
    std::fs::remove_file(from).map_err(err)
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc;
    use std::sync::Mutex;

    use bbm_core::progress::JobStatus;
    use bbm_engine::{EngineError, PassthroughEngine, UnitObserver};

    use super::*;

    struct Fixture {
        _dir: tempfile::TempDir,
        uploads: PathBuf,
        outputs: PathBuf,
        registry: Arc<JobRegistry>,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            let uploads = dir.path().join("uploads");
            let outputs = dir.path().join("outputs");
            std::fs::create_dir_all(&uploads).unwrap();
            std::fs::create_dir_all(&outputs).unwrap();
            Self {
                _dir: dir,
                uploads,
                outputs,
                registry: Arc::new(JobRegistry::new()),
            }
        }

        fn worker(&self, engine: Arc<dyn TranslationEngine>) -> Arc<JobWorker> {
            Arc::new(JobWorker::new(
                Arc::clone(&self.registry),
                engine,
                self.outputs.clone(),
            ))
        }

        fn submit(&self, file_name: &str, contents: &str, settings: &str) -> JobSpec {
            let id = JobId::new();
            let job_dir = self.uploads.join(id.to_string());
            std::fs::create_dir_all(&job_dir).unwrap();
            let book_path = job_dir.join(file_name);
            std::fs::write(&book_path, contents).unwrap();
            self.registry.create(id).unwrap();
            JobSpec {
                id,
                book_path,
                settings: TranslationSettings::from_json(settings).unwrap(),
            }
        }
    }

    fn has_log(record: &ProgressRecord, needle: &str) -> bool {
        record
            .snapshot()
            .logs
            .iter()
            .any(|l| l.message.contains(needle))
    }

    /// Counts calls and fails or panics on demand.
    struct ScriptedEngine {
        calls: AtomicUsize,
        outcome: fn() -> Result<(), EngineError>,
    }

    impl TranslationEngine for ScriptedEngine {
        fn name(&self) -> &str {
            "scripted"
        }

        fn make_bilingual_book(
            &self,
            _invocation: &EngineInvocation,
            _observer: Option<&dyn UnitObserver>,
        ) -> Result<(), EngineError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.outcome)()
        }
    }

    fn scripted(outcome: fn() -> Result<(), EngineError>) -> Arc<ScriptedEngine> {
        Arc::new(ScriptedEngine {
            calls: AtomicUsize::new(0),
            outcome,
        })
    }

    #[test]
    fn three_unit_document_completes() {
        let fx = Fixture::new();
        let worker = fx.worker(Arc::new(PassthroughEngine));
        let spec = fx.submit("book.txt", "alpha\nbeta\ngamma\n", r#"{"model":"google"}"#);
        let id = spec.id;

        worker.spawn(spec).unwrap().join().unwrap();

        let record = fx.registry.lookup_completed(id).unwrap();
        assert!(fx.registry.lookup_active(id).is_err());
        let snap = record.snapshot();
        assert_eq!(snap.status, JobStatus::Completed);
        assert_eq!(snap.current, 3);
        assert_eq!(snap.total, 3);
        assert_eq!(snap.current_item, "gamma");
        assert!(snap.start_time.is_some());

        let output = PathBuf::from(snap.output_file.unwrap());
        assert_eq!(output.parent().unwrap(), fx.outputs.as_path());
        assert_eq!(
            output.file_name().unwrap().to_string_lossy(),
            format!("{id}_book_bilingual.txt")
        );
        assert_eq!(
            std::fs::read_to_string(output).unwrap(),
            "alpha\nalpha\nbeta\nbeta\ngamma\ngamma\n"
        );
        assert!(has_log(&record, "Translation completed successfully!"));
    }

    #[test]
    fn start_log_follows_the_running_transition() {
        let fx = Fixture::new();
        let worker = fx.worker(Arc::new(PassthroughEngine));
        let spec = fx.submit("book.txt", "alpha\n", r#"{"model":"google"}"#);
        let id = spec.id;

        worker.spawn(spec).unwrap().join().unwrap();

        let snap = fx.registry.lookup_completed(id).unwrap().snapshot();
        let first = &snap.logs[0];
        assert_eq!(first.message, "Starting translation process...");
        assert!(snap.start_time.unwrap() <= first.timestamp);
    }

    #[test]
    fn terminal_record_is_already_in_completed() {
        let fx = Fixture::new();
        let worker = fx.worker(Arc::new(PassthroughEngine));
        let spec = fx.submit("book.txt", "alpha\n", r#"{"model":"google"}"#);
        let id = spec.id;
        let record = fx.registry.lookup_active(id).unwrap();

        let handle = worker.spawn(spec).unwrap();
        while !record.status().is_terminal() {
            std::thread::yield_now();
        }
        assert!(fx.registry.lookup_active(id).is_err());
        assert!(fx.registry.lookup_completed(id).is_ok());
        handle.join().unwrap();
    }

    #[test]
    fn unsupported_model_fails_without_engine_call() {
        let fx = Fixture::new();
        let engine = scripted(|| Ok(()));
        let worker = fx.worker(engine.clone());
        let spec = fx.submit("book.txt", "x\n", r#"{"model":"nope"}"#);
        let id = spec.id;

        worker.run(spec);

        let record = fx.registry.lookup_completed(id).unwrap();
        let snap = record.snapshot();
        assert_eq!(snap.status, JobStatus::Error);
        assert_eq!(snap.error_message.as_deref(), Some("Unsupported model: nope"));
        assert!(snap.output_file.is_none());
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
        assert!(!has_log(&record, "Processing file"));
    }

    #[test]
    fn missing_credential_fails_before_engine_call() {
        let fx = Fixture::new();
        let engine = scripted(|| Ok(()));
        let worker = fx.worker(engine.clone());
        let spec = fx.submit("book.txt", "x\n", r#"{"model":"chatgptapi"}"#);
        let id = spec.id;

        worker.run(spec);

        let record = fx.registry.lookup(id).unwrap();
        assert_eq!(record.status(), JobStatus::Error);
        assert!(!has_log(&record, "Processing file"));
        assert_eq!(engine.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn engine_failure_is_recorded() {
        let fx = Fixture::new();
        let worker = fx.worker(scripted(|| Err(EngineError::Failed("provider said no".into()))));
        let spec = fx.submit("book.txt", "x\n", r#"{"model":"google"}"#);
        let id = spec.id;

        worker.run(spec);

        let snap = fx.registry.lookup_completed(id).unwrap().snapshot();
        assert_eq!(snap.status, JobStatus::Error);
        assert_eq!(snap.error_message.as_deref(), Some("provider said no"));
        assert_eq!(
            snap.logs.last().unwrap().message,
            "Translation failed: provider said no"
        );
    }

    #[test]
    fn engine_panic_is_contained() {
        let fx = Fixture::new();
        let worker = fx.worker(scripted(|| panic!("engine exploded")));
        let spec = fx.submit("book.txt", "x\n", r#"{"model":"google"}"#);
        let id = spec.id;

        worker.spawn(spec).unwrap().join().unwrap();

        let snap = fx.registry.lookup_completed(id).unwrap().snapshot();
        assert_eq!(snap.status, JobStatus::Error);
        assert_eq!(
            snap.error_message.as_deref(),
            Some("Engine panicked: engine exploded")
        );
    }

    #[test]
    fn missing_artifact_still_completes_with_warning() {
        let fx = Fixture::new();
        let worker = fx.worker(scripted(|| Ok(())));
        let spec = fx.submit("book.txt", "x\n", r#"{"model":"google"}"#);
        let id = spec.id;

        worker.run(spec);

        let record = fx.registry.lookup_completed(id).unwrap();
        let snap = record.snapshot();
        assert_eq!(snap.status, JobStatus::Completed);
        assert!(snap.output_file.is_none());
        assert!(has_log(&record, "Warning: Output file not found"));
    }

    /// Blocks inside the engine call until released, then behaves like
    /// [`PassthroughEngine`].
    struct GatedEngine {
        started: Mutex<mpsc::Sender<()>>,
        release: Mutex<mpsc::Receiver<()>>,
    }

    impl TranslationEngine for GatedEngine {
        fn name(&self) -> &str {
            "gated"
        }

        fn make_bilingual_book(
            &self,
            invocation: &EngineInvocation,
            observer: Option<&dyn UnitObserver>,
        ) -> Result<(), EngineError> {
            self.started.lock().unwrap().send(()).unwrap();
            self.release.lock().unwrap().recv().unwrap();
            PassthroughEngine.make_bilingual_book(invocation, observer)
        }
    }

    #[test]
    fn cancelled_job_keeps_running_but_stays_cancelled() {
        let fx = Fixture::new();
        let (started_tx, started_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        let worker = fx.worker(Arc::new(GatedEngine {
            started: Mutex::new(started_tx),
            release: Mutex::new(release_rx),
        }));
        let spec = fx.submit("book.txt", "one\ntwo\n", r#"{"model":"google"}"#);
        let id = spec.id;

        let handle = worker.spawn(spec).unwrap();
        started_rx.recv().unwrap();

        fx.registry.cancel(id).unwrap();
        assert_eq!(fx.registry.counts(), (0, 1));

        release_tx.send(()).unwrap();
        handle.join().unwrap();

        let record = fx.registry.lookup_completed(id).unwrap();
        let snap = record.snapshot();
        assert_eq!(snap.status, JobStatus::Cancelled);
        assert!(snap.output_file.is_none());
        // The engine still ran to the end and its artifact was placed.
        assert_eq!(snap.current, 2);
        assert!(has_log(&record, "Translation completed successfully!"));
        assert_eq!(std::fs::read_dir(&fx.outputs).unwrap().count(), 1);
    }

    #[test]
    fn concurrent_jobs_count_only_their_own_units() {
        let fx = Fixture::new();
        let worker = fx.worker(Arc::new(PassthroughEngine));
        let small = fx.submit("small.txt", "a\nb\n", r#"{"model":"google"}"#);
        let large = fx.submit("large.txt", &"line\n".repeat(40), r#"{"model":"google"}"#);
        let (small_id, large_id) = (small.id, large.id);

        let h1 = worker.spawn(small).unwrap();
        let h2 = worker.spawn(large).unwrap();
        h1.join().unwrap();
        h2.join().unwrap();

        assert_eq!(fx.registry.lookup(small_id).unwrap().snapshot().current, 2);
        assert_eq!(fx.registry.lookup(large_id).unwrap().snapshot().current, 40);
    }
}
