use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};
use crate::core::{
    BatchEvent, ConversionJob, JobId, JobState, Progress, SelectionRegistry, SourceImage,
    COMPLETED_MESSAGE, STARTED_MESSAGE,
};
use crate::processing::{ConversionEngine, DimensionInput, DimensionPolicy, ImageConverter};
use crate::utils::{ConversionError, ConverterError, ConverterResult};

/// Runs one batch at a time on a background task and reports its lifecycle
/// as [`BatchEvent`]s.
///
/// Foreground calls (selection edits, `start_batch`) only touch in-memory
/// state and return immediately. Locks are always taken in the order
/// state → registry → dimension input.
///
/// Events of one job arrive as `Started`, then `Progress`, then one terminal
/// event. A job's terminal event is queued before the orchestrator reports
/// `Idle`, so events of consecutive jobs never interleave.
#[derive(Clone)]
pub struct BatchJobOrchestrator {
    converter: Arc<dyn ImageConverter>,
    registry: Arc<Mutex<SelectionRegistry>>,
    dimension_input: Arc<Mutex<DimensionInput>>,
    state: Arc<Mutex<JobState>>,
    next_job_id: Arc<AtomicU64>,
    events: UnboundedSender<BatchEvent>,
    runtime: Handle,
}

impl BatchJobOrchestrator {
    /// Creates an orchestrator that spawns its jobs on `runtime`.
    ///
    /// The returned receiver yields every lifecycle event; dropping it does
    /// not stop jobs from running.
    pub fn new(
        converter: Arc<dyn ImageConverter>,
        runtime: Handle,
    ) -> (Self, UnboundedReceiver<BatchEvent>) {
        let (events, receiver) = mpsc::unbounded_channel();
        let orchestrator = Self {
            converter,
            registry: Arc::new(Mutex::new(SelectionRegistry::new())),
            dimension_input: Arc::new(Mutex::new(DimensionInput::default())),
            state: Arc::new(Mutex::new(JobState::Idle)),
            next_job_id: Arc::new(AtomicU64::new(1)),
            events,
            runtime,
        };
        (orchestrator, receiver)
    }

    pub fn with_engine(engine: ConversionEngine, runtime: Handle) -> (Self, UnboundedReceiver<BatchEvent>) {
        Self::new(Arc::new(engine), runtime)
    }

    // ── Selection ────────────────────────────────────────────────────────────────────
    //
    // Edits are refused while a job runs: a successful job clears the whole
    // selection and resets the input, which would swallow them.

    pub fn add_image(&self, image: SourceImage) -> ConverterResult<()> {
        self.edit(&self.registry, |registry| registry.add(image))
    }

    pub fn add_paths<I, P>(&self, paths: I) -> ConverterResult<usize>
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        self.edit(&self.registry, |registry| registry.add_paths(paths))?
    }

    pub fn remove_image(&self, filename: &str) -> ConverterResult<()> {
        self.edit(&self.registry, |registry| registry.remove(filename))
    }

    /// Read-only view of the current selection, ordered by filename.
    pub fn selection(&self) -> Vec<SourceImage> {
        lock(&self.registry).snapshot()
    }

    pub fn selection_is_empty(&self) -> bool {
        lock(&self.registry).is_empty()
    }

    // ── Pending dimension input ──────────────────────────────────────────────────────

    pub fn dimension_input(&self) -> DimensionInput {
        lock(&self.dimension_input).clone()
    }

    pub fn update_dimension_input(&self, update: impl FnOnce(&mut DimensionInput)) -> ConverterResult<()> {
        self.edit(&self.dimension_input, update)
    }

    /// Runs `apply` on `target` unless a job is running.
    fn edit<T, R>(&self, target: &Mutex<T>, apply: impl FnOnce(&mut T) -> R) -> ConverterResult<R> {
        let state = lock(&self.state);
        if state.is_running() {
            debug!("Edit rejected: a job is running");
            return Err(ConverterError::SelectionLocked);
        }
        Ok(apply(&mut *lock(target)))
    }

    // ── Jobs ─────────────────────────────────────────────────────────────────────────

    pub fn state(&self) -> JobState {
        *lock(&self.state)
    }

    pub fn is_running(&self) -> bool {
        self.state().is_running()
    }

    /// Admits a batch built from the current selection and hands it to a
    /// background task.
    ///
    /// Rejections are returned here and never produce events. On admission a
    /// `Started` event is queued before this returns.
    pub fn start_batch(&self, raw_width: &str, raw_height: &str, destination: &str) -> ConverterResult<JobId> {
        // Held until the job is marked Running so two callers cannot both see Idle
        let mut state = lock(&self.state);

        let images = lock(&self.registry).snapshot();
        if images.is_empty() {
            debug!("Batch rejected: no images selected");
            return Err(ConverterError::NoImagesSelected);
        }

        let dimensions = DimensionPolicy::resolve(raw_width, raw_height)?;

        if state.is_running() {
            debug!("Batch rejected: a job is already running");
            return Err(ConverterError::JobAlreadyRunning);
        }

        transition(&mut state, JobState::Running);
        let job_id = self.next_job_id.fetch_add(1, Ordering::Relaxed);
        let job = ConversionJob::new(job_id, images, dimensions, destination);
        drop(state);

        info!(
            "Job {} admitted: {} images, {:?}, destination '{}'",
            job_id,
            job.len(),
            job.dimensions,
            job.destination
        );

        self.emit(BatchEvent::Started {
            job_id,
            total_images: job.len(),
            message: STARTED_MESSAGE.to_string(),
        });

        let orchestrator = self.clone();
        self.runtime.spawn(async move {
            orchestrator.run_job(job).await;
        });

        Ok(job_id)
    }

    /// Same as [`start_batch`](Self::start_batch) using the stored dimension input.
    pub fn start_pending_batch(&self, destination: &str) -> ConverterResult<JobId> {
        let request = self.dimension_input().to_request();
        self.start_batch(&request.width, &request.height, destination)
    }

    async fn run_job(&self, job: ConversionJob) {
        let job_id = job.id;
        let total = job.len();
        let converter = Arc::clone(&self.converter);
        let events = self.events.clone();

        let outcome = tokio::task::spawn_blocking(move || {
            let mut completed = 0;
            converter.convert_and_save_with_progress(&job, &mut |converted| {
                completed += 1;
                let message = format!(
                    "{} converted ({}×{})",
                    converted.filename, converted.width, converted.height
                );
                let _ = events.send(BatchEvent::Progress(Progress::new(job_id, completed, total, message)));
            })
        })
        .await
        .unwrap_or_else(|e| Err(ConversionError::worker(format!("Task panicked: {e}"))));

        self.finish(job_id, outcome);
    }

    fn finish(&self, job_id: JobId, outcome: Result<usize, ConversionError>) {
        let mut state = lock(&self.state);

        let event = match outcome {
            Ok(images_written) => {
                lock(&self.registry).clear();
                lock(&self.dimension_input).reset();
                transition(&mut state, JobState::Completed);
                info!("Job {} completed: {} images written", job_id, images_written);
                BatchEvent::Completed {
                    job_id,
                    images_written,
                    message: COMPLETED_MESSAGE.to_string(),
                }
            }
            Err(e) => {
                transition(&mut state, JobState::Failed);
                warn!("Job {} failed: {}", job_id, e);
                BatchEvent::Failed {
                    job_id,
                    filename: e.filename().map(str::to_string),
                    error: e.to_string(),
                }
            }
        };

        transition(&mut state, JobState::Idle);

        // Emitted under the lock so no later job's events can overtake it
        self.emit(event);
    }

    fn emit(&self, event: BatchEvent) {
        // Nobody listening is fine; jobs still run to completion
        let _ = self.events.send(event);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn transition(state: &mut JobState, next: JobState) {
    debug_assert!(state.can_transition_to(next), "illegal job transition {state:?} → {next:?}");
    debug!("Job state {:?} → {:?}", state, next);
    *state = next;
}
