use image::{DynamicImage, GenericImageView, ImageReader, RgbImage};
use image_converter_lib::{
    BatchEvent, BatchJobOrchestrator, ConversionEngine, ConversionError, ConversionJob,
    ConvertedImage, ConverterError, DimensionError, ImageConverter, JobState, SourceImage,
};
use std::path::Path;
use std::sync::{Arc, Mutex, mpsc};
use std::time::Duration;
use tempfile::tempdir;
use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedReceiver;

fn write_png(dir: &Path, name: &str, width: u32, height: u32) -> SourceImage {
    let path = dir.join(name);
    DynamicImage::ImageRgb8(RgbImage::new(width, height))
        .save_with_format(&path, image::ImageFormat::Png)
        .unwrap();
    SourceImage::new(name, path)
}

fn write_garbage(dir: &Path, name: &str) -> SourceImage {
    let path = dir.join(name);
    std::fs::write(&path, b"not an image at all").unwrap();
    SourceImage::new(name, path)
}

fn read_back(path: &Path) -> DynamicImage {
    ImageReader::open(path).unwrap().with_guessed_format().unwrap().decode().unwrap()
}

async fn collect_until_terminal(events: &mut UnboundedReceiver<BatchEvent>) -> Vec<BatchEvent> {
    let mut seen = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(30), events.recv())
            .await
            .expect("timed out waiting for a batch event")
            .expect("event channel closed");
        let done = event.is_terminal();
        seen.push(event);
        if done {
            return seen;
        }
    }
}

/// Holds every job until the test releases it.
struct GatedConverter {
    inner: ConversionEngine,
    gate: Mutex<mpsc::Receiver<()>>,
}

impl GatedConverter {
    fn new() -> (Self, mpsc::Sender<()>) {
        let (release, gate) = mpsc::channel();
        let converter = Self {
            inner: ConversionEngine::default(),
            gate: Mutex::new(gate),
        };
        (converter, release)
    }
}

impl ImageConverter for GatedConverter {
    fn convert_and_save_with_progress(
        &self,
        job: &ConversionJob,
        on_converted: &mut dyn FnMut(&ConvertedImage),
    ) -> Result<usize, ConversionError> {
        let _ = self.gate.lock().unwrap().recv();
        self.inner.convert_and_save_with_progress(job, on_converted)
    }
}

#[tokio::test]
async fn empty_selection_is_rejected_without_events() {
    let out = tempdir().unwrap();
    let (orchestrator, mut events) =
        BatchJobOrchestrator::with_engine(ConversionEngine::default(), Handle::current());

    let err = orchestrator
        .start_batch("100", "", &out.path().to_string_lossy())
        .unwrap_err();

    assert_eq!(err, ConverterError::NoImagesSelected);
    assert_eq!(orchestrator.state(), JobState::Idle);
    assert!(events.try_recv().is_err());
}

#[tokio::test]
async fn invalid_dimensions_are_rejected_without_events() {
    let src = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (orchestrator, mut events) =
        BatchJobOrchestrator::with_engine(ConversionEngine::default(), Handle::current());
    orchestrator.add_image(write_png(src.path(), "a.png", 10, 10)).unwrap();

    let destination = out.path().to_string_lossy();
    assert_eq!(
        orchestrator.start_batch("0", "0", &destination).unwrap_err(),
        ConverterError::InvalidDimension(DimensionError::BothZero)
    );
    assert!(matches!(
        orchestrator.start_batch("wide", "", &destination).unwrap_err(),
        ConverterError::InvalidDimension(DimensionError::NotANumber { .. })
    ));
    assert!(matches!(
        orchestrator.start_batch("-1", "10", &destination).unwrap_err(),
        ConverterError::InvalidDimension(DimensionError::Negative { .. })
    ));

    assert!(events.try_recv().is_err());
    assert_eq!(orchestrator.selection().len(), 1);
    assert_eq!(orchestrator.state(), JobState::Idle);
}

#[tokio::test]
async fn successful_batch_clears_selection_and_resets_input() {
    let src = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (orchestrator, mut events) =
        BatchJobOrchestrator::with_engine(ConversionEngine::default(), Handle::current());

    orchestrator.add_image(write_png(src.path(), "first.png", 400, 200)).unwrap();
    orchestrator.add_image(write_png(src.path(), "second.PNG", 400, 200)).unwrap();
    orchestrator.update_dimension_input(|input| input.set_width("200")).unwrap();

    let job_id = orchestrator
        .start_pending_batch(&out.path().to_string_lossy())
        .unwrap();
    let seen = collect_until_terminal(&mut events).await;

    assert_eq!(seen.len(), 4);
    assert!(matches!(seen[0], BatchEvent::Started { total_images: 2, .. }));
    match &seen[1] {
        BatchEvent::Progress(progress) => {
            assert_eq!((progress.completed, progress.total, progress.percentage), (1, 2, 50));
            assert_eq!(progress.message, "first.png converted (200×100)");
        }
        other => panic!("expected progress, got {other:?}"),
    }
    assert!(matches!(seen[2], BatchEvent::Progress(ref p) if p.percentage == 100));
    assert!(matches!(seen[3], BatchEvent::Completed { images_written: 2, .. }));
    assert!(seen.iter().all(|event| event.job_id() == job_id));

    assert!(orchestrator.selection_is_empty());
    assert_eq!(orchestrator.state(), JobState::Idle);
    assert_eq!(orchestrator.dimension_input(), Default::default());

    let first = read_back(&out.path().join("convertedfirst.png"));
    assert_eq!(first.dimensions(), (200, 100));
    assert!(out.path().join("convertedsecond.PNG").exists());
}

#[tokio::test]
async fn failed_batch_keeps_selection_and_reports_once() {
    let src = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (orchestrator, mut events) =
        BatchJobOrchestrator::with_engine(ConversionEngine::default(), Handle::current());

    orchestrator.add_image(write_png(src.path(), "a.png", 40, 20)).unwrap();
    orchestrator.add_image(write_garbage(src.path(), "b.png")).unwrap();
    orchestrator.add_image(write_png(src.path(), "c.png", 40, 20)).unwrap();

    orchestrator
        .start_batch("20", "10", &out.path().to_string_lossy())
        .unwrap();
    let seen = collect_until_terminal(&mut events).await;

    let terminals: Vec<_> = seen.iter().filter(|e| e.is_terminal()).collect();
    assert_eq!(terminals.len(), 1);
    match terminals[0] {
        BatchEvent::Failed { filename, error, .. } => {
            assert_eq!(filename.as_deref(), Some("b.png"));
            assert!(error.contains("b.png"));
        }
        other => panic!("expected failure, got {other:?}"),
    }
    assert!(!seen.iter().any(|e| matches!(e, BatchEvent::Completed { .. })));

    // Fail-fast: a.png was written, c.png never attempted
    assert!(out.path().join("converteda.png").exists());
    assert!(!out.path().join("convertedc.png").exists());

    assert_eq!(orchestrator.selection().len(), 3);
    assert_eq!(orchestrator.state(), JobState::Idle);
}

#[tokio::test]
async fn second_start_while_running_is_rejected() {
    let src = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (converter, release) = GatedConverter::new();
    let (orchestrator, mut events) = BatchJobOrchestrator::new(Arc::new(converter), Handle::current());
    let destination = out.path().to_string_lossy().to_string();

    orchestrator.add_image(write_png(src.path(), "a.png", 30, 30)).unwrap();
    let first = orchestrator.start_batch("", "15", &destination).unwrap();

    assert!(orchestrator.is_running());
    assert_eq!(
        orchestrator.start_batch("", "15", &destination).unwrap_err(),
        ConverterError::JobAlreadyRunning
    );

    // The running job owns the selection until it finishes
    assert_eq!(
        orchestrator.add_image(write_png(src.path(), "late.png", 30, 30)).unwrap_err(),
        ConverterError::SelectionLocked
    );
    assert_eq!(orchestrator.remove_image("a.png").unwrap_err(), ConverterError::SelectionLocked);
    assert_eq!(
        orchestrator.update_dimension_input(|input| input.set_width("5")).unwrap_err(),
        ConverterError::SelectionLocked
    );
    let names: Vec<_> = orchestrator.selection().into_iter().map(|image| image.filename).collect();
    assert_eq!(names, ["a.png"]);

    release.send(()).unwrap();
    let seen = collect_until_terminal(&mut events).await;
    assert_eq!(seen.iter().filter(|e| matches!(e, BatchEvent::Started { .. })).count(), 1);
    assert!(matches!(
        seen.last(),
        Some(BatchEvent::Completed { job_id, images_written: 1, .. }) if *job_id == first
    ));
    assert!(!out.path().join("convertedlate.png").exists());

    assert!(orchestrator.selection_is_empty());

    // The slot is free again
    orchestrator.add_image(write_png(src.path(), "b.png", 30, 30)).unwrap();
    release.send(()).unwrap();
    let second = orchestrator.start_batch("", "15", &destination).unwrap();
    assert!(second > first);
    let seen = collect_until_terminal(&mut events).await;
    assert!(matches!(seen.last(), Some(BatchEvent::Completed { .. })));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn concurrent_starts_admit_exactly_one_job() {
    let src = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (converter, release) = GatedConverter::new();
    let (orchestrator, mut events) = BatchJobOrchestrator::new(Arc::new(converter), Handle::current());
    let destination = out.path().to_string_lossy().to_string();
    orchestrator.add_image(write_png(src.path(), "a.png", 16, 16)).unwrap();

    let results: Vec<_> = std::thread::scope(|scope| {
        let handles: Vec<_> = (0..8)
            .map(|_| scope.spawn(|| orchestrator.start_batch("8", "", &destination)))
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });

    assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
    assert!(results
        .iter()
        .filter_map(|r| r.as_ref().err())
        .all(|e| *e == ConverterError::JobAlreadyRunning));

    release.send(()).unwrap();
    let seen = collect_until_terminal(&mut events).await;
    assert!(matches!(seen.last(), Some(BatchEvent::Completed { .. })));
}

#[tokio::test]
async fn retry_after_write_failure_succeeds() {
    let src = tempdir().unwrap();
    let out = tempdir().unwrap();
    let destination = out.path().join("not-yet");
    let (orchestrator, mut events) =
        BatchJobOrchestrator::with_engine(ConversionEngine::default(), Handle::current());
    orchestrator.add_image(write_png(src.path(), "a.png", 12, 12)).unwrap();

    orchestrator
        .start_batch("6", "6", &destination.to_string_lossy())
        .unwrap();
    let seen = collect_until_terminal(&mut events).await;
    assert!(matches!(seen.last(), Some(BatchEvent::Failed { .. })));
    assert_eq!(orchestrator.selection().len(), 1);

    std::fs::create_dir(&destination).unwrap();
    orchestrator
        .start_batch("6", "6", &destination.to_string_lossy())
        .unwrap();
    let seen = collect_until_terminal(&mut events).await;
    assert!(matches!(seen.last(), Some(BatchEvent::Completed { images_written: 1, .. })));
    assert_eq!(read_back(&destination.join("converteda.png")).dimensions(), (6, 6));
}

#[tokio::test]
async fn empty_destination_surfaces_as_failed_event() {
    let src = tempdir().unwrap();
    let (orchestrator, mut events) =
        BatchJobOrchestrator::with_engine(ConversionEngine::default(), Handle::current());
    orchestrator.add_image(write_png(src.path(), "a.png", 12, 12)).unwrap();

    orchestrator.start_batch("6", "", "").unwrap();
    let seen = collect_until_terminal(&mut events).await;

    assert_eq!(seen.len(), 2);
    assert!(matches!(
        &seen[1],
        BatchEvent::Failed { filename: None, error, .. } if error == "Path to saving location cannot be empty"
    ));
    assert_eq!(orchestrator.selection().len(), 1);
}

#[tokio::test]
async fn terminal_event_is_queued_before_state_returns_to_idle() {
    let src = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (converter, release) = GatedConverter::new();
    let (orchestrator, mut events) = BatchJobOrchestrator::new(Arc::new(converter), Handle::current());
    let destination = out.path().to_string_lossy().to_string();

    orchestrator.add_image(write_png(src.path(), "a.png", 10, 10)).unwrap();
    let first = orchestrator.start_batch("5", "", &destination).unwrap();
    release.send(()).unwrap();

    while orchestrator.is_running() {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    // Nothing awaited since Idle was observed: the whole first job is already queued
    let mut queued = Vec::new();
    while let Ok(event) = events.try_recv() {
        queued.push(event);
    }
    assert!(matches!(queued.last(), Some(BatchEvent::Completed { job_id, .. }) if *job_id == first));

    orchestrator.add_image(write_png(src.path(), "b.png", 10, 10)).unwrap();
    release.send(()).unwrap();
    let second = orchestrator.start_batch("5", "", &destination).unwrap();
    let seen = collect_until_terminal(&mut events).await;
    assert!(seen.iter().all(|event| event.job_id() == second));
}

struct PanickingConverter;

impl ImageConverter for PanickingConverter {
    fn convert_and_save_with_progress(
        &self,
        _job: &ConversionJob,
        _on_converted: &mut dyn FnMut(&ConvertedImage),
    ) -> Result<usize, ConversionError> {
        panic!("decoder blew up");
    }
}

#[tokio::test]
async fn worker_panic_surfaces_as_failed_event() {
    let src = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (orchestrator, mut events) = BatchJobOrchestrator::new(Arc::new(PanickingConverter), Handle::current());
    orchestrator.add_image(write_png(src.path(), "a.png", 10, 10)).unwrap();

    orchestrator.start_batch("5", "", &out.path().to_string_lossy()).unwrap();
    let seen = collect_until_terminal(&mut events).await;

    assert!(matches!(
        seen.last(),
        Some(BatchEvent::Failed { filename: None, error, .. }) if error.contains("panicked")
    ));
    assert_eq!(orchestrator.selection().len(), 1);
    assert_eq!(orchestrator.state(), JobState::Idle);
}

#[tokio::test]
async fn oversized_dimensions_fail_the_job_without_crashing() {
    let src = tempdir().unwrap();
    let out = tempdir().unwrap();
    let (orchestrator, mut events) =
        BatchJobOrchestrator::with_engine(ConversionEngine::default(), Handle::current());
    orchestrator.add_image(write_png(src.path(), "x.png", 2, 2)).unwrap();

    orchestrator.start_batch("4294967295", "", &out.path().to_string_lossy()).unwrap();
    let seen = collect_until_terminal(&mut events).await;

    assert!(matches!(
        seen.last(),
        Some(BatchEvent::Failed { filename: Some(name), .. }) if name == "x.png"
    ));
    assert_eq!(orchestrator.selection().len(), 1);
    assert_eq!(orchestrator.state(), JobState::Idle);
}
