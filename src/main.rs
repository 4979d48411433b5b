// Headless front end: wires the converter together, feeds it the files from
// the command line and prints lifecycle events as they arrive.

use anyhow::{bail, Context};
use tokio::runtime::Handle;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use image_converter_lib::{
    BatchEvent, BatchJobOrchestrator, ConversionEngine, ConverterConfig,
};

const USAGE: &str = "usage: image-converter <destination> <width|-> <height|-> <image>...";
const CONFIG_ENV: &str = "IMAGE_CONVERTER_CONFIG";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();

    let mut args = std::env::args().skip(1);
    let (Some(destination), Some(width), Some(height)) = (args.next(), args.next(), args.next()) else {
        bail!(USAGE);
    };
    let files: Vec<String> = args.collect();

    let config = match std::env::var_os(CONFIG_ENV) {
        Some(path) => ConverterConfig::load(&path)
            .with_context(|| format!("loading {}", path.to_string_lossy()))?,
        None => ConverterConfig::default(),
    };
    debug!("Using config: {:?}", config);

    let (orchestrator, mut events) =
        BatchJobOrchestrator::with_engine(ConversionEngine::new(config), Handle::current());

    let added = orchestrator.add_paths(&files)?;
    info!("{} files selected, {} after de-duplication", added, orchestrator.selection().len());

    orchestrator.update_dimension_input(|input| {
        if width != "-" {
            input.set_width(width);
        }
        if height != "-" {
            input.set_height(height);
        }
    })?;

    let job_id = orchestrator.start_pending_batch(&destination)?;

    while let Some(event) = events.recv().await {
        if event.job_id() != job_id {
            continue;
        }

        match event {
            BatchEvent::Started { message, total_images, .. } => {
                println!("{message} ({total_images} images)");
            }
            BatchEvent::Progress(progress) => {
                println!("[{:>3}%] {}", progress.percentage, progress.message);
            }
            BatchEvent::Completed { message, .. } => {
                println!("{message}");
                break;
            }
            BatchEvent::Failed { error, .. } => {
                bail!(error);
            }
        }
    }

    Ok(())
}
