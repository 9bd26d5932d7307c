use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::process;

use clap::{ArgGroup, Parser};

use facelens_core::classification::domain::attribute_classifier::AttributeClassifier;
use facelens_core::detection::domain::face_localizer::FaceLocalizer;
use facelens_core::inference::infrastructure::onnx_model::OnnxModel;
use facelens_core::pipeline::pipeline_logger::StatusPrinter;
use facelens_core::pipeline::process_frame_use_case::ProcessFrameUseCase;
use facelens_core::pipeline::run_session_use_case::{RunSessionUseCase, SessionSummary};
use facelens_core::pipeline::stop_signal::{stop_channel, StopHandle};
use facelens_core::shared::blob::BlobParams;
use facelens_core::shared::config::SessionConfig;
use facelens_core::shared::constants::{
    DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_PADDING, IMAGE_EXTENSIONS,
};
use facelens_core::shared::model_resolver::{resolve_models_dir, ModelFiles};
use facelens_core::shared::video_metadata::InputSource;
use facelens_core::video::domain::frame_sink::{FrameSink, NullFrameSink};
use facelens_core::video::domain::video_reader::VideoReader;
use facelens_core::video::infrastructure::ffmpeg_reader::FfmpegReader;
use facelens_core::video::infrastructure::ffmpeg_writer::FfmpegWriter;
use facelens_core::video::infrastructure::image_file_reader::ImageFileReader;
use facelens_core::video::infrastructure::image_file_writer::ImageFileSink;

/// Face detection with age and gender prediction for images, videos and cameras.
///
/// Type `q` then Enter to stop a running session.
#[derive(Parser)]
#[command(name = "facelens")]
#[command(group(ArgGroup::new("input").args(["image", "video", "device"])))]
struct Cli {
    /// Still image to analyze.
    #[arg(long)]
    image: Option<PathBuf>,

    /// Video file to analyze.
    #[arg(long)]
    video: Option<PathBuf>,

    /// Capture device index (default when no input is given: 0).
    #[arg(long)]
    device: Option<u32>,

    /// Face detection confidence threshold, in (0, 1].
    #[arg(long, default_value_t = DEFAULT_CONFIDENCE_THRESHOLD)]
    confidence: f64,

    /// Pixels added around each face before classification.
    #[arg(long, default_value_t = DEFAULT_PADDING)]
    padding: u32,

    /// Directory holding the detector, age and gender models.
    #[arg(long)]
    models_dir: Option<PathBuf>,

    /// Write annotated output (image for --image, MP4 video otherwise).
    #[arg(long)]
    output: Option<PathBuf>,

    /// Log progress every N frames.
    #[arg(long, default_value = "100")]
    summary_every: usize,
}

impl Cli {
    fn source(&self) -> InputSource {
        if let Some(path) = &self.image {
            InputSource::Image(path.clone())
        } else if let Some(path) = &self.video {
            InputSource::Video(path.clone())
        } else {
            InputSource::Device(self.device.unwrap_or(0))
        }
    }
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    validate(&cli)?;

    let config = SessionConfig::new(cli.confidence, cli.padding)?;
    let source = cli.source();

    let models_dir = resolve_models_dir(cli.models_dir.as_deref())?;
    let models = ModelFiles::in_dir(&models_dir)?;
    log::info!("Using models from {}", models_dir.display());

    let frame_pipeline = build_pipeline(&models, config)?;
    let reader = open_reader(&source);
    let sink = open_sink(&source, cli.output.as_deref());

    let (stop_handle, stop_signal) = stop_channel();
    if !matches!(source, InputSource::Image(_)) {
        watch_stdin(stop_handle);
    }

    let mut use_case = RunSessionUseCase::new(
        reader,
        sink,
        frame_pipeline,
        Box::new(StatusPrinter::new(cli.summary_every)),
        stop_signal,
    );
    let summary = use_case.execute(&source)?;
    report(&summary);

    if let Some(output) = &cli.output {
        log::info!("Output written to {}", output.display());
    }
    Ok(())
}

fn build_pipeline(
    models: &ModelFiles,
    config: SessionConfig,
) -> Result<ProcessFrameUseCase, Box<dyn std::error::Error>> {
    let detector = FaceLocalizer::new(
        Box::new(OnnxModel::load(&models.detector)?),
        BlobParams::detector(),
    );
    let classifier = AttributeClassifier::new(
        Box::new(OnnxModel::load(&models.age)?),
        Box::new(OnnxModel::load(&models.gender)?),
        BlobParams::classifier(),
    );
    Ok(ProcessFrameUseCase::new(Box::new(detector), classifier, config))
}

fn validate(cli: &Cli) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(image) = &cli.image {
        if !image.is_file() {
            return Err(format!("Input image not found: {}", image.display()).into());
        }
    }
    if let Some(video) = &cli.video {
        if !video.is_file() {
            return Err(format!("Input video not found: {}", video.display()).into());
        }
    }
    if let (Some(_), Some(output)) = (&cli.image, &cli.output) {
        if !is_image(output) {
            return Err(format!(
                "Output for --image must be an image file ({}), got {}",
                IMAGE_EXTENSIONS.join(", "),
                output.display()
            )
            .into());
        }
    }
    if cli.summary_every == 0 {
        return Err("--summary-every must be at least 1".into());
    }
    Ok(())
}

fn is_image(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn open_reader(source: &InputSource) -> Box<dyn VideoReader> {
    match source {
        InputSource::Image(_) => Box::new(ImageFileReader::new()),
        InputSource::Video(_) | InputSource::Device(_) => Box::new(FfmpegReader::new()),
    }
}

fn open_sink(source: &InputSource, output: Option<&Path>) -> Box<dyn FrameSink> {
    match (source, output) {
        (_, None) => Box::new(NullFrameSink),
        (InputSource::Image(_), Some(path)) => Box::new(ImageFileSink::new(path)),
        (_, Some(path)) => Box::new(FfmpegWriter::new(path)),
    }
}

/// Stops the session when a line reading `q` arrives on stdin.
fn watch_stdin(stop: StopHandle) {
    eprintln!("Type q and press Enter to stop.");
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) if line.trim().eq_ignore_ascii_case("q") => {
                    stop.stop();
                    return;
                }
                Ok(_) => {}
                Err(_) => return,
            }
        }
    });
}

fn report(summary: &SessionSummary) {
    log::info!(
        "Processed {} frames ({}): {} faces classified, {} frames without faces",
        summary.frames_processed,
        summary.stop_reason,
        summary.faces_classified,
        summary.frames_without_faces
    );
    if summary.detector_failures > 0 {
        log::warn!("Face detection failed on {} frames", summary.detector_failures);
    }
    if summary.skipped_candidates > 0 {
        log::warn!("{} faces could not be classified", summary.skipped_candidates);
    }
    if summary.frame_errors > 0 {
        log::warn!("{} frames could not be decoded", summary.frame_errors);
    }
}
