use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

use framealign_core::{
    FfmpegSampler, JsonResultStore, Pipeline, RunOutcome, TesseractExtractor, WhisperTranscriber,
    ensure_model, find_videos, format_batch_summary, get_root_cache_dir, video_name,
};

fn format_duration(d: Duration) -> String {
    let secs = d.as_secs_f64();
    if secs < 60.0 {
        format!("{:.1}s", secs)
    } else {
        format!("{:.0}m {:.0}s", secs / 60.0, secs % 60.0)
    }
}

#[derive(Parser)]
#[command(name = "framealign")]
#[command(
    about = "Sample video frames, transcribe speech with Whisper, and align frames with the transcript"
)]
struct Cli {
    /// Directory containing the videos to process
    #[arg(default_value = "videos")]
    videos_dir: PathBuf,

    /// Directory for frame images and JSON results
    #[arg(short, long, default_value = "output")]
    output: PathBuf,

    /// Frame sampling rate in frames per second
    #[arg(short, long, default_value_t = 1.0)]
    rate: f64,

    /// Path to a whisper model file (downloaded to the cache dir if omitted)
    #[arg(short, long)]
    model: Option<PathBuf>,
}

fn create_spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ ")
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}

extern "C" fn whisper_log_callback(
    _level: u32,
    _message: *const std::ffi::c_char,
    _user_data: *mut std::ffi::c_void,
) {
    // silent
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    unsafe {
        whisper_rs::set_log_callback(Some(whisper_log_callback), std::ptr::null_mut());
    }

    if !cli.videos_dir.is_dir() {
        eprintln!(
            "{} videos directory not found: {}",
            style("Error:").red().bold(),
            cli.videos_dir.display()
        );
        std::process::exit(1);
    }

    let videos = find_videos(&cli.videos_dir)?;
    if videos.is_empty() {
        eprintln!(
            "{} no video files found in {}",
            style("Error:").red().bold(),
            cli.videos_dir.display()
        );
        std::process::exit(1);
    }

    println!(
        "\n{}  {}\n",
        style("framealign").cyan().bold(),
        style("Frame / Transcript Aligner").dim()
    );

    let model_path = match cli.model {
        Some(path) => path,
        None => {
            println!("{} Checking model...", style("✓").green().bold());
            ensure_model(&get_root_cache_dir()).await?
        }
    };

    println!(
        "{} Found {} video(s) in {}",
        style("✓").green().bold(),
        videos.len(),
        style(cli.videos_dir.display()).dim()
    );
    println!("{}", style("─".repeat(60)).dim());

    let pipeline = Pipeline::new(
        FfmpegSampler::new(cli.rate),
        WhisperTranscriber::new(model_path),
        TesseractExtractor::new(),
        JsonResultStore::new(cli.output.clone()),
        cli.output.clone(),
    );

    let total_start = Instant::now();

    let mut current: Option<(ProgressBar, Instant)> = Some((
        create_spinner(&format!("Processing {}...", video_name(&videos[0]))),
        Instant::now(),
    ));
    let mut next_index = 1;

    let report = pipeline
        .run_batch(&videos, |outcome| {
            if let Some((pb, started)) = current.take() {
                let elapsed = style(format!("[{}]", format_duration(started.elapsed()))).dim();
                match outcome {
                    RunOutcome::Success(summary) => pb.finish_with_message(format!(
                        "{} {}: {} frames, {} segments, {} pairs {}",
                        style("✓").green().bold(),
                        summary.video_name,
                        summary.frames,
                        summary.segments,
                        summary.pairs,
                        elapsed
                    )),
                    RunOutcome::Error {
                        video_name,
                        message,
                    } => pb.finish_with_message(format!(
                        "{} {}: {} {}",
                        style("✗").red().bold(),
                        video_name,
                        message,
                        elapsed
                    )),
                }
            }
            if next_index < videos.len() {
                current = Some((
                    create_spinner(&format!("Processing {}...", video_name(&videos[next_index]))),
                    Instant::now(),
                ));
                next_index += 1;
            }
        })
        .await;

    println!("{}", style("─".repeat(60)).dim());
    println!("\n{}\n", style("PROCESSING SUMMARY").bold());
    print!("{}", format_batch_summary(&report));

    println!(
        "\n{} {}",
        style("Total time:").dim(),
        style(format_duration(total_start.elapsed())).cyan().bold()
    );
    println!(
        "{} {}\n",
        style("Results saved in:").dim(),
        style(cli.output.display()).cyan()
    );

    if report.has_failures() {
        std::process::exit(1);
    }

    Ok(())
}
