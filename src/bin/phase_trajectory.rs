use anyhow::{Context, Result};
use clap::Parser;
use glo_stim::core::phase::accumulate_phase;
use glo_stim::core::sequence_file::parse_sequence;
use glo_stim::utils::logger;

#[derive(Parser)]
#[command(name = "phase-trajectory")]
#[command(about = "Turn a drift coefficient sequence into grating phases in [0, 1)")]
struct Args {
    /// Comma-separated sequence file with drift coefficients
    file: String,

    /// Drift rate(s) in degrees per coefficient unit (comma-separated)
    #[arg(short, long, required = true, value_delimiter = ',', allow_negative_numbers = true)]
    rate: Vec<f64>,

    /// Treat rates as degrees per second and divide by this frame rate
    #[arg(long)]
    fps: Option<f64>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    logger::init_cli_logger(args.verbose);

    let data = std::fs::read(&args.file)
        .with_context(|| format!("Failed to read sequence file '{}'", args.file))?;
    let coefficients = parse_sequence(&args.file, &data)?;
    tracing::info!("Read {} drift coefficients from {}", coefficients.len(), args.file);

    if let Some(fps) = args.fps {
        anyhow::ensure!(fps.is_finite() && fps > 0.0, "--fps must be positive, got {}", fps);
    }

    let mut writer = csv::Writer::from_writer(std::io::stdout());
    writer.write_record(["index", "rate", "phase"])?;

    for &rate in &args.rate {
        let per_frame = args.fps.map(|fps| rate / fps).unwrap_or(rate);
        tracing::debug!("Rate {} -> {} per frame", rate, per_frame);

        for (index, phase) in accumulate_phase(&coefficients, per_frame).iter().enumerate() {
            writer.write_record([index.to_string(), rate.to_string(), phase.to_string()])?;
        }
    }

    writer.flush()?;
    Ok(())
}
