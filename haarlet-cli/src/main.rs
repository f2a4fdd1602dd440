use clap::{Parser, ValueEnum};
use haarlet::{EdgePolicy, PipelineConfig, ProcessingSize, Session};
use haarlet_cli::{load_intensity, save_coefficients, save_intensity, ColorMap};
use std::error::Error;
use std::path::PathBuf;

#[derive(ValueEnum, Clone, Copy)]
enum EdgeArg {
    Reject,
    Truncate,
    Pad,
}

impl From<EdgeArg> for EdgePolicy {
    fn from(arg: EdgeArg) -> Self {
        match arg {
            EdgeArg::Reject => EdgePolicy::Reject,
            EdgeArg::Truncate => EdgePolicy::Truncate,
            EdgeArg::Pad => EdgePolicy::Pad,
        }
    }
}

/// Decompose an image with a multi-level Haar transform, sparsify, reconstruct and report quality.
///
/// Unset options fall back to HAARLET_* environment variables, then to defaults.
#[derive(Parser)]
#[command(name = "haarlet", version)]
struct Args {
    /// Path to the input image
    input: PathBuf,

    /// Number of decomposition levels
    #[arg(long)]
    levels: Option<usize>,

    /// Zero coefficients with magnitude below this value
    #[arg(long)]
    epsilon: Option<f64>,

    /// Use the 1/2 averaging normalization instead of the orthonormal one
    #[arg(long)]
    average: bool,

    /// Processing size: "auto" or a power of two
    #[arg(long)]
    size: Option<String>,

    /// Handling of dimensions not divisible by 2^levels
    #[arg(long, value_enum)]
    edge_policy: Option<EdgeArg>,

    /// Colour map for the coefficient image
    #[arg(long, value_enum, default_value_t = ColorMap::Gray)]
    colormap: ColorMap,

    /// Directory receiving source.png, coefficients.png and haar_result.png
    #[arg(long, default_value = ".")]
    out_dir: PathBuf,

    /// Also report quality for each of these epsilons (comma separated)
    #[arg(long, value_delimiter = ',')]
    sweep: Vec<f64>,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();
    let args = Args::parse();

    let mut config = PipelineConfig::from_env();
    if let Some(levels) = args.levels {
        config.levels = levels;
    }
    if let Some(epsilon) = args.epsilon {
        config.threshold_epsilon = epsilon;
    }
    if args.average {
        config.orthonormal = false;
    }
    if let Some(size) = &args.size {
        config.processing_size = size.parse::<ProcessingSize>()?;
    }
    if let Some(edge) = args.edge_policy {
        config.edge_policy = edge.into();
    }
    config.validate()?;

    let source = load_intensity(&args.input, config.processing_size)?;
    std::fs::create_dir_all(&args.out_dir)?;
    save_intensity(&source, &args.out_dir.join("source.png"))?;
    println!("source: {}x{} px", source.width(), source.height());

    let session = Session::with_edge_policy(config.edge_policy);
    let ctx = session.prepare(source);
    let outcome = session.recompute(&ctx, &config)?;

    save_coefficients(
        &outcome.coefficients,
        args.colormap,
        &args.out_dir.join("coefficients.png"),
    )?;
    save_intensity(&outcome.reconstruction, &args.out_dir.join("haar_result.png"))?;

    let (w, h) = (outcome.coefficients.width(), outcome.coefficients.height());
    println!(
        "coefficients: {w}x{h} L={} eps={} {}",
        config.levels,
        config.threshold_epsilon,
        if config.orthonormal { "orthonormal" } else { "average" }
    );
    if let Some(s) = outcome.report.sparsity {
        println!(
            "nonzero: {} / {} (compression ~ {:.2}:1)",
            s.nonzero,
            s.total,
            s.compression_ratio()
        );
    }
    println!("quality: {}", outcome.report);

    if !args.sweep.is_empty() {
        let pristine = session.run_forward(&ctx, config.levels, 0.0, config.orthonormal)?;
        for point in session.sweep(&ctx, &pristine.coefficients, &args.sweep)? {
            println!("sweep eps={:>8}: {}", point.epsilon, point.report);
        }
    }
    Ok(())
}
