use std::fs;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mosaic_core::{ColorMetric, ConvertOptions};
use tessera::convert::{self, StatsJson};

#[derive(Parser)]
#[command(name = "tessera")]
#[command(about = "Renders raster images as token grids drawn from large color palettes")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert an image into a palette token grid
    Convert(ConvertArgs),
}

#[derive(clap::Args)]
struct ConvertArgs {
    /// Palette description file (JSON array of entries)
    palette: PathBuf,

    /// Source image (any format the `image` crate decodes)
    image: PathBuf,

    /// Output grid width in cells
    #[arg(short = 'W', long)]
    width: usize,

    /// Output grid height in cells
    #[arg(short = 'H', long)]
    height: usize,

    /// Write token text to a file instead of stdout
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Print a statistics summary after the token text
    #[arg(long)]
    stats: bool,

    /// Emit the statistics summary as JSON (implies --stats)
    #[arg(long)]
    stats_json: bool,

    /// Serialized length budget in characters (0 = unlimited)
    #[arg(long, default_value_t = 0)]
    char_budget: usize,

    /// Entry reuse tolerance, 0-100 (0 = near-unique, 100 = unlimited)
    #[arg(long, default_value_t = 100)]
    tolerance: u32,

    /// Disable error-diffusion dithering
    #[arg(long)]
    no_dithering: bool,

    /// Base diffusion strength, 0-100
    #[arg(long, default_value_t = 80)]
    dithering_strength: u32,

    /// Weight against high-texture entries, 0-100
    #[arg(long, default_value_t = 50)]
    texture_penalty: u32,

    /// Base supersampling grid side, 1-8
    #[arg(long, default_value_t = 3)]
    raster_samples: u32,

    /// Perceptual distance metric
    #[arg(long, value_enum, default_value_t = MetricArg::Oklab)]
    color_metric: MetricArg,

    /// Raise per-cell supersampling on detected edges
    #[arg(long)]
    adaptive_sampling: bool,

    /// Attenuate diffusion strength by local variance
    #[arg(long)]
    adaptive_dithering: bool,

    /// Use bilinear sub-sampling instead of Lanczos3
    #[arg(long)]
    bilinear: bool,

    /// Ordered dithering in flat regions, diffusion elsewhere
    #[arg(long)]
    hybrid_dithering: bool,

    /// Cap each diffused error share at 0.1 per channel
    #[arg(long)]
    diffusion_clamp: bool,

    /// Run the spatial coherence cleanup pass
    #[arg(long)]
    spatial_coherence: bool,

    /// Run the outlier median filter pass
    #[arg(long)]
    median_filter: bool,

    /// Scale usage caps per entry by chroma
    #[arg(long)]
    per_color_tolerance: bool,

    /// Local contrast equalization before matching
    #[arg(long)]
    clahe: bool,

    /// Unsharp mask amount (0 disables)
    #[arg(long, default_value_t = 0.0)]
    sharpening_strength: f32,

    /// Saturation factor (1.0 = identity)
    #[arg(long, default_value_t = 1.0)]
    saturation_boost: f32,

    /// Spatial coherence slack multiplier
    #[arg(long, default_value_t = 1.0)]
    coherence_strength: f32,

    /// Local contrast strength
    #[arg(long, default_value_t = 0.3)]
    clahe_strength: f32,

    /// Entry name substring exempt from usage caps (repeatable)
    #[arg(long = "cap-exempt", value_name = "SUBSTRING")]
    cap_exempt: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum MetricArg {
    Oklab,
    OklabHk,
    Ciede2000,
    Jzazbz,
}

impl From<MetricArg> for ColorMetric {
    fn from(arg: MetricArg) -> Self {
        match arg {
            MetricArg::Oklab => ColorMetric::Oklab,
            MetricArg::OklabHk => ColorMetric::OklabHk,
            MetricArg::Ciede2000 => ColorMetric::Ciede2000,
            MetricArg::Jzazbz => ColorMetric::Jzazbz,
        }
    }
}

impl ConvertArgs {
    fn to_options(&self) -> ConvertOptions {
        let defaults = ConvertOptions::default();
        ConvertOptions {
            char_budget: self.char_budget,
            tolerance: self.tolerance,
            dithering: !self.no_dithering,
            dithering_strength: self.dithering_strength,
            texture_penalty: self.texture_penalty,
            raster_samples: self.raster_samples,
            color_metric: self.color_metric.into(),
            adaptive_sampling: self.adaptive_sampling,
            adaptive_dithering: self.adaptive_dithering,
            lanczos: !self.bilinear,
            hybrid_dithering: self.hybrid_dithering,
            diffusion_clamp: self.diffusion_clamp,
            spatial_coherence: self.spatial_coherence,
            median_filter: self.median_filter,
            per_color_tolerance: self.per_color_tolerance,
            clahe: self.clahe,
            sharpening_strength: self.sharpening_strength,
            saturation_boost: self.saturation_boost,
            coherence_strength: self.coherence_strength,
            clahe_strength: self.clahe_strength,
            cap_exempt: if self.cap_exempt.is_empty() {
                defaults.cap_exempt
            } else {
                self.cap_exempt.clone()
            },
        }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tessera=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(Commands::Convert(args)) => run_convert(&args),
        None => {
            print_status();
            Ok(())
        }
    }
}

fn run_convert(args: &ConvertArgs) -> anyhow::Result<()> {
    let report = convert::run(
        &args.palette,
        &args.image,
        args.width,
        args.height,
        args.to_options(),
    )?;

    match &args.output {
        Some(path) => {
            fs::write(path, &report.text)?;
            println!("Wrote {} ({} chars)", path.display(), report.stats.chars);
        }
        None => println!("{}", report.text),
    }

    if args.stats_json {
        println!(
            "{}",
            serde_json::to_string_pretty(&StatsJson::from(&report.stats))?
        );
    } else if args.stats {
        print!("{}", convert::format_stats(&report.stats));
    }

    Ok(())
}

fn print_status() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    println!("Tessera v{VERSION}");
    println!("Renders raster images as token grids drawn from color palettes.\n");
    println!("Commands:");
    println!("  tessera convert   Convert an image into a palette token grid");
    println!("\nRun 'tessera convert --help' for the full option list.");
}
