//! CLI tool for generating customised campaign pitch decks.

use anyhow::{bail, Context, Result};
use clap::Parser;
use deck_core::ClientData;
use deck_pptx::{DeckGenerator, GeneratorConfig, LogoOutcome};
use std::fs;
use std::path::{Path, PathBuf};

/// Generate a client-specific pitch deck from the template.
#[derive(Parser, Debug)]
#[command(name = "deck-generate")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Template .pptx file
    #[arg(short, long, env = "TEMPLATE_PATH")]
    template: PathBuf,

    /// JSON file with brandName, industry, targetAudience, primaryChannels, keyRegions
    #[arg(long, conflicts_with_all = ["brand", "industry", "audience"])]
    brief: Option<PathBuf>,

    /// Brand name
    #[arg(long, required_unless_present = "brief")]
    brand: Option<String>,

    /// Industry
    #[arg(long, required_unless_present = "brief")]
    industry: Option<String>,

    /// Target audience, e.g. "Female, Age 25-40"
    #[arg(long, required_unless_present = "brief")]
    audience: Option<String>,

    /// Primary channel (TV, RADIO, DIGITAL); repeat for several
    #[arg(short = 'c', long = "channel")]
    channels: Vec<String>,

    /// Key region; repeat for several (default: Pan India)
    #[arg(short = 'r', long = "region")]
    regions: Vec<String>,

    /// Logo image to place on the client slide
    #[arg(long)]
    logo: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, default_value = "output-ppt")]
    output: PathBuf,

    /// Parent directory for temporary working directories
    #[arg(long)]
    work_dir: Option<PathBuf>,

    /// Fail if any placeholder in the template is not found
    #[arg(long)]
    strict: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    }

    let data = client_data(&args)?;
    if data.channel_text().is_none() {
        bail!("At least one primary channel must be TV, RADIO or DIGITAL");
    }

    let work_root = args
        .work_dir
        .clone()
        .unwrap_or_else(|| std::env::temp_dir().join("deck-work"));

    let config = GeneratorConfig::new(&args.template, work_root, &args.output)
        .with_strict_fields(args.strict);
    let generator = DeckGenerator::new(config);

    let deck = generator
        .generate(&data, args.logo.as_deref())
        .await
        .with_context(|| format!("Failed to generate deck for '{}'", data.brand_name))?;

    for field in deck.report.missing() {
        eprintln!("warning: {} placeholder not found in template", field);
    }
    if args.verbose {
        match &deck.logo {
            LogoOutcome::Skipped => eprintln!("  Logo: unchanged"),
            LogoOutcome::Replaced {
                file_name,
                manifest_rewritten,
            } => eprintln!(
                "  Logo: {}{}",
                file_name,
                if *manifest_rewritten { " (relationship updated)" } else { "" }
            ),
        }
    }

    println!("{}", deck.path.display());
    Ok(())
}

/// Build client data from a brief file or the individual flags.
fn client_data(args: &Args) -> Result<ClientData> {
    if let Some(path) = &args.brief {
        return read_brief(path);
    }

    // clap enforces presence when --brief is absent
    let (Some(brand), Some(industry), Some(audience)) =
        (&args.brand, &args.industry, &args.audience)
    else {
        bail!("--brand, --industry and --audience are required without --brief");
    };

    Ok(ClientData::new(brand, industry, audience)
        .with_channels(args.channels.iter().cloned())
        .with_regions(args.regions.iter().cloned()))
}

fn read_brief(path: &Path) -> Result<ClientData> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("Invalid brief in {}", path.display()))
}
