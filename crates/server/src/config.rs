use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the deck server.
#[derive(Parser, Debug, Clone)]
#[command(name = "deck-server")]
#[command(about = "Campaign brief intake and pitch-deck download server")]
pub struct Config {
    /// TCP host to bind to
    #[arg(long, default_value = "0.0.0.0", env = "HOST")]
    pub host: String,

    /// TCP port to bind to
    #[arg(long, default_value = "3000", env = "PORT")]
    pub port: u16,

    /// Template deck customised for each client
    #[arg(
        long,
        default_value = "input-client-ppt/EP-Sales-Pitch-Deck.pptx",
        env = "TEMPLATE_PATH"
    )]
    pub template_path: PathBuf,

    /// Directory generated decks are written to
    #[arg(long, default_value = "output-ppt", env = "OUTPUT_DIR")]
    pub output_dir: PathBuf,

    /// Parent directory of per-request working directories
    #[arg(long, default_value = "temp-extract", env = "WORK_DIR")]
    pub work_dir: PathBuf,

    /// Directory uploaded logos are staged in
    #[arg(long, default_value = "uploads", env = "UPLOAD_DIR")]
    pub upload_dir: PathBuf,

    /// Directory for persisted briefs (in-memory store if unset)
    #[arg(long, env = "DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Age after which an orphaned working directory is removed
    #[arg(long, default_value = "900", env = "REAPER_GRACE_SECS")]
    pub reaper_grace_secs: u64,

    /// Fail generation when a template placeholder is not found
    #[arg(long, env = "STRICT_FIELDS")]
    pub strict_fields: bool,
}

impl Config {
    pub fn reaper_grace(&self) -> Duration {
        Duration::from_secs(self.reaper_grace_secs)
    }

    /// How often the reaper sweeps: a quarter of the grace period, at least a minute.
    pub fn reaper_interval(&self) -> Duration {
        Duration::from_secs((self.reaper_grace_secs / 4).max(60))
    }
}
