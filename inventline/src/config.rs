//! Command-line and environment configuration.
//!
//! Everything is read once at startup. Layout constants in particular are
//! fixed for the lifetime of the process.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use clap::{Parser, ValueEnum};

use crate::layout::{LayoutConstants, DEFAULT_MIN_GAP, DEFAULT_SCALE_FACTOR};
use crate::lookup::{
    LookupBackend, DEFAULT_GEMINI_BASE_URL, DEFAULT_GEMINI_MODEL, DEFAULT_LOCAL_ENDPOINT,
    DEFAULT_TIMEOUT,
};
use crate::timeline::DEFAULT_PIXELS_PER_ROW;

/// Which service answers year lookups
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum BackendKind {
    /// Local HTTP endpoint taking `{"item": ...}` and returning `{"year": ...}`
    #[default]
    Local,
    /// Generative-language API prompted directly
    Gemini,
}

/// Terminal timeline of inventions
#[derive(Debug, Clone, Parser)]
#[command(name = "inventline", version, about)]
pub struct Args {
    /// Lookup backend
    #[arg(long, value_enum, env = "INVENTLINE_BACKEND", default_value_t = BackendKind::Local)]
    pub backend: BackendKind,

    /// Endpoint for the local backend
    #[arg(long, env = "INVENTLINE_ENDPOINT", default_value = DEFAULT_LOCAL_ENDPOINT)]
    pub endpoint: String,

    /// API key for the gemini backend
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub gemini_api_key: Option<String>,

    /// Model name for the gemini backend
    #[arg(long, env = "INVENTLINE_GEMINI_MODEL", default_value = DEFAULT_GEMINI_MODEL)]
    pub gemini_model: String,

    /// API base URL for the gemini backend
    #[arg(long, env = "INVENTLINE_GEMINI_BASE_URL", default_value = DEFAULT_GEMINI_BASE_URL)]
    pub gemini_base_url: String,

    /// HTTP request timeout in seconds
    #[arg(long, env = "INVENTLINE_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT.as_secs())]
    pub timeout_secs: u64,

    /// Pixels per year
    #[arg(long, env = "INVENTLINE_SCALE_FACTOR", default_value_t = DEFAULT_SCALE_FACTOR)]
    pub scale_factor: f64,

    /// Minimum pixels reserved per entry
    #[arg(long, env = "INVENTLINE_MIN_GAP", default_value_t = DEFAULT_MIN_GAP)]
    pub min_gap: f64,

    /// Layout pixels per terminal row
    #[arg(long, env = "INVENTLINE_PIXELS_PER_ROW", default_value_t = DEFAULT_PIXELS_PER_ROW)]
    pub pixels_per_row: f64,

    /// Start with the built-in reference inventions on the timeline
    #[arg(long)]
    pub seed_reference: bool,

    /// Directory for the diagnostic log file
    #[arg(long, env = "INVENTLINE_LOG_DIR")]
    pub log_dir: Option<PathBuf>,
}

/// Validated runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: LookupBackend,
    pub timeout: Duration,
    pub layout: LayoutConstants,
    pub pixels_per_row: f64,
    pub seed_reference: bool,
    pub log_dir: PathBuf,
}

impl Config {
    pub fn from_args(args: Args) -> Result<Self> {
        let layout = LayoutConstants {
            scale_factor: positive("--scale-factor", args.scale_factor)?,
            min_gap: positive("--min-gap", args.min_gap)?,
        };
        let pixels_per_row = positive("--pixels-per-row", args.pixels_per_row)?;

        if args.timeout_secs == 0 {
            bail!("--timeout-secs must be at least 1");
        }

        let backend = match args.backend {
            BackendKind::Local => LookupBackend::local(args.endpoint),
            BackendKind::Gemini => LookupBackend::gemini(
                args.gemini_base_url,
                args.gemini_model,
                args.gemini_api_key,
            )?,
        };

        Ok(Self {
            backend,
            timeout: Duration::from_secs(args.timeout_secs),
            layout,
            pixels_per_row,
            seed_reference: args.seed_reference,
            log_dir: args.log_dir.unwrap_or_else(std::env::temp_dir),
        })
    }
}

fn positive(flag: &str, value: f64) -> Result<f64> {
    if !value.is_finite() || value <= 0.0 {
        bail!("{} must be a positive number, got {}", flag, value);
    }
    Ok(value)
}
