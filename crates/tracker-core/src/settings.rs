use chrono::NaiveDate;
use clap::{CommandFactory, FromArgMatches, Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Name of the per-user application directory under `$HOME`.
pub const APP_DIR_NAME: &str = ".machine-tracker";

// ── Settings (CLI) ─────────────────────────────────────────────────────────────

/// Hourly utilization tracking for the packing line
#[derive(Parser, Debug, Clone)]
#[command(
    name = "machine-tracker",
    about = "Hourly utilization tracking for the packing line",
    version
)]
pub struct Settings {
    /// Directory holding one JSON file per recorded hour
    #[arg(long, global = true, env = "MACHINE_TRACKER_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Name saved with every record
    #[arg(long, global = true)]
    pub username: Option<String>,

    /// Minimum level of log output
    #[arg(long, global = true, default_value = "INFO", value_parser = ["DEBUG", "INFO", "WARNING", "ERROR", "CRITICAL"])]
    pub log_level: String,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Shorthand for --log-level DEBUG
    #[arg(long, global = true)]
    pub debug: bool,

    /// Print reports as JSON instead of text tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Forget the remembered username and data directory
    #[arg(long, global = true)]
    pub clear: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

/// What to do on this run.
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Save readings for one hour, replacing anything already recorded
    Record {
        /// Date of the readings (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Hour of the readings, 0-23 (defaults to the current hour)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=23))]
        hour: Option<u8>,
        /// One machine reading as MACHINE:CARTON:PACKERS:CARTONS:INVENTORY,
        /// e.g. 9:A02D:3:150:wrapped
        #[arg(long = "reading", required = true)]
        readings: Vec<String>,
    },
    /// Show the record saved for one hour
    Show {
        /// Date of the record (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
        /// Hour of the record (defaults to the current hour)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=23))]
        hour: Option<u8>,
    },
    /// Daily report: machine averages, hourly utilization, inventory impact
    Day {
        /// Report date (defaults to today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Multi-day utilization trend
    Trend {
        /// First date of the range (defaults to seven days before the end)
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last date of the range (defaults to today)
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// List the dates that have recorded data
    Dates,
}

// ── LastUsedParams ─────────────────────────────────────────────────────────────

/// Persisted last-used parameters saved to `~/.machine-tracker/last_used.json`.
#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct LastUsedParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
}

impl LastUsedParams {
    /// `~/.machine-tracker/last_used.json`.
    pub fn config_path() -> PathBuf {
        Self::config_path_in(&home_dir())
    }

    /// Same file under an arbitrary home directory.
    pub fn config_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join(APP_DIR_NAME).join("last_used.json")
    }

    /// Remembered username and data directory; empty when nothing usable is
    /// stored at `path`.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable last-used params");
            Self::default()
        })
    }

    /// Write through a temporary file so a crash never leaves half a file.
    pub fn save_to(&self, path: &Path) -> Result<(), std::io::Error> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let json = serde_json::to_string_pretty(self).map_err(std::io::Error::other)?;

        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, &json)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }

    /// Forget everything remembered at `path`.
    pub fn clear_at(path: &Path) -> Result<(), std::io::Error> {
        if path.exists() {
            std::fs::remove_file(path)?;
        }
        Ok(())
    }
}

// ── Settings impl ──────────────────────────────────────────────────────────────

impl Settings {
    /// Parse the process arguments, fill the username and data directory from
    /// the previous run when not given, and remember them for the next one.
    pub fn load_with_last_used() -> Self {
        Self::load_with_last_used_impl(
            std::env::args_os().collect(),
            &LastUsedParams::config_path(),
        )
    }

    /// [`Settings::load_with_last_used`] over explicit arguments and config
    /// file.
    pub fn load_with_last_used_impl(
        args: Vec<std::ffi::OsString>,
        config_path: &Path,
    ) -> Self {
        Self::merge_last_used(Settings::command().get_matches_from(args), config_path)
    }

    fn merge_last_used(matches: clap::ArgMatches, config_path: &Path) -> Self {
        let mut settings = match Settings::from_arg_matches(&matches) {
            Ok(settings) => settings,
            Err(e) => e.exit(),
        };

        if settings.clear {
            if let Err(e) = LastUsedParams::clear_at(config_path) {
                tracing::warn!(error = %e, "could not clear last-used params");
            }
            return Self::apply_debug(settings);
        }

        let last = LastUsedParams::load_from(config_path);

        // CLI (or env) always wins over persisted values.
        if !is_arg_explicitly_set(&matches, "username") && settings.username.is_none() {
            settings.username = last.username.clone();
        }
        if !is_arg_explicitly_set(&matches, "data_dir") && settings.data_dir.is_none() {
            settings.data_dir = last.data_dir.clone();
        }

        // An environment override applies to this run only.
        let mut params = LastUsedParams::from(&settings);
        if matches.value_source("data_dir") == Some(clap::parser::ValueSource::EnvVariable) {
            params.data_dir = last.data_dir;
        }
        if let Err(e) = params.save_to(config_path) {
            tracing::warn!(error = %e, "could not persist last-used params");
        }

        Self::apply_debug(settings)
    }

    /// Directory records are stored in: `--data-dir` or
    /// `~/.machine-tracker/data`.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir
            .clone()
            .unwrap_or_else(|| home_dir().join(APP_DIR_NAME).join("data"))
    }

    /// `--debug` overrides log level.
    fn apply_debug(mut settings: Settings) -> Settings {
        if settings.debug {
            settings.log_level = "DEBUG".to_string();
        }
        settings
    }
}

// ── Conversion ─────────────────────────────────────────────────────────────────

impl From<&Settings> for LastUsedParams {
    fn from(s: &Settings) -> Self {
        LastUsedParams {
            username: s.username.clone(),
            data_dir: s.data_dir.clone(),
        }
    }
}

// ── Helpers ────────────────────────────────────────────────────────────────────

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// Whether `name` was typed on the command line rather than defaulted or
/// taken from the environment.
fn is_arg_explicitly_set(matches: &clap::ArgMatches, name: &str) -> bool {
    matches.value_source(name) == Some(clap::parser::ValueSource::CommandLine)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
