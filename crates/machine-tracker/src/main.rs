mod bootstrap;
mod context;
mod entry;
mod report;

use anyhow::{Context as _, Result};
use serde::Serialize;
use tracker_core::settings::{Command, Settings};
use tracker_data::records::RecordStore;
use tracker_data::store::FileStore;

use crate::context::RequestContext;
use crate::report::{DayReport, TrendReport};

fn main() -> Result<()> {
    let settings = Settings::load_with_last_used();

    bootstrap::ensure_directories()?;
    bootstrap::setup_logging(&settings.log_level, settings.log_file.as_deref())?;

    tracing::info!("machine-tracker v{} starting", env!("CARGO_PKG_VERSION"));

    let data_dir = settings.resolved_data_dir();
    let store = RecordStore::new(
        FileStore::open(&data_dir)
            .with_context(|| format!("opening data directory {}", data_dir.display()))?,
    );
    let ctx = RequestContext::from_settings(&settings);

    let Some(command) = settings.command.clone() else {
        if !settings.clear {
            eprintln!("Nothing to do; run with --help to see the commands.");
        }
        return Ok(());
    };

    run(command, &settings, &ctx, &store)
}

fn run(
    command: Command,
    settings: &Settings,
    ctx: &RequestContext,
    store: &RecordStore<FileStore>,
) -> Result<()> {
    match command {
        Command::Record {
            date,
            hour,
            readings,
        } => {
            let key = ctx.slot(date, hour)?;
            let inputs = entry::parse_readings(readings.as_slice())?;
            let record = entry::build_record(key, ctx.recorded_by()?, &inputs);

            store
                .save(&key, &record)
                .with_context(|| format!("saving record {key}"))?;
            tracing::info!(%key, machines = record.machines.len(), "record saved");

            emit(settings, &record, || report::render_record(&record))
        }

        Command::Show { date, hour } => {
            let key = ctx.slot(date, hour)?;
            match store.load(&key) {
                Some(record) => emit(settings, &record, || report::render_record(&record)),
                None => {
                    eprintln!("No data recorded for {key}.");
                    Ok(())
                }
            }
        }

        Command::Day { date } => {
            let date = date.unwrap_or_else(|| ctx.today());
            let records = store.load_day(date);
            let day = DayReport::build(date, &records);
            emit(settings, &day, || report::render_day(&day))
        }

        Command::Trend { start, end } => {
            let (start, end) = ctx.trend_window(start, end);
            if start > end {
                anyhow::bail!("start date {start} is after end date {end}");
            }
            let records = store.load_range(start, end);
            let trend = TrendReport::build(start, end, &records);
            emit(settings, &trend, || report::render_trend(&trend))
        }

        Command::Dates => {
            let dates = store.list_available_dates();
            emit(settings, &dates, || report::render_dates(&dates))
        }
    }
}

/// Print `value` as pretty JSON under `--json`, otherwise the text rendering.
fn emit<T: Serialize>(settings: &Settings, value: &T, text: impl FnOnce() -> String) -> Result<()> {
    if settings.json {
        println!("{}", serde_json::to_string_pretty(value)?);
    } else {
        print!("{}", text());
    }
    Ok(())
}
