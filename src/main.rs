#![cfg(not(tarpaulin_include))]

use clap::{Parser, Subcommand};
use hurina::aggregator::Granularity;
use hurina::cache::SnapshotCache;
use hurina::chart::build_chart;
use hurina::config::Config;
use hurina::downloader::to_csv;
use hurina::entry::{NewEntry, default_capture_time, local_now};
use hurina::loader::from_csv;
use hurina::locator::build_labels;
use hurina::record::Method;
use hurina::store::SheetFile;
use hurina::table::build_table;
use hurina::tracker::Tracker;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "hurina", about = "Daily urinary volume tracking")]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true, env = "HURINA_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Record a measurement
    Add {
        #[arg(long)]
        volume: u32,
        #[arg(long)]
        method: Method,
        /// Capture date, YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Capture time, HH:MM (defaults to now)
        #[arg(long)]
        time: Option<String>,
        #[arg(long, default_value = "")]
        comment: String,
    },
    /// Show the history, most recent first
    List,
    /// Show summed volumes per method
    Chart {
        #[arg(long)]
        weekly: bool,
    },
    /// Show deletion labels
    Labels,
    /// Delete the record shown as LABEL
    Delete {
        #[arg(long)]
        label: String,
        #[arg(long)]
        confirm: bool,
    },
    /// Replace the sheet with a CSV export (first line is the header)
    Import { path: PathBuf },
    /// Write the history table as CSV
    Export { path: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = Config::load(cli.config.as_deref())?;
    let store = SheetFile::open_or_create(&config.store_path, config.columns.default_header())?;
    let mut tracker = Tracker::new(
        store,
        config.columns.clone(),
        SnapshotCache::new(config.cache_ttl()),
    );

    match cli.command {
        Command::Add {
            volume,
            method,
            date,
            time,
            comment,
        } => {
            let now = local_now(config.utc_offset_hours);
            let default = default_capture_time(now, config.time_input);
            let date = date.unwrap_or_else(|| default.format("%Y-%m-%d").to_string());
            let time = time.unwrap_or_else(|| default.format("%H:%M").to_string());
            let entry = NewEntry::from_form(&date, &time, &volume.to_string(), method.as_str(), &comment)?;
            tracker.append(entry, now)?;
            println!("✅ Donnée enregistrée");
        }
        Command::List => {
            let rows = build_table(&tracker.records()?);
            if rows.is_empty() {
                println!("Aucun enregistrement à afficher.");
            }
            for row in rows {
                let flag = if row.volume_flagged { " (?)" } else { "" };
                println!(
                    "{}  {}  {:>5} mL{}  {:<8} {}",
                    row.date, row.heure, row.volume_ml, flag, row.method, row.comment
                );
            }
        }
        Command::Chart { weekly } => {
            let granularity = if weekly {
                Granularity::Weekly
            } else {
                Granularity::Daily
            };
            let chart = build_chart(&tracker.aggregate(granularity)?, granularity);
            println!("{}", chart.title);
            for (i, period) in chart.periods.iter().enumerate() {
                let parts: Vec<String> = chart
                    .series
                    .iter()
                    .map(|s| format!("{} {} mL", s.method, s.values[i]))
                    .collect();
                println!("{}  {}", period.format("%d/%m/%Y"), parts.join("  "));
            }
        }
        Command::Labels => {
            for (label, row_number) in build_labels(&tracker.records_fresh()?) {
                println!("[{}] {}", row_number, label);
            }
        }
        Command::Delete { label, confirm } => match tracker.delete(&label, confirm) {
            Ok(deleted) => println!("✅ Enregistrement supprimé (ligne {})", deleted.row_number),
            Err(hurina::Error::NotConfirmed { .. }) => {
                eprintln!("❗ Ajoutez --confirm pour supprimer cet enregistrement.");
            }
            Err(e) => return Err(e.into()),
        },
        Command::Import { path } => {
            let sheet = from_csv(&path)?;
            let count = sheet.len();
            tracker.store_mut().replace(sheet)?;
            println!(
                "Imported {} rows from {} into {}",
                count,
                path.display(),
                tracker.store().path().display()
            );
        }
        Command::Export { path } => {
            let csv = to_csv(&build_table(&tracker.records()?));
            std::fs::write(&path, csv)?;
            println!("Exported to {}", path.display());
        }
    }

    Ok(())
}
