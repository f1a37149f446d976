//! StatLab CLI — compose selected series from a directory of JSON files.
//!
//! Commands:
//! - `show` — select identifiers, fetch them, and print the merged timeline
//!   as a table, CSV or chart-series JSON
//! - `list` — list the identifiers available in a data directory

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::rc::Rc;
use statlab_core::data::JsonDirSource;
use statlab_core::{CompositorConfig, ExpansionPolicy, SeriesSession, TimeRangeSpec};

#[derive(Parser)]
#[command(
    name = "statlab",
    about = "StatLab CLI — merge economic time series onto one timeline"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Select series and print their merged timeline.
    Show {
        /// Identifiers to select, in order.
        #[arg(required = true)]
        ids: Vec<String>,

        /// Directory holding one `<ID>.json` file per series.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,

        /// Path to a TOML config file.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Time range: `all` or `last:<years>`. Overrides the config.
        #[arg(long)]
        range: Option<TimeRangeSpec>,

        /// Break every series out by dimension.
        #[arg(long, default_value_t = false)]
        expand: bool,

        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },
    /// List identifiers available in a data directory.
    List {
        /// Directory holding one `<ID>.json` file per series.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Show {
            ids,
            data_dir,
            config,
            range,
            expand,
            format,
        } => run_show(ids, &data_dir, config.as_deref(), range, expand, format),
        Commands::List { data_dir } => run_list(&data_dir),
    }
}

fn load_config(path: Option<&Path>) -> Result<CompositorConfig> {
    match path {
        Some(path) => CompositorConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display())),
        None => Ok(CompositorConfig::default()),
    }
}

fn run_show(
    ids: Vec<String>,
    data_dir: &Path,
    config_path: Option<&Path>,
    range: Option<TimeRangeSpec>,
    expand: bool,
    format: OutputFormat,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    if let Some(range) = range {
        config.default_range = range;
    }
    if expand {
        config.expansion = ExpansionPolicy::Always;
    }
    log::debug!("config: {config:?}");

    let source = Rc::new(JsonDirSource::new(data_dir));
    let mut session = SeriesSession::new(source, &config);

    for id in ids {
        if let Err(err) = session.toggle(id.as_str()) {
            eprintln!("Skipped {id}: {err}");
        }
    }

    futures::executor::block_on(session.settle());

    for entry in session.selection_snapshot() {
        let name = entry.display_name.as_deref().unwrap_or("");
        eprintln!(
            "[{}] {:<20} {:<30} {}",
            entry.index, entry.identifier, name, entry.state
        );
    }
    eprintln!();

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Table => {
            let table = session.table();
            if table.rows.is_empty() {
                eprintln!("No data for the selected series in range {}", session.range());
            } else {
                write!(out, "{table}")?;
            }
        }
        OutputFormat::Csv => {
            session
                .table()
                .write_csv(&mut out)
                .context("writing CSV")?;
        }
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, &session.chart_series())
                .context("writing JSON")?;
            writeln!(out)?;
        }
    }

    Ok(())
}

fn run_list(data_dir: &Path) -> Result<()> {
    let source = JsonDirSource::new(data_dir);
    let ids = source
        .identifiers()
        .with_context(|| format!("listing {}", data_dir.display()))?;

    if ids.is_empty() {
        println!("No series in {}", data_dir.display());
        return Ok(());
    }
    for id in ids {
        println!("{id}");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn show_parses_range_and_format() {
        let cli = Cli::try_parse_from([
            "statlab", "show", "--range", "last:5", "--format", "csv", "A", "B",
        ])
        .unwrap();
        match cli.command {
            Commands::Show {
                ids, range, format, expand, ..
            } => {
                assert_eq!(ids, vec!["A", "B"]);
                assert_eq!(range, Some(TimeRangeSpec::LastYears(5)));
                assert_eq!(format, OutputFormat::Csv);
                assert!(!expand);
            }
            Commands::List { .. } => panic!("expected show"),
        }
    }

    #[test]
    fn show_rejects_bad_range() {
        let parsed = Cli::try_parse_from(["statlab", "show", "--range", "forever", "A"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn show_requires_an_identifier() {
        assert!(Cli::try_parse_from(["statlab", "show"]).is_err());
    }

    #[test]
    fn missing_config_is_an_error() {
        assert!(load_config(Some(Path::new("/definitely/not/here.toml"))).is_err());
        assert_eq!(load_config(None).unwrap(), CompositorConfig::default());
    }
}
