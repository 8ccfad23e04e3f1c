mod error;
mod snapshot;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use kleplate_board::{
    ExportPayload, ExportReport, PlacementPayload, export_case, export_plate, place_keys,
};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::{CliError, ErrorCode};
use crate::snapshot::FileHost;

#[derive(Parser)]
#[command(
    name = "kleplate",
    version,
    about = "Place keyboard switches and export plates from KLE layouts"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Move SW<n> (and D<n>) components of a design snapshot to their layout positions
    Place {
        /// Design snapshot (JSON)
        #[arg(value_name = "SNAPSHOT")]
        snapshot: PathBuf,

        /// KLE raw data file
        #[arg(short, long, value_name = "FILE")]
        layout: PathBuf,

        /// Millimetres per layout unit
        #[arg(short, long, value_name = "MM", allow_negative_numbers = true)]
        pitch: f64,

        /// Diode X offset from the switch center, in mm
        #[arg(long, value_name = "MM", allow_negative_numbers = true)]
        dx: Option<f64>,

        /// Diode Y offset from the switch center, in mm (positive is down)
        #[arg(long, value_name = "MM", allow_negative_numbers = true)]
        dy: Option<f64>,

        /// Also move D<n> diodes
        #[arg(long)]
        diodes: bool,

        /// Where to write the moved snapshot (defaults to overwriting SNAPSHOT)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Export a switch plate
    Plate(ExportArgs),
    /// Export a case outline
    Case(ExportArgs),
}

#[derive(clap::Args)]
struct ExportArgs {
    /// Job file (YAML or JSON)
    #[arg(value_name = "JOB")]
    job: PathBuf,

    /// Design snapshot for the board and selection outline modes
    #[arg(short, long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Output directory
    #[arg(short, long, value_name = "DIR", default_value = "output")]
    output: PathBuf,
}

/// Export job: the request payload plus an optional layout file path.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Job {
    #[serde(flatten)]
    payload: ExportPayload,
    #[serde(default)]
    layout_file: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() {
                ErrorCode::Usage as i32
            } else {
                0
            };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    if let Err(err) = run(cli) {
        eprintln!("error: {err}");
        std::process::exit(err.code as i32);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::Place {
            snapshot,
            layout,
            pitch,
            dx,
            dy,
            diodes,
            output,
        } => {
            let mut host = FileHost::load(&snapshot).map_err(input)?;
            let layout = read_text(&layout).map_err(input)?;
            let payload = PlacementPayload {
                layout,
                pitch: Some(pitch),
                dx,
                dy,
                do_diode: Some(diodes),
            };
            let report = place_keys(&mut host, &payload)?;
            let written = host.save(output.as_deref()).map_err(processing)?;
            println!(
                "placed {} switches and {} diodes ({} switches, {} diodes not found) -> {}",
                report.switches_placed,
                report.diodes_placed,
                report.switches_missing,
                report.diodes_missing,
                written.display()
            );
            Ok(())
        }
        Command::Plate(args) => run_export(&args, export_plate),
        Command::Case(args) => run_export(&args, export_case),
    }
}

fn run_export(
    args: &ExportArgs,
    export: fn(&FileHost, &ExportPayload) -> Result<ExportReport, kleplate_board::Error>,
) -> Result<(), CliError> {
    let payload = load_job(&args.job).map_err(input)?;
    let host = match &args.snapshot {
        Some(path) => FileHost::load(path).map_err(input)?,
        None => FileHost::default(),
    };

    let report = export(&host, &payload)?;
    for w in &report.warnings {
        warn!("{w}");
    }

    std::fs::create_dir_all(&args.output)
        .with_context(|| format!("failed to create output directory {}", args.output.display()))
        .map_err(processing)?;
    let path = args.output.join(&report.file.filename);
    std::fs::write(&path, &report.file.text)
        .with_context(|| format!("failed to write {}", path.display()))
        .map_err(processing)?;
    info!(keys = report.key_count, outline = %report.outline_source, "wrote {}", path.display());
    println!("{}", path.display());
    Ok(())
}

fn load_job(path: &Path) -> Result<ExportPayload> {
    let text = read_text(path)?;
    let job: Job = serde_yaml::from_str(&text)
        .with_context(|| format!("invalid job file {}", path.display()))?;
    let mut payload = job.payload;

    if let Some(layout_file) = job.layout_file {
        let resolved = match path.parent() {
            Some(dir) if layout_file.is_relative() => dir.join(&layout_file),
            _ => layout_file.clone(),
        };
        payload.layout = read_text(&resolved)?;
        if payload.base_name.is_none() {
            payload.base_name = layout_file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned());
        }
    }
    if payload.layout.trim().is_empty() {
        anyhow::bail!("job {} has neither `layout` nor `layoutFile`", path.display());
    }
    Ok(payload)
}

fn read_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn input(err: anyhow::Error) -> CliError {
    CliError::input(format!("{err:#}"))
}

fn processing(err: anyhow::Error) -> CliError {
    CliError::processing(format!("{err:#}"))
}
