//! Validate remote code files and export them as ESPHome YAML or JSON.
//!
//! Usage:
//!   irhub check [--human] FILE.json ...
//!   irhub export FILE.json --device NAME --manufacturer NAME [--model M] [--device-type T]
//!                [--format esphome|esphome-subdevice|json] [--out-dir DIR] [--config export.toml]
//!
//! A codes file is a JSON array of `{ "name": ..., "protocol": ..., "params": {...} }`.
//! A blank name or invalid parameters make a code invalid. `check` exits with code 1 if
//! any code is invalid; `export` refuses to write a document unless every code is valid.
//!
//! Log verbosity follows `RUST_LOG` (default `irprotokit=info`).

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use irprotokit::{
    export_file_name, DeviceMeta, ExportConfig, ExportFormat, Exporter, ParamMap, RemoteCode, ValidationError, Value,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(name = "irhub")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Emit logs as JSON.
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Validate every code in the given files.
    Check {
        #[arg(required = true)]
        files: Vec<PathBuf>,
        /// Human-readable output.
        #[arg(short = 'H', long)]
        human: bool,
    },
    /// Build an export document from one codes file.
    Export {
        file: PathBuf,
        #[arg(long)]
        device: String,
        #[arg(long)]
        manufacturer: String,
        #[arg(long)]
        model: Option<String>,
        #[arg(long, default_value = "")]
        device_type: String,
        #[arg(short, long, default_value = "esphome")]
        format: ExportFormat,
        /// Write into this directory using the derived filename; stdout otherwise.
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
        /// TOML file overriding export settings.
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[derive(Debug, Deserialize)]
struct CodeEntry {
    name: String,
    protocol: String,
    #[serde(default, alias = "parameters")]
    params: serde_json::Map<String, serde_json::Value>,
}

#[derive(Clone, Copy)]
enum OutputStyle {
    Compact,
    Human,
}

fn init_logging(json: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("irprotokit=info,irhub=info"));
    if json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .compact()
            .init();
    }
}

fn read_codes(path: &Path) -> anyhow::Result<Vec<CodeEntry>> {
    let src = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&src).with_context(|| format!("parsing {}", path.display()))
}

fn to_remote_code(entry: &CodeEntry) -> Result<RemoteCode, ValidationError> {
    let params: ParamMap = entry
        .params
        .iter()
        .map(|(k, v)| (k.clone(), Value::from(v.clone())))
        .collect();
    RemoteCode::validated(&entry.name, &entry.protocol, &params)
}

fn print_error(path: &str, index: usize, entry: &CodeEntry, err: &ValidationError, style: OutputStyle) {
    let lines: Vec<String> = match err.field_errors() {
        Some(errors) => errors.iter().map(|e| format!("{}: {}", e.field, e.kind)).collect(),
        None => vec![err.to_string()],
    };
    for line in lines {
        match style {
            OutputStyle::Compact => {
                println!("{}:{}: error: {} [{} / {}]", path, index + 1, line, entry.name, entry.protocol);
            }
            OutputStyle::Human => {
                println!("  {} #{} \"{}\": {}", path, index + 1, entry.name, line);
                println!("    protocol: {}", entry.protocol);
            }
        }
    }
}

fn check(files: &[PathBuf], style: OutputStyle) -> anyhow::Result<bool> {
    let mut has_error = false;
    let mut total = 0usize;
    let mut invalid = 0usize;
    for path in files {
        let entries = match read_codes(path) {
            Ok(e) => e,
            Err(e) => {
                eprintln!("{}: {:#}", path.display(), e);
                has_error = true;
                continue;
            }
        };
        let display_path = path.display().to_string();
        for (i, entry) in entries.iter().enumerate() {
            total += 1;
            if let Err(err) = to_remote_code(entry) {
                print_error(&display_path, i, entry, &err, style);
                invalid += 1;
                has_error = true;
            }
        }
    }
    tracing::info!(total, invalid, "check finished");
    if invalid > 0 {
        eprintln!("check: {} of {} code(s) invalid", invalid, total);
    }
    Ok(has_error)
}

fn export(
    file: &Path,
    device: DeviceMeta,
    format: ExportFormat,
    out_dir: Option<&Path>,
    config: Option<&Path>,
) -> anyhow::Result<()> {
    let config = match config {
        Some(p) => ExportConfig::load(p).with_context(|| format!("loading {}", p.display()))?,
        None => ExportConfig::default(),
    };
    let entries = read_codes(file)?;
    let mut codes = Vec::with_capacity(entries.len());
    let mut failures = 0usize;
    for (i, entry) in entries.iter().enumerate() {
        match to_remote_code(entry) {
            Ok(code) => codes.push(code),
            Err(err) => {
                print_error(&file.display().to_string(), i, entry, &err, OutputStyle::Compact);
                failures += 1;
            }
        }
    }
    if failures > 0 {
        bail!("{} code(s) failed validation; nothing exported", failures);
    }

    let now = chrono::Utc::now();
    let doc = Exporter::new(config).build_at(&device, &codes, format, now)?;
    match out_dir {
        Some(dir) => {
            let path = dir.join(export_file_name(&device.name, format, now.date_naive()));
            std::fs::write(&path, &doc).with_context(|| format!("writing {}", path.display()))?;
            tracing::info!(path = %path.display(), codes = codes.len(), "export written");
        }
        None => print!("{}", doc),
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_logging(args.json_logs);

    match args.command {
        Command::Check { files, human } => {
            let style = if human { OutputStyle::Human } else { OutputStyle::Compact };
            if check(&files, style)? {
                std::process::exit(1);
            }
        }
        Command::Export {
            file,
            device,
            manufacturer,
            model,
            device_type,
            format,
            out_dir,
            config,
        } => {
            let meta = DeviceMeta {
                name: device,
                manufacturer,
                model,
                device_type,
            };
            export(&file, meta, format, out_dir.as_deref(), config.as_deref())?;
        }
    }
    Ok(())
}
