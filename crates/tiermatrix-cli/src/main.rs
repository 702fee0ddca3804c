//! tiermatrix CLI - price matrix extraction tool

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tiermatrix::prelude::*;
use tiermatrix::series_name;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "tiermatrix")]
#[command(
    author,
    version,
    about = "Extract price matrices and their color tiers from spreadsheets"
)]
struct Cli {
    /// Log per-matrix decisions (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract the price and type tables to CSV
    Extract {
        /// Input workbook (xlsx)
        input: PathBuf,

        /// Originally uploaded filename, used for the series label
        #[arg(long)]
        name: Option<String>,

        /// Directory for Price.csv and Type.csv
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the matrices found on each sheet and the color columns
    Inventory {
        /// Input workbook (xlsx)
        input: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// List all sheets in a workbook
    Sheets {
        /// Input workbook (xlsx)
        input: PathBuf,
    },

    /// Print the series label derived from a filename
    Series {
        filename: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ProtocolArg {
    /// Variants numbered 2, 3, ... in the first column
    Numbered,
    /// Variants labelled by thickness (5 mm, 6 mm, ...)
    Thickness,
}

#[derive(Args)]
struct ConfigArgs {
    /// JSON configuration file; flags below override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Variant labelling convention
    #[arg(long, value_enum)]
    protocol: Option<ProtocolArg>,

    /// Thickness of the primary matrix [thickness protocol, default: 5]
    #[arg(long)]
    thickness_primary: Option<u32>,

    /// Thicknesses of the variant matrices [thickness protocol, default: 6,8]
    #[arg(long, value_delimiter = ',')]
    thickness_variants: Option<Vec<u32>>,

    /// Wall-clock budget in seconds, checked between sheets
    #[arg(long)]
    time_budget: Option<f64>,

    /// Maximum number of sheets to process
    #[arg(long)]
    max_sheets: Option<usize>,
}

impl ConfigArgs {
    fn load(&self) -> Result<ProcessorConfig> {
        let config = match &self.config {
            Some(path) => ProcessorConfig::from_json_file(path)
                .with_context(|| format!("Failed to load config '{}'", path.display()))?,
            None => ProcessorConfig::default(),
        };
        let config = self.apply(config)?;
        tracing::debug!(?config, "configuration loaded");
        Ok(config)
    }

    /// Layer the flags over a base configuration
    ///
    /// Protocol settings from the base survive unless a flag replaces them.
    fn apply(&self, mut config: ProcessorConfig) -> Result<ProcessorConfig> {
        let thickness_flags =
            self.thickness_primary.is_some() || self.thickness_variants.is_some();
        let is_thickness = matches!(config.protocol, VariantProtocol::Thickness { .. });

        match self.protocol {
            Some(ProtocolArg::Numbered) => {
                if thickness_flags {
                    bail!("--thickness-primary and --thickness-variants need the thickness protocol");
                }
                if is_thickness {
                    config.protocol = VariantProtocol::default();
                }
            }
            Some(ProtocolArg::Thickness) => {
                if !is_thickness {
                    config.protocol = VariantProtocol::thickness_default();
                }
            }
            None => {
                if thickness_flags && !is_thickness {
                    bail!("--thickness-primary and --thickness-variants need --protocol thickness");
                }
            }
        }

        if let VariantProtocol::Thickness { primary, variants } = &mut config.protocol {
            if let Some(p) = self.thickness_primary {
                *primary = p;
            }
            if let Some(v) = &self.thickness_variants {
                *variants = v.clone();
            }
        }

        if self.time_budget.is_some() {
            config.time_budget = self.time_budget;
        }
        if self.max_sheets.is_some() {
            config.max_sheets = self.max_sheets;
        }

        config.validate().context("Invalid configuration")?;
        Ok(config)
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Extract {
            input,
            name,
            out_dir,
            config,
            json,
        } => extract(&input, name.as_deref(), &out_dir, &config, json),
        Commands::Inventory { input, config } => show_inventory(&input, &config),
        Commands::Sheets { input } => list_sheets(&input),
        Commands::Series { filename } => {
            println!("{}", series_name(&filename));
            Ok(ExitCode::SUCCESS)
        }
    }
}

/// Logs go to stderr so stdout stays machine-readable
fn init_logging(verbose: bool) {
    let default = if verbose {
        LevelFilter::DEBUG
    } else {
        LevelFilter::INFO
    };
    let filter = EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn extract(
    input: &Path,
    name: Option<&str>,
    out_dir: &Path,
    args: &ConfigArgs,
    json: bool,
) -> Result<ExitCode> {
    let config = args.load()?;
    let processor = Processor::open(input, name, config)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    let extraction = processor.run();

    let (price_path, type_path) = write_tables(out_dir, &extraction)
        .with_context(|| format!("Failed to write tables to '{}'", out_dir.display()))?;

    if json {
        let summary = serde_json::json!({
            "series": extraction.series,
            "color_columns": extraction.color_columns,
            "processed_sheets": extraction.processed_sheets,
            "total_records": extraction.total_records,
            "type_records": extraction.type_records.len(),
            "skipped": extraction.skipped,
            "warnings": extraction.warnings,
            "status": extraction.status,
            "elapsed_secs": extraction.elapsed.as_secs_f64(),
            "price_file": price_path,
            "type_file": type_path,
        });
        let text = serde_json::to_string_pretty(&summary).context("Failed to encode summary")?;
        println!("{}", text);
    } else {
        println!("Series: {}", extraction.series);
        println!("Processed sheets: {}", extraction.processed_sheets);
        println!("Price records: {}", extraction.total_records);
        println!("Type records: {}", extraction.type_records.len());
        println!("Color columns: {}", extraction.color_columns.join(", "));
        for entry in &extraction.skipped {
            println!("Skipped {}: {}", entry.sheet, entry.reason);
        }
        for warning in &extraction.warnings {
            println!("Warning: {}", warning);
        }
        println!("Wrote '{}' and '{}'", price_path.display(), type_path.display());
    }

    match extraction.status {
        RunStatus::Complete => Ok(ExitCode::SUCCESS),
        RunStatus::TimedOut { unprocessed } => {
            eprintln!(
                "Timed out: {} sheet(s) not processed, partial output written",
                unprocessed
            );
            Ok(ExitCode::from(2))
        }
    }
}

fn show_inventory(input: &Path, args: &ConfigArgs) -> Result<ExitCode> {
    let config = args.load()?;
    let processor = Processor::open(input, None, config)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;
    let inventory = processor.inventory();
    let protocol = &processor.config().protocol;

    println!("File: {}", input.display());
    println!("Series: {}", processor.series());
    println!("Color columns: {}", inventory.column_names().join(", "));

    for sheet in &inventory.sheets {
        println!();
        println!("  Sheet {}: \"{}\"", sheet.index, sheet.sheet);
        match &sheet.primary {
            Some(anchor) => {
                let ids: Vec<String> = sheet
                    .matrix_ids(protocol)
                    .iter()
                    .map(|id| protocol.label(*id))
                    .collect();
                println!("    Primary anchor: {}", anchor.address());
                println!("    Matrices: {}", ids.join(", "));
            }
            None => println!("    No main matrix"),
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn list_sheets(input: &Path) -> Result<ExitCode> {
    let workbook = XlsxReader::read_file(input)
        .with_context(|| format!("Failed to open '{}'", input.display()))?;

    for (i, name) in workbook.sheet_names().iter().enumerate() {
        println!("{}\t{}", i, name);
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(argv: &[&str]) -> ConfigArgs {
        let mut full = vec!["tiermatrix", "inventory", "in.xlsx"];
        full.extend_from_slice(argv);
        match Cli::try_parse_from(full).unwrap().command {
            Commands::Inventory { config, .. } => config,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_numbered_flag_keeps_file_settings() {
        let base = ProcessorConfig {
            protocol: VariantProtocol::Numbered { max_variants: 4 },
            ..ProcessorConfig::default()
        };
        let config = args(&["--protocol", "numbered"]).apply(base).unwrap();
        assert_eq!(config.protocol, VariantProtocol::Numbered { max_variants: 4 });
    }

    #[test]
    fn test_thickness_flags_merge_over_file() {
        let base = ProcessorConfig {
            protocol: VariantProtocol::Thickness {
                primary: 4,
                variants: vec![6],
            },
            ..ProcessorConfig::default()
        };
        let config = args(&["--thickness-variants", "6,8,10"]).apply(base).unwrap();
        assert_eq!(
            config.protocol,
            VariantProtocol::Thickness {
                primary: 4,
                variants: vec![6, 8, 10],
            }
        );

        let config = args(&["--protocol", "thickness", "--thickness-primary", "4"])
            .apply(ProcessorConfig::default())
            .unwrap();
        assert_eq!(
            config.protocol,
            VariantProtocol::Thickness {
                primary: 4,
                variants: vec![6, 8],
            }
        );
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        assert!(args(&["--thickness-primary", "4"])
            .apply(ProcessorConfig::default())
            .is_err());
        assert!(args(&["--protocol", "numbered", "--thickness-variants", "6"])
            .apply(ProcessorConfig::default())
            .is_err());
        assert!(args(&["--time-budget", "1e30"])
            .apply(ProcessorConfig::default())
            .is_err());
    }
}
