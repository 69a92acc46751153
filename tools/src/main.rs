use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use bytecodec::Endian;
use clap::{Parser, Subcommand, ValueEnum};
use delta::DeltaRecord;
use demo_schema::CreatureStatus;
use glob::Pattern;
use snapsync_tools::{
    format_report_pretty, format_schema_pretty, inspect_packet, schema_report, InspectReport,
};

#[derive(Parser)]
#[command(
    name = "snapsync-tools",
    version,
    about = "snapsync packet inspection tools"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Inspect captured packets against the creature schema.
    Inspect {
        /// Path to a packet file or a directory of captures.
        packet_path: PathBuf,
        /// Byte order the packets were written with.
        #[arg(long, value_enum, default_value_t = EndianArg::Little)]
        endian: EndianArg,
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
        /// Optional glob filter when inspecting a directory.
        #[arg(long)]
        glob: Option<String>,
        /// Sort inspected packets.
        #[arg(long, value_enum)]
        sort: Option<InspectSort>,
        /// Limit the number of inspected packets (after sorting).
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Print the creature schema and its fingerprint.
    Schema {
        /// Output format.
        #[arg(long, value_enum, default_value_t = OutputFormat::Pretty)]
        format: OutputFormat,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EndianArg {
    Little,
    Big,
}

impl From<EndianArg> for Endian {
    fn from(arg: EndianArg) -> Self {
        match arg {
            EndianArg::Little => Self::Little,
            EndianArg::Big => Self::Big,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Json,
    Pretty,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum InspectSort {
    Size,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Inspect {
            packet_path,
            endian,
            format,
            glob,
            sort,
            limit,
        } => {
            let endian = Endian::from(endian);
            if packet_path.is_dir() {
                let entries = collect_packet_entries(&packet_path, glob.as_deref())?;
                let mut entries = maybe_sort_entries(entries, sort);
                let limit = limit.or(sort.map(|InspectSort::Size| 10));
                if let Some(limit) = limit {
                    entries.truncate(limit);
                }
                for entry in entries {
                    let report = inspect_file(&entry.path, endian)?;
                    if matches!(format, OutputFormat::Pretty) {
                        println!("== {} ({} bytes) ==", entry.path.display(), entry.size);
                    }
                    print_report(&report, format)?;
                }
            } else {
                let report = inspect_file(&packet_path, endian)?;
                print_report(&report, format)?;
            }
        }
        Command::Schema { format } => {
            let report = schema_report(&CreatureStatus::SCHEMA);
            match format {
                OutputFormat::Json => {
                    let json = serde_json::to_string_pretty(&report).context("serialize json")?;
                    println!("{json}");
                }
                OutputFormat::Pretty => print!("{}", format_schema_pretty(&report)),
            }
        }
    }
    Ok(())
}

fn inspect_file(path: &Path, endian: Endian) -> Result<InspectReport> {
    let bytes = fs::read(path).with_context(|| format!("read packet {}", path.display()))?;
    inspect_packet(&bytes, &CreatureStatus::SCHEMA, endian)
        .with_context(|| format!("decode packet {}", path.display()))
}

fn print_report(report: &InspectReport, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("serialize json")?;
            println!("{json}");
        }
        OutputFormat::Pretty => print!("{}", format_report_pretty(report)),
    }
    Ok(())
}

struct PacketEntry {
    path: PathBuf,
    size: u64,
}

fn collect_packet_entries(dir: &Path, glob: Option<&str>) -> Result<Vec<PacketEntry>> {
    let mut entries = Vec::new();
    let pattern = match glob {
        Some(value) => Some(Pattern::new(value).context("invalid glob pattern")?),
        None => None,
    };

    for entry in fs::read_dir(dir).with_context(|| format!("read dir {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() || path.extension().map_or(true, |ext| ext != "bin") {
            continue;
        }
        if let Some(pattern) = &pattern {
            let matches_path = pattern.matches_path(&path);
            let matches_name = path
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| pattern.matches(name));
            if !matches_path && !matches_name {
                continue;
            }
        }
        let size = entry.metadata()?.len();
        entries.push(PacketEntry { path, size });
    }
    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn maybe_sort_entries(
    mut entries: Vec<PacketEntry>,
    sort: Option<InspectSort>,
) -> Vec<PacketEntry> {
    match sort {
        Some(InspectSort::Size) => {
            entries.sort_by(|a, b| b.size.cmp(&a.size).then_with(|| a.path.cmp(&b.path)));
        }
        None => {}
    }
    entries
}
