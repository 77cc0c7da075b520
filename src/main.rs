// src/main.rs
// Command-line application for CFS Reader

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};

use cfs_reader::{export, CfsFile, DecodeOptions};

/// Inspect and convert CED CFS recording files
#[derive(Parser)]
#[command(name = "cfs_reader")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Keep Signal's internal variables instead of filtering them out
    #[arg(long, global = true)]
    no_filter: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display CFS file information
    Info {
        /// Path to the CFS file
        file: PathBuf,
    },

    /// List file variables and frame variables
    Vars {
        /// Path to the CFS file
        file: PathBuf,
    },

    /// Export frame variables to CSV, one row per frame
    ExportVars {
        /// Path to the CFS file
        file: PathBuf,

        /// Output CSV file
        output: PathBuf,

        /// Frame variables to export
        #[arg(short, long, num_args = 1.., required = true)]
        vars: Vec<String>,

        /// Rename a column (old=new)
        #[arg(short, long, value_parser = parse_rename)]
        rename: Vec<(String, String)>,
    },

    /// Export channel signals to CSV, one row per sample
    ExportSignals {
        /// Path to the CFS file
        file: PathBuf,

        /// Output CSV file
        output: PathBuf,

        /// Channels to export
        #[arg(short, long, num_args = 1.., required = true)]
        channels: Vec<String>,

        /// Rename a column (old=new)
        #[arg(short, long, value_parser = parse_rename)]
        rename: Vec<(String, String)>,
    },

    /// Print a single channel of one frame to stdout
    Extract {
        /// Path to the CFS file
        file: PathBuf,

        /// Frame number (0-based)
        frame: usize,

        /// Channel name
        channel: String,
    },
}

fn parse_rename(s: &str) -> std::result::Result<(String, String), String> {
    s.split_once('=')
        .map(|(old, new)| (old.to_string(), new.to_string()))
        .ok_or_else(|| format!("expected old=new, got '{}'", s))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let options = DecodeOptions::new().filter_vars(!cli.no_filter);

    match cli.command {
        Commands::Info { file } => {
            let cfs = load(&file, &options)?;
            print_file_info(&cfs, &file);
        }
        Commands::Vars { file } => {
            let cfs = load(&file, &options)?;
            print_vars(&cfs);
        }
        Commands::ExportVars {
            file,
            output,
            vars,
            rename,
        } => {
            let cfs = load(&file, &options)?;
            let names: Vec<&str> = vars.iter().map(String::as_str).collect();
            let rename: HashMap<String, String> = rename.into_iter().collect();
            export::write_frame_vars(&cfs, &output, &names, &rename)
                .with_context(|| format!("Failed to write '{}'", output.display()))?;
            println!(
                "Exported {} variables for {} frames to {}",
                names.len(),
                cfs.n_frames(),
                output.display()
            );
        }
        Commands::ExportSignals {
            file,
            output,
            channels,
            rename,
        } => {
            let cfs = load(&file, &options)?;
            let names: Vec<&str> = channels.iter().map(String::as_str).collect();
            let rename: HashMap<String, String> = rename.into_iter().collect();
            export::write_signals(&cfs, &output, &names, &rename)
                .with_context(|| format!("Failed to write '{}'", output.display()))?;
            println!(
                "Exported {} channels for {} frames to {}",
                names.len(),
                cfs.n_frames(),
                output.display()
            );
        }
        Commands::Extract {
            file,
            frame,
            channel,
        } => {
            let cfs = load(&file, &options)?;
            extract(&cfs, &file, frame, &channel)?;
        }
    }

    Ok(())
}

fn load(file: &Path, options: &DecodeOptions) -> Result<CfsFile> {
    CfsFile::open_with(file, options)
        .with_context(|| format!("Error loading CFS file '{}'", file.display()))
}

fn extract(cfs: &CfsFile, file: &Path, index: usize, channel: &str) -> Result<()> {
    let Some(frame) = cfs.frame(index) else {
        bail!("Frame {} not found (file has {} frames)", index, cfs.n_frames());
    };
    let Some(info) = frame.channel(channel) else {
        bail!("Channel '{}' not found", channel);
    };

    let units = cfs
        .channels()
        .into_iter()
        .find(|c| c.name == channel)
        .map(|c| (c.x_units, c.y_units))
        .unwrap_or_default();

    println!("# Frame {} channel '{}' from {}", index, channel, file.display());
    println!("# Time ({}), Value ({})", units.0, units.1);
    match &info.data {
        Some(samples) => {
            for (i, value) in samples.iter().enumerate() {
                let t = info.info.x_offset as f64 + i as f64 * info.sample_interval;
                println!("{:.9e}, {:.6e}", t, value);
            }
        }
        None => println!("# No data recorded in this frame"),
    }
    Ok(())
}

fn print_file_info(cfs: &CfsFile, file: &Path) {
    let info = cfs.info();

    println!("CFS File Information");
    println!("====================");
    println!();
    println!("File: {}", file.display());
    println!("Internal name: {}", info.filename());
    println!("Version: {}", info.version());
    println!("Size: {} bytes", info.size());
    match info.created() {
        Ok(created) => println!("Created: {}", created),
        Err(e) => println!("Created: unknown ({})", e),
    }
    println!("Creator: {}", info.creator().unwrap_or("unknown"));
    if !info.comment().is_empty() {
        println!("Comment: {}", info.comment());
    }
    println!();

    println!("Contents:");
    println!("  Channels: {}", cfs.n_channels());
    println!("  Frames: {}", cfs.n_frames());
    println!("  File variables: {}", cfs.n_filevars());
    println!("  Frame variables: {}", cfs.n_framevars());
    println!();

    println!("Channels:");
    for ch in cfs.channels() {
        println!("  {} (y: {}, x: {})", ch.name, ch.y_units, ch.x_units);
    }
    println!();

    // Show statistics for the first few frames
    println!("Frame Statistics (first {} frames):", cfs.n_frames().min(3));
    for (i, frame) in cfs.frames().iter().take(3).enumerate() {
        println!("  Frame {}:", i);
        for ch in frame.channels() {
            match &ch.data {
                Some(data) if !data.is_empty() => {
                    let min = data.iter().fold(f64::INFINITY, |a, &b| a.min(b));
                    let max = data.iter().fold(f64::NEG_INFINITY, |a, &b| a.max(b));
                    let avg = data.iter().sum::<f64>() / data.len() as f64;
                    println!(
                        "    {}: {} samples @ {} s, min={:.3}, max={:.3}, avg={:.3}",
                        ch.name,
                        data.len(),
                        ch.sample_interval,
                        min,
                        max,
                        avg
                    );
                }
                _ => println!("    {}: no data", ch.name),
            }
        }
    }
}

fn print_vars(cfs: &CfsFile) {
    println!("File variables:");
    for (name, var) in cfs.file_vars() {
        println!("  {} = {} {}", name, var.value, var.units);
    }
    println!();

    println!("Frame variables:");
    for (name, units) in cfs.frame_vars() {
        println!("  {} ({})", name, units);
    }
    if let Some(frame) = cfs.frame(0) {
        println!();
        println!("Frame 0 values:");
        for (name, value) in frame.vars() {
            println!("  {} = {}", name, value);
        }
    }
}
