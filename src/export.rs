// src/export.rs
// CSV export of frame variables and channel signals

use std::collections::HashMap;
use std::path::Path;

use csv::Writer;
use log::debug;

use crate::cfs::CfsFile;
use crate::error::{CfsError, Result};

fn column_name<'a>(name: &'a str, rename: &'a HashMap<String, String>) -> &'a str {
    rename.get(name).map_or(name, String::as_str)
}

/// Write one row per frame with the requested frame variables.
///
/// Columns are `frame` (1-based) followed by each variable, renamed through
/// `rename` where an entry exists.
pub fn write_frame_vars<P: AsRef<Path>>(
    cfs: &CfsFile,
    output_file: P,
    vars: &[&str],
    rename: &HashMap<String, String>,
) -> Result<()> {
    let mut writer = Writer::from_path(output_file)?;

    let mut header = vec!["frame"];
    header.extend(vars.iter().map(|v| column_name(v, rename)));
    writer.write_record(&header)?;

    for (index, frame) in cfs.frames().iter().enumerate() {
        let mut row = vec![(index + 1).to_string()];
        for &var in vars {
            let value = frame
                .var(var)
                .ok_or_else(|| CfsError::UnknownVariable(var.to_string()))?;
            row.push(value.to_string());
        }
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write the signals of the requested channels, one row per sample.
///
/// Columns are `frame` (1-based), `time` (seconds from frame start) and one
/// column per channel. All channels must share a sampling interval and sample
/// count within each frame.
pub fn write_signals<P: AsRef<Path>>(
    cfs: &CfsFile,
    output_file: P,
    channels: &[&str],
    rename: &HashMap<String, String>,
) -> Result<()> {
    let mut writer = Writer::from_path(output_file)?;

    let mut header = vec!["frame", "time"];
    header.extend(channels.iter().map(|c| column_name(c, rename)));
    writer.write_record(&header)?;

    for (index, frame) in cfs.frames().iter().enumerate() {
        let dt = frame.common_sample_interval(channels)?;
        let columns: Vec<&[f64]> = channels
            .iter()
            .map(|&c| frame.data(c).unwrap_or(&[]))
            .collect();
        let samples = columns.first().map_or(0, |c| c.len());
        debug!("Frame {}: writing {} samples", index + 1, samples);

        for i in 0..samples {
            let mut row = Vec::with_capacity(channels.len() + 2);
            row.push((index + 1).to_string());
            row.push((i as f64 * dt).to_string());
            row.extend(columns.iter().map(|c| c[i].to_string()));
            writer.write_record(&row)?;
        }
    }

    writer.flush()?;
    Ok(())
}
