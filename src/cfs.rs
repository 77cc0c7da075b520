// src/cfs.rs
// Document Assembler: decodes a whole CFS file into a read-only document

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use log::info;
use regex::Regex;

use crate::error::{CfsError, Result};
use crate::frame::{read_data_section, Frame};
use crate::header::{read_header, read_pointer_table, ChannelDescriptor};
use crate::info::{format_creator, CfsInfo};
use crate::source::ByteSource;
use crate::variable::{resolve, Variable};

/// Rarely used internal variables written by CED Signal.
pub const SIGNAL_JUNK_PATTERNS: &[&str] = &[
    r"User\d+", "RTot", "SysD", "RAcc", "CMemb", "RMemb", "FCom", "SysF", "ClF",
];

/// Options controlling how a file is decoded.
#[derive(Debug, Clone)]
pub struct DecodeOptions {
    /// Drop variables whose name starts with one of `junk_patterns`
    pub filter_vars: bool,
    /// Regular expressions matched against the start of each variable name
    pub junk_patterns: Vec<String>,
}

impl Default for DecodeOptions {
    fn default() -> Self {
        DecodeOptions {
            filter_vars: true,
            junk_patterns: SIGNAL_JUNK_PATTERNS.iter().map(|p| p.to_string()).collect(),
        }
    }
}

impl DecodeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn filter_vars(mut self, enabled: bool) -> Self {
        self.filter_vars = enabled;
        self
    }

    pub fn junk_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.junk_patterns = patterns.into_iter().map(Into::into).collect();
        self
    }

    /// Single anchored matcher for all patterns, or `None` when nothing is filtered.
    fn junk_matcher(&self) -> Result<Option<Regex>> {
        if !self.filter_vars || self.junk_patterns.is_empty() {
            return Ok(None);
        }
        let alternation = self
            .junk_patterns
            .iter()
            .map(|p| format!("(?:{})", p))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Some(Regex::new(&format!("^(?:{})", alternation))?))
    }
}

/// Channel names and axis units.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelUnits {
    pub name: String,
    pub x_units: String,
    pub y_units: String,
}

/// The decoded contents of a CFS file.
///
/// Recordings are split into frames (data sections), each holding signal data
/// for every channel plus per-frame metadata variables. File-level metadata
/// lives in file variables, each with a value and units.
#[derive(Debug, Clone)]
pub struct CfsFile {
    info: CfsInfo,
    channels: Vec<ChannelDescriptor>,
    file_vars: Vec<(String, Variable)>,
    frame_vars: Vec<(String, String)>,
    frames: Vec<Frame>,
}

impl CfsFile {
    /// Decode the file at `path` with default options.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &DecodeOptions::default())
    }

    pub fn open_with<P: AsRef<Path>>(path: P, options: &DecodeOptions) -> Result<Self> {
        let junk = options.junk_matcher()?;
        let path = path.as_ref();
        if !path.exists() {
            return Err(CfsError::NotFound(path.to_path_buf()));
        }
        info!("Reading CFS file: {}", path.display());
        let file = File::open(path)?;
        Self::decode(BufReader::new(file), junk.as_ref())
    }

    /// Decode a CFS file from any seekable reader.
    pub fn from_reader<R: Read + Seek>(reader: R, options: &DecodeOptions) -> Result<Self> {
        Self::decode(reader, options.junk_matcher()?.as_ref())
    }

    fn decode<R: Read + Seek>(reader: R, junk: Option<&Regex>) -> Result<Self> {
        let mut src = ByteSource::new(reader);
        let header = read_header(&mut src, junk)?;

        let base = header.file_vars_value_table_offset;
        let file_vars = header
            .file_vars
            .iter()
            .map(|var| {
                let value = resolve(&mut src, var, base)?;
                Ok((
                    var.name.clone(),
                    Variable {
                        value,
                        units: var.units.clone(),
                    },
                ))
            })
            .collect::<Result<Vec<_>>>()?;

        let offsets = read_pointer_table(&mut src, &header.file)?;
        let frames = offsets
            .iter()
            .map(|&offset| read_data_section(&mut src, offset, &header.channels, &header.frame_vars))
            .collect::<Result<Vec<_>>>()?;

        let creator = file_vars
            .first()
            .map(|(name, var)| format_creator(name, &var.value));
        let frame_vars = header
            .frame_vars
            .iter()
            .map(|v| (v.name.clone(), v.units.clone()))
            .collect();

        info!(
            "Decoded {} channels, {} frames, {} file vars",
            header.channels.len(),
            frames.len(),
            file_vars.len()
        );

        Ok(CfsFile {
            info: CfsInfo::new(header.file, creator),
            channels: header.channels,
            file_vars,
            frame_vars,
            frames,
        })
    }

    pub fn info(&self) -> &CfsInfo {
        &self.info
    }

    /// Channel descriptors in file order.
    pub fn channel_descriptors(&self) -> &[ChannelDescriptor] {
        &self.channels
    }

    pub fn channels(&self) -> Vec<ChannelUnits> {
        self.channels
            .iter()
            .map(|c| ChannelUnits {
                name: c.name.clone(),
                x_units: c.x_units.clone(),
                y_units: c.y_units.clone(),
            })
            .collect()
    }

    /// File variables with their values and units, in declaration order.
    pub fn file_vars(&self) -> &[(String, Variable)] {
        &self.file_vars
    }

    pub fn file_var(&self, name: &str) -> Option<&Variable> {
        self.file_vars.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    /// Frame variable names and units, in declaration order.
    pub fn frame_vars(&self) -> &[(String, String)] {
        &self.frame_vars
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn n_channels(&self) -> usize {
        self.channels.len()
    }

    pub fn n_frames(&self) -> usize {
        self.frames.len()
    }

    pub fn n_filevars(&self) -> usize {
        self.file_vars.len()
    }

    pub fn n_framevars(&self) -> usize {
        self.frame_vars.len()
    }
}
