// src/header.rs
// Header Reader: general info, channel and variable descriptors

use std::io::{Read, Seek};

use log::debug;
use regex::Regex;

use crate::error::{CfsError, Result};
use crate::primitive::Fields;
use crate::source::ByteSource;
use crate::structure::{
    DataKind, DataType, CHANNEL_DESCRIPTOR, CHANNEL_DESCRIPTOR_SIZE, GENERAL_HEADER,
    GENERAL_HEADER_SIZE, VARIABLE_DESCRIPTOR, VARIABLE_DESCRIPTOR_SIZE, VARIABLE_PADDING,
};

/// General file information, as decoded from the start of the file.
#[derive(Default, Clone, Debug)]
pub struct FileHeader {
    pub marker: String,
    /// Internal filename, at most 12 significant characters
    pub filename: String,
    pub file_size: i32,
    pub start_time: String,
    pub start_date: String,
    pub num_channels: usize,
    pub num_filevars: usize,
    pub num_dsvars: usize,
    pub header_bytes: i16,
    pub ds_header_bytes: i16,
    pub last_ds_header_offset: i32,
    pub num_data_sections: usize,
    pub block_size_rounding: i16,
    pub comment: String,
    pub pointer_table_offset: u64,
}

impl FileHeader {
    fn from_fields(fields: &Fields) -> Result<Self> {
        let header = FileHeader {
            marker: fields.text("marker")?,
            filename: fields.text("filename")?,
            file_size: fields.int("filesize")? as i32,
            start_time: fields.text("starttime")?,
            start_date: fields.text("startdate")?,
            num_channels: fields.unsigned("num_channels")? as usize,
            num_filevars: fields.unsigned("num_filevars")? as usize,
            num_dsvars: fields.unsigned("num_dsvars")? as usize,
            header_bytes: fields.int("header_bytes")? as i16,
            ds_header_bytes: fields.int("ds_header_bytes")? as i16,
            last_ds_header_offset: fields.int("last_ds_header_offset")? as i32,
            num_data_sections: fields.unsigned("num_data_sections")? as usize,
            block_size_rounding: fields.int("block_size_rounding")? as i16,
            comment: fields.text("comment")?,
            pointer_table_offset: fields.unsigned("pointer_table_offset")?,
        };
        header.check_version()?;
        Ok(header)
    }

    /// Format version encoded by the last marker character (`'!'` is version 1).
    pub fn version(&self) -> Option<u32> {
        let last = self.marker.chars().last()? as u32;
        (last + 1).checked_sub('!' as u32)
    }

    fn check_version(&self) -> Result<()> {
        match self.version() {
            Some(1..=2) => Ok(()),
            _ => Err(CfsError::UnsupportedVersion(self.marker.clone())),
        }
    }
}

/// One channel descriptor, in file channel order.
#[derive(Clone, Debug)]
pub struct ChannelDescriptor {
    pub name: String,
    pub y_units: String,
    pub x_units: String,
    pub data_type: DataType,
    pub data_kind: DataKind,
    /// Bytes between successive samples of this channel
    pub byte_space: i16,
    pub next_channel: i16,
}

impl ChannelDescriptor {
    fn from_fields(fields: &Fields) -> Result<Self> {
        Ok(ChannelDescriptor {
            name: fields.text("name")?,
            y_units: fields.text("y_units")?,
            x_units: fields.text("x_units")?,
            data_type: DataType::from_code(fields.int("dtype")?)?,
            data_kind: DataKind::from(fields.int("data_kind")? as u8),
            byte_space: fields.int("byte_space")? as i16,
            next_channel: fields.int("next_channel")? as i16,
        })
    }
}

/// A file or frame variable: its name, type and where its value is stored.
#[derive(Clone, Debug)]
pub struct VariableDescriptor {
    pub name: String,
    pub data_type: DataType,
    pub units: String,
    /// Offset of the value relative to its variable table
    pub offset: i16,
}

impl VariableDescriptor {
    fn from_fields(fields: &Fields) -> Result<Self> {
        Ok(VariableDescriptor {
            name: fields.text("name")?,
            data_type: DataType::from_code(fields.int("dtype")?)?,
            units: fields.text("units")?,
            offset: fields.int("offset")? as i16,
        })
    }
}

/// Everything the header walk produces, before any variable value is read.
#[derive(Clone, Debug)]
pub struct CfsHeader {
    pub file: FileHeader,
    pub channels: Vec<ChannelDescriptor>,
    pub file_vars: Vec<VariableDescriptor>,
    pub frame_vars: Vec<VariableDescriptor>,
    /// Absolute offset where file variable values begin
    pub file_vars_value_table_offset: u64,
}

/// Walk the header from offset 0.
///
/// Variables whose name matches `junk` are dropped as soon as their name is
/// decoded; their type code is never checked and their value never read.
pub fn read_header<R: Read + Seek>(
    src: &mut ByteSource<R>,
    junk: Option<&Regex>,
) -> Result<CfsHeader> {
    let fields = src.read_layout(0, GENERAL_HEADER, |_| false)?;
    let file = FileHeader::from_fields(&fields)?;
    let mut pos = GENERAL_HEADER_SIZE as u64;

    debug!(
        "CFS header: {} channels, {} file vars, {} frame vars, {} data sections",
        file.num_channels, file.num_filevars, file.num_dsvars, file.num_data_sections
    );

    let mut channels = Vec::with_capacity(file.num_channels);
    for _ in 0..file.num_channels {
        let fields = src.read_layout(pos, CHANNEL_DESCRIPTOR, |_| false)?;
        channels.push(ChannelDescriptor::from_fields(&fields)?);
        pos += CHANNEL_DESCRIPTOR_SIZE as u64;
    }

    let file_vars = read_variable_descriptors(src, &mut pos, file.num_filevars, junk)?;
    let frame_vars = read_variable_descriptors(src, &mut pos, file.num_dsvars, junk)?;

    Ok(CfsHeader {
        file,
        channels,
        file_vars,
        frame_vars,
        file_vars_value_table_offset: pos,
    })
}

/// Read `count` descriptors followed by the unused padding slot.
fn read_variable_descriptors<R: Read + Seek>(
    src: &mut ByteSource<R>,
    pos: &mut u64,
    count: usize,
    junk: Option<&Regex>,
) -> Result<Vec<VariableDescriptor>> {
    let mut vars = Vec::with_capacity(count);
    for _ in 0..count {
        let fields = src.read_layout(*pos, VARIABLE_DESCRIPTOR, |_| false)?;
        *pos += VARIABLE_DESCRIPTOR_SIZE as u64;

        let name = fields.text("name")?;
        if junk.is_some_and(|junk| junk.is_match(&name)) {
            debug!("Skipping internal variable '{}'", name);
            continue;
        }
        vars.push(VariableDescriptor::from_fields(&fields)?);
    }
    // The padding slot still has to be present in the file.
    src.read_at(*pos, VARIABLE_PADDING)?;
    *pos += VARIABLE_PADDING as u64;
    Ok(vars)
}

/// Absolute offsets of every data section, in file order.
pub fn read_pointer_table<R: Read + Seek>(
    src: &mut ByteSource<R>,
    file: &FileHeader,
) -> Result<Vec<u64>> {
    let raw = src.read_at(file.pointer_table_offset, 4 * file.num_data_sections)?;
    raw.chunks_exact(4)
        .map(|chunk| {
            let offset = i32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            u64::try_from(offset).map_err(|_| CfsError::InvalidField {
                field: "data_section_offset",
                value: offset as i64,
            })
        })
        .collect()
}
