// tests/common/mod.rs
// Synthetic CFS file builder for integration tests

#![allow(dead_code)]

use std::io::Write;
use tempfile::NamedTempFile;

pub use cfs_reader::structure::{
    CHANNEL_INFO_SIZE, DATA_SECTION_HEADER_SIZE, GENERAL_HEADER_SIZE, VARIABLE_PADDING,
};

/// Space reserved for each string frame variable (length byte included).
pub const STR_SLOT: usize = 20;

#[derive(Clone, Debug)]
pub enum TestValue {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    F32(f32),
    F64(f64),
    Str(String),
}

impl TestValue {
    pub fn code(&self) -> i16 {
        match self {
            TestValue::I8(_) => 0,
            TestValue::U8(_) => 1,
            TestValue::I16(_) => 2,
            TestValue::U16(_) => 3,
            TestValue::I32(_) => 4,
            TestValue::F32(_) => 5,
            TestValue::F64(_) => 6,
            TestValue::Str(_) => 7,
        }
    }

    pub fn encode(&self) -> Vec<u8> {
        match self {
            TestValue::I8(v) => v.to_le_bytes().to_vec(),
            TestValue::U8(v) => vec![*v],
            TestValue::I16(v) => v.to_le_bytes().to_vec(),
            TestValue::U16(v) => v.to_le_bytes().to_vec(),
            TestValue::I32(v) => v.to_le_bytes().to_vec(),
            TestValue::F32(v) => v.to_le_bytes().to_vec(),
            TestValue::F64(v) => v.to_le_bytes().to_vec(),
            TestValue::Str(s) => {
                let mut out = vec![s.len() as u8];
                out.extend_from_slice(s.as_bytes());
                out
            }
        }
    }
}

fn slot_size(code: i16) -> usize {
    match code {
        0 | 1 => 1,
        2 | 3 => 2,
        4 | 5 => 4,
        6 => 8,
        _ => STR_SLOT,
    }
}

/// Write `text` as a length-prefixed string padded to `width` bytes.
fn put_lstr(out: &mut Vec<u8>, text: &str, width: usize) {
    assert!(text.len() < width, "'{}' does not fit in {} bytes", text, width);
    let start = out.len();
    out.push(text.len() as u8);
    out.extend_from_slice(text.as_bytes());
    out.resize(start + width, 0);
}

fn put_fixed(out: &mut [u8], text: &str) {
    out[..text.len()].copy_from_slice(text.as_bytes());
}

#[derive(Clone, Debug)]
pub struct TestChannel {
    pub name: String,
    pub y_units: String,
    pub x_units: String,
    pub dtype: u8,
    pub byte_space: i16,
}

/// Per-section info for one channel.
#[derive(Clone, Debug)]
pub struct ChannelData {
    pub data_offset: i32,
    pub points: i32,
    pub scale: f32,
    pub offset: f32,
    pub interval: f32,
    pub x_offset: f32,
}

impl ChannelData {
    pub fn new(data_offset: i32, points: i32) -> Self {
        ChannelData {
            data_offset,
            points,
            scale: 1.0,
            offset: 0.0,
            interval: 0.001,
            x_offset: 0.0,
        }
    }

    pub fn scaled(mut self, scale: f32, offset: f32) -> Self {
        self.scale = scale;
        self.offset = offset;
        self
    }

    pub fn interval(mut self, interval: f32) -> Self {
        self.interval = interval;
        self
    }
}

#[derive(Clone, Debug, Default)]
pub struct TestSection {
    /// One value per declared frame variable, in declaration order
    pub vars: Vec<TestValue>,
    pub channels: Vec<ChannelData>,
    /// Raw channel data block
    pub data: Vec<u8>,
}

pub fn i16_bytes(values: &[i16]) -> Vec<u8> {
    values.iter().flat_map(|v| v.to_le_bytes()).collect()
}

pub struct CfsBuilder {
    pub marker: [u8; 8],
    pub filename: String,
    pub start_time: String,
    pub start_date: String,
    pub comment: String,
    channels: Vec<TestChannel>,
    file_vars: Vec<(String, String, TestValue)>,
    /// File variable descriptors with no stored value: (name, type code, offset)
    stray_vars: Vec<(String, i16, i16)>,
    frame_vars: Vec<(String, String, i16)>,
    sections: Vec<TestSection>,
}

impl CfsBuilder {
    pub fn new() -> Self {
        CfsBuilder {
            marker: *b"CEDFILE\"",
            filename: "TEST.CFS".to_string(),
            start_time: "14:30:05".to_string(),
            start_date: "01/06/21".to_string(),
            comment: "synthetic".to_string(),
            channels: Vec::new(),
            file_vars: Vec::new(),
            stray_vars: Vec::new(),
            frame_vars: Vec::new(),
            sections: Vec::new(),
        }
    }

    pub fn channel(mut self, name: &str, y_units: &str, dtype: u8, byte_space: i16) -> Self {
        self.channels.push(TestChannel {
            name: name.to_string(),
            y_units: y_units.to_string(),
            x_units: "s".to_string(),
            dtype,
            byte_space,
        });
        self
    }

    pub fn file_var(mut self, name: &str, units: &str, value: TestValue) -> Self {
        self.file_vars.push((name.to_string(), units.to_string(), value));
        self
    }

    /// Declare a file variable after the regular ones, pointing at `offset`
    /// in the value table without storing anything there.
    pub fn stray_file_var(mut self, name: &str, code: i16, offset: i16) -> Self {
        self.stray_vars.push((name.to_string(), code, offset));
        self
    }

    pub fn frame_var(mut self, name: &str, units: &str, code: i16) -> Self {
        self.frame_vars.push((name.to_string(), units.to_string(), code));
        self
    }

    pub fn section(mut self, section: TestSection) -> Self {
        self.sections.push(section);
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut out = vec![0u8; GENERAL_HEADER_SIZE];

        for ch in &self.channels {
            put_lstr(&mut out, &ch.name, 22);
            put_lstr(&mut out, &ch.y_units, 10);
            put_lstr(&mut out, &ch.x_units, 10);
            out.push(ch.dtype);
            out.push(0);
            out.extend_from_slice(&ch.byte_space.to_le_bytes());
            out.extend_from_slice(&(-1i16).to_le_bytes());
        }

        let mut offset = 0usize;
        for (name, units, value) in &self.file_vars {
            put_lstr(&mut out, name, 22);
            out.extend_from_slice(&value.code().to_le_bytes());
            put_lstr(&mut out, units, 10);
            out.extend_from_slice(&(offset as i16).to_le_bytes());
            offset += value.encode().len();
        }
        for (name, code, offset) in &self.stray_vars {
            put_lstr(&mut out, name, 22);
            out.extend_from_slice(&code.to_le_bytes());
            put_lstr(&mut out, "", 10);
            out.extend_from_slice(&offset.to_le_bytes());
        }
        out.extend_from_slice(&[0u8; VARIABLE_PADDING]);

        let mut frame_slots = 0usize;
        for (name, units, code) in &self.frame_vars {
            put_lstr(&mut out, name, 22);
            out.extend_from_slice(&code.to_le_bytes());
            put_lstr(&mut out, units, 10);
            out.extend_from_slice(&(frame_slots as i16).to_le_bytes());
            frame_slots += slot_size(*code);
        }
        out.extend_from_slice(&[0u8; VARIABLE_PADDING]);
        let header_bytes = out.len();

        for (_, _, value) in &self.file_vars {
            out.extend(value.encode());
        }

        let mut section_offsets = Vec::new();
        let mut last_section = 0usize;
        for section in &self.sections {
            let start = out.len();
            section_offsets.push(start as i32);
            let ch_dat_p = start + DATA_SECTION_HEADER_SIZE + CHANNEL_INFO_SIZE * section.channels.len() + frame_slots;

            out.extend_from_slice(&(last_section as i32).to_le_bytes());
            out.extend_from_slice(&(ch_dat_p as i32).to_le_bytes());
            out.extend_from_slice(&(section.data.len() as i32).to_le_bytes());
            out.extend_from_slice(&0i16.to_le_bytes());
            out.extend_from_slice(&[0u8; 16]);

            for ch in &section.channels {
                out.extend_from_slice(&ch.data_offset.to_le_bytes());
                out.extend_from_slice(&ch.points.to_le_bytes());
                out.extend_from_slice(&ch.scale.to_le_bytes());
                out.extend_from_slice(&ch.offset.to_le_bytes());
                out.extend_from_slice(&ch.interval.to_le_bytes());
                out.extend_from_slice(&ch.x_offset.to_le_bytes());
            }

            for (value, (_, _, code)) in section.vars.iter().zip(&self.frame_vars) {
                let mut slot = value.encode();
                slot.resize(slot_size(*code), 0);
                out.extend(slot);
            }

            out.extend_from_slice(&section.data);
            last_section = start;
        }

        let pointer_table = out.len();
        for offset in &section_offsets {
            out.extend_from_slice(&offset.to_le_bytes());
        }
        let total = out.len();

        let header = &mut out[..GENERAL_HEADER_SIZE];
        header[0..8].copy_from_slice(&self.marker);
        let mut name = Vec::new();
        put_lstr(&mut name, &self.filename, 14);
        header[8..22].copy_from_slice(&name);
        header[22..26].copy_from_slice(&(total as i32).to_le_bytes());
        put_fixed(&mut header[26..34], &self.start_time);
        put_fixed(&mut header[34..42], &self.start_date);
        header[42..44].copy_from_slice(&(self.channels.len() as i16).to_le_bytes());
        header[44..46].copy_from_slice(&((self.file_vars.len() + self.stray_vars.len()) as i16).to_le_bytes());
        header[46..48].copy_from_slice(&(self.frame_vars.len() as i16).to_le_bytes());
        header[48..50].copy_from_slice(&(header_bytes as i16).to_le_bytes());
        header[50..52].copy_from_slice(&((DATA_SECTION_HEADER_SIZE + CHANNEL_INFO_SIZE * self.channels.len()) as i16).to_le_bytes());
        header[52..56].copy_from_slice(&(last_section as i32).to_le_bytes());
        header[56..58].copy_from_slice(&(self.sections.len() as i16).to_le_bytes());
        header[58..60].copy_from_slice(&1i16.to_le_bytes());
        let mut comment = Vec::new();
        put_lstr(&mut comment, &self.comment, 74);
        header[60..134].copy_from_slice(&comment);
        header[134..138].copy_from_slice(&(pointer_table as i32).to_le_bytes());

        out
    }

    pub fn write(&self) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(&self.build()).expect("Failed to write CFS file");
        file.flush().expect("Failed to flush CFS file");
        file
    }
}
