// src/frame.rs
// Data Section Reader: one recorded frame of variables and channel samples

use std::fmt::Display;
use std::io::{Read, Seek};

use log::{debug, trace};

use crate::error::{CfsError, Result};
use crate::header::{ChannelDescriptor, VariableDescriptor};
use crate::primitive::Fields;
use crate::source::ByteSource;
use crate::structure::{
    DataType, CHANNEL_INFO, CHANNEL_INFO_SIZE, DATA_SECTION_HEADER, DATA_SECTION_HEADER_SIZE,
};
use crate::variable::{resolve, Value};

/// Header at the start of a data section.
#[derive(Default, Clone, Debug)]
pub struct DataSectionHeader {
    pub prev_header_offset: i32,
    /// Absolute offset of the section's channel data block
    pub channel_data_offset: u64,
    pub channel_data_size: i32,
    pub flags: i16,
}

impl DataSectionHeader {
    fn from_fields(fields: &Fields) -> Result<Self> {
        Ok(DataSectionHeader {
            prev_header_offset: fields.int("prev_header_p")? as i32,
            channel_data_offset: fields.unsigned("ch_dat_p")?,
            channel_data_size: fields.int("ch_dat_size")? as i32,
            flags: fields.int("flags")? as i16,
        })
    }
}

/// Per-channel numeric info for one data section.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct ChannelInfo {
    /// Start of the channel's samples, relative to the channel data block
    pub data_offset: i32,
    pub data_points: i32,
    pub y_scale: f32,
    pub y_offset: f32,
    pub x_increment: f32,
    pub x_offset: f32,
}

impl ChannelInfo {
    fn from_fields(fields: &Fields) -> Result<Self> {
        Ok(ChannelInfo {
            data_offset: fields.int("data_offset")? as i32,
            data_points: fields.int("data_points")? as i32,
            y_scale: fields.float("y_scale")?,
            y_offset: fields.float("y_offset")?,
            x_increment: fields.float("x_increment")?,
            x_offset: fields.float("x_offset")?,
        })
    }
}

/// One channel's signal within a frame.
#[derive(Clone, Debug)]
pub struct FrameChannel {
    pub name: String,
    /// Sampling interval, usually in seconds
    pub sample_interval: f64,
    pub info: ChannelInfo,
    /// Samples in physical units, or `None` when the channel recorded nothing
    /// in this frame.
    pub data: Option<Vec<f64>>,
}

impl FrameChannel {
    pub fn sample_count(&self) -> usize {
        self.data.as_ref().map_or(0, Vec::len)
    }
}

/// A frame of data (a "data section" in CFS terms): one trial or sweep.
#[derive(Default, Clone, Debug)]
pub struct Frame {
    header: DataSectionHeader,
    vars: Vec<(String, Value)>,
    channels: Vec<FrameChannel>,
}

impl Frame {
    /// Frame variables in declaration order.
    pub fn vars(&self) -> &[(String, Value)] {
        &self.vars
    }

    pub fn var(&self, name: &str) -> Option<&Value> {
        self.vars.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn channels(&self) -> &[FrameChannel] {
        &self.channels
    }

    pub fn channel(&self, name: &str) -> Option<&FrameChannel> {
        self.channels.iter().find(|c| c.name == name)
    }

    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.iter().map(|c| c.name.as_str())
    }

    pub fn sample_interval(&self, name: &str) -> Option<f64> {
        self.channel(name).map(|c| c.sample_interval)
    }

    /// Samples for a channel; `None` if the channel is unknown or has no data.
    pub fn data(&self, name: &str) -> Option<&[f64]> {
        self.channel(name).and_then(|c| c.data.as_deref())
    }

    pub fn header(&self) -> &DataSectionHeader {
        &self.header
    }

    /// Sampling interval shared by all `names`.
    ///
    /// Fails if the channels disagree on either the interval or the number of
    /// samples. Channels without data count as holding zero samples.
    pub fn common_sample_interval(&self, names: &[&str]) -> Result<f64> {
        let channels = names
            .iter()
            .map(|&n| self.channel(n).ok_or_else(|| CfsError::UnknownChannel(n.to_string())))
            .collect::<Result<Vec<_>>>()?;
        let first = channels.first().ok_or(CfsError::EmptyChannelSet)?;

        let dt = first.sample_interval;
        if channels.iter().any(|c| !same_interval(c.sample_interval, dt)) {
            return Err(CfsError::InconsistentSampleInterval(describe(
                &channels,
                |c| c.sample_interval,
            )));
        }

        let count = first.sample_count();
        if channels.iter().any(|c| c.sample_count() != count) {
            return Err(CfsError::InconsistentSampleCount(describe(
                &channels,
                FrameChannel::sample_count,
            )));
        }

        Ok(dt)
    }

    pub(crate) fn add_variable(&mut self, name: &str, value: Value) {
        match self.vars.iter_mut().find(|(n, _)| n == name) {
            Some(slot) => slot.1 = value,
            None => self.vars.push((name.to_string(), value)),
        }
    }

    pub(crate) fn add_channel(&mut self, channel: FrameChannel) {
        self.channels.push(channel);
    }
}

fn same_interval(a: f64, b: f64) -> bool {
    a == b || (a.is_nan() && b.is_nan())
}

fn describe<T: Display>(channels: &[&FrameChannel], field: impl Fn(&FrameChannel) -> T) -> String {
    channels
        .iter()
        .map(|c| format!("{}={}", c.name, field(c)))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Widen an `f32` interval through its shortest decimal form, so `1e-4f32`
/// reads as `0.0001` rather than `0.0000999999974737875`.
fn normalize_interval(x: f32) -> f64 {
    x.to_string().parse().unwrap_or(x as f64)
}

/// Decode the data section starting at absolute `offset`.
pub fn read_data_section<R: Read + Seek>(
    src: &mut ByteSource<R>,
    offset: u64,
    channels: &[ChannelDescriptor],
    frame_vars: &[VariableDescriptor],
) -> Result<Frame> {
    let fields = src.read_layout(offset, DATA_SECTION_HEADER, |_| false)?;
    let header = DataSectionHeader::from_fields(&fields)?;
    debug!(
        "Data section at {}: channel data at {} ({} bytes)",
        offset, header.channel_data_offset, header.channel_data_size
    );

    let mut pos = offset + DATA_SECTION_HEADER_SIZE as u64;
    let mut infos = Vec::with_capacity(channels.len());
    for _ in channels {
        let fields = src.read_layout(pos, CHANNEL_INFO, |name| {
            name.starts_with('x') || name.starts_with('y')
        })?;
        infos.push(ChannelInfo::from_fields(&fields)?);
        pos += CHANNEL_INFO_SIZE as u64;
    }

    let mut frame = Frame {
        header,
        ..Default::default()
    };

    // Frame variable values follow the channel info blocks.
    for var in frame_vars {
        let value = resolve(src, var, pos)?;
        frame.add_variable(&var.name, value);
    }

    let base = frame.header.channel_data_offset;
    for (desc, info) in channels.iter().zip(infos) {
        let data = read_samples(src, base, desc, &info)?;
        frame.add_channel(FrameChannel {
            name: desc.name.clone(),
            sample_interval: normalize_interval(info.x_increment),
            info,
            data,
        });
    }

    Ok(frame)
}

/// Read one channel's samples and convert them to physical units.
fn read_samples<R: Read + Seek>(
    src: &mut ByteSource<R>,
    base: u64,
    desc: &ChannelDescriptor,
    info: &ChannelInfo,
) -> Result<Option<Vec<f64>>> {
    let count = usize::try_from(info.data_points).map_err(|_| CfsError::InvalidField {
        field: "data_points",
        value: info.data_points as i64,
    })?;
    if count == 0 {
        trace!("Channel '{}': no data in this frame", desc.name);
        return Ok(None);
    }
    if desc.data_type == DataType::Lstr {
        return Err(CfsError::UnknownDataType(desc.data_type.code() as i64));
    }

    let width = desc.data_type.size();
    let space = usize::try_from(desc.byte_space)
        .ok()
        .filter(|&s| s >= width)
        .ok_or(CfsError::InvalidField {
            field: "byte_space",
            value: desc.byte_space as i64,
        })?;
    let offset = u64::try_from(info.data_offset).map_err(|_| CfsError::InvalidField {
        field: "data_offset",
        value: info.data_offset as i64,
    })?;

    // Interleaved storage: start at the row boundary and pick this channel's lane.
    let (start, lane) = if space > width {
        let within = (offset % space as u64) as usize;
        let lane = within / width * width;
        if lane + width > space {
            return Err(CfsError::InvalidField {
                field: "data_offset",
                value: info.data_offset as i64,
            });
        }
        (offset - within as u64, lane)
    } else {
        (offset, 0)
    };

    trace!(
        "Channel '{}': {} samples, stride {} bytes, lane {}",
        desc.name,
        count,
        space,
        lane / width
    );

    let len = count.checked_mul(space).ok_or(CfsError::InvalidField {
        field: "data_points",
        value: info.data_points as i64,
    })?;
    let raw = src.read_at(base + start, len)?;
    let samples = deinterleave(&raw, width, space, lane, count)
        .map(|bytes| {
            let value = Value::from_numeric(desc.data_type, bytes)?;
            let sample = value
                .as_f64()
                .ok_or(CfsError::UnknownDataType(desc.data_type.code() as i64))?;
            Ok(sample * info.y_scale as f64 + info.y_offset as f64)
        })
        .collect::<Result<Vec<f64>>>()?;

    Ok(Some(samples))
}

/// Byte slices of `count` elements of `width` bytes, taken every `stride`
/// bytes starting `lane` bytes into `raw`.
fn deinterleave(
    raw: &[u8],
    width: usize,
    stride: usize,
    lane: usize,
    count: usize,
) -> impl Iterator<Item = &[u8]> {
    (0..count).map(move |i| {
        let start = i * stride + lane;
        &raw[start..start + width]
    })
}
