// src/structure.rs
// Fixed-layout structures and type codes of the CFS format

use crate::error::{CfsError, Result};

/// Ordered `(field name, byte width)` pairs describing one fixed-size structure.
pub type FieldLayout = &'static [(&'static str, usize)];

/// General file header at offset 0.
pub const GENERAL_HEADER: FieldLayout = &[
    ("marker", 8),
    ("filename", 14),
    ("filesize", 4),
    ("starttime", 8),
    ("startdate", 8),
    ("num_channels", 2),
    ("num_filevars", 2),
    ("num_dsvars", 2),
    ("header_bytes", 2),
    ("ds_header_bytes", 2),
    ("last_ds_header_offset", 4),
    ("num_data_sections", 2),
    ("block_size_rounding", 2),
    ("comment", 74),
    ("pointer_table_offset", 4),
    ("reserved", 40),
];

/// Channel descriptor, repeated `num_channels` times after the general header.
pub const CHANNEL_DESCRIPTOR: FieldLayout = &[
    ("name", 22),
    ("y_units", 10),
    ("x_units", 10),
    ("dtype", 1),
    ("data_kind", 1),
    ("byte_space", 2),
    ("next_channel", 2),
];

/// File and data-section variable descriptors share this layout.
pub const VARIABLE_DESCRIPTOR: FieldLayout = &[
    ("name", 22),
    ("dtype", 2),
    ("units", 10),
    ("offset", 2),
];

/// Unused descriptor slot following each variable descriptor list.
pub const VARIABLE_PADDING: usize = 36;

/// Header at the start of every data section.
pub const DATA_SECTION_HEADER: FieldLayout = &[
    ("prev_header_p", 4),
    ("ch_dat_p", 4),
    ("ch_dat_size", 4),
    ("flags", 2),
    ("reserved", 16),
];

/// Per-channel numeric info, repeated for each channel inside a data section.
///
/// Fields whose name starts with `x` or `y` are 32-bit floats, the rest are
/// 32-bit integers.
pub const CHANNEL_INFO: FieldLayout = &[
    ("data_offset", 4),
    ("data_points", 4),
    ("y_scale", 4),
    ("y_offset", 4),
    ("x_increment", 4),
    ("x_offset", 4),
];

/// Total byte width of a layout.
pub const fn layout_size(layout: FieldLayout) -> usize {
    let mut total = 0;
    let mut i = 0;
    while i < layout.len() {
        total += layout[i].1;
        i += 1;
    }
    total
}

pub const GENERAL_HEADER_SIZE: usize = layout_size(GENERAL_HEADER);
pub const CHANNEL_DESCRIPTOR_SIZE: usize = layout_size(CHANNEL_DESCRIPTOR);
pub const VARIABLE_DESCRIPTOR_SIZE: usize = layout_size(VARIABLE_DESCRIPTOR);
pub const DATA_SECTION_HEADER_SIZE: usize = layout_size(DATA_SECTION_HEADER);
pub const CHANNEL_INFO_SIZE: usize = layout_size(CHANNEL_INFO);

/// Variable and channel storage types, indexed by their on-disk type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    /// Signed 8-bit integer (INT1)
    Int1,
    /// Unsigned 8-bit integer (WRD1)
    Wrd1,
    /// Signed 16-bit integer (INT2)
    Int2,
    /// Unsigned 16-bit integer (WRD2)
    Wrd2,
    /// Signed 32-bit integer (INT4)
    Int4,
    /// 32-bit float (RL4)
    Rl4,
    /// 64-bit float (RL8)
    Rl8,
    /// Length-prefixed string (LSTR)
    Lstr,
}

impl DataType {
    pub fn from_code(code: i64) -> Result<Self> {
        Ok(match code {
            0 => DataType::Int1,
            1 => DataType::Wrd1,
            2 => DataType::Int2,
            3 => DataType::Wrd2,
            4 => DataType::Int4,
            5 => DataType::Rl4,
            6 => DataType::Rl8,
            7 => DataType::Lstr,
            other => return Err(CfsError::UnknownDataType(other)),
        })
    }

    pub fn code(self) -> u8 {
        self as u8
    }

    /// Width in bytes of one stored element. Strings report their length byte.
    pub fn size(self) -> usize {
        match self {
            DataType::Int1 | DataType::Wrd1 | DataType::Lstr => 1,
            DataType::Int2 | DataType::Wrd2 => 2,
            DataType::Int4 | DataType::Rl4 => 4,
            DataType::Rl8 => 8,
        }
    }
}

/// How a channel's x axis relates to its samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataKind {
    EqualSpaced,
    Matrix,
    Subsidiary,
    Other(u8),
}

impl From<u8> for DataKind {
    fn from(code: u8) -> Self {
        match code {
            0 => DataKind::EqualSpaced,
            1 => DataKind::Matrix,
            2 => DataKind::Subsidiary,
            other => DataKind::Other(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_sizes() {
        assert_eq!(GENERAL_HEADER_SIZE, 178);
        assert_eq!(CHANNEL_DESCRIPTOR_SIZE, 48);
        assert_eq!(VARIABLE_DESCRIPTOR_SIZE, VARIABLE_PADDING);
        assert_eq!(DATA_SECTION_HEADER_SIZE, 30);
        assert_eq!(CHANNEL_INFO_SIZE, 24);
    }

    #[test]
    fn test_type_codes() {
        for code in 0..8 {
            let dtype = DataType::from_code(code).unwrap();
            assert_eq!(dtype.code() as i64, code);
        }
        assert_eq!(DataType::from_code(2).unwrap().size(), 2);
        assert_eq!(DataType::from_code(6).unwrap().size(), 8);
        assert!(matches!(DataType::from_code(8), Err(CfsError::UnknownDataType(8))));
        assert!(matches!(DataType::from_code(-1), Err(CfsError::UnknownDataType(-1))));
    }

    #[test]
    fn test_data_kind() {
        assert_eq!(DataKind::from(0), DataKind::EqualSpaced);
        assert_eq!(DataKind::from(2), DataKind::Subsidiary);
        assert_eq!(DataKind::from(9), DataKind::Other(9));
    }
}
