// src/primitive.rs
// Width-driven decoding of fixed structure fields

use crate::error::{CfsError, Result};

/// Interpretation of a structure field, chosen from its byte width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    U8,
    I16,
    I32,
    F32,
    /// 8 bytes of text, trailing NULs and whitespace trimmed
    FixedText,
    /// First byte is the length, followed by that many bytes of text
    PrefixedText,
}

impl FieldKind {
    /// Apart from 32-bit ints and floats, no two field types share a width,
    /// so the width alone selects the type. `as_float` only affects 4-byte fields.
    pub fn for_width(width: usize, as_float: bool) -> Self {
        match (width, as_float) {
            (1, _) => FieldKind::U8,
            (2, _) => FieldKind::I16,
            (4, false) => FieldKind::I32,
            (4, true) => FieldKind::F32,
            (8, _) => FieldKind::FixedText,
            _ => FieldKind::PrefixedText,
        }
    }
}

/// A decoded structure field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    U8(u8),
    I16(i16),
    I32(i32),
    F32(f32),
    Text(String),
}

impl FieldValue {
    pub fn as_int(&self) -> Option<i64> {
        match *self {
            FieldValue::U8(v) => Some(v as i64),
            FieldValue::I16(v) => Some(v as i64),
            FieldValue::I32(v) => Some(v as i64),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match *self {
            FieldValue::F32(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Decode `raw` as a field of the given width.
pub fn decode_field(raw: &[u8], width: usize, as_float: bool) -> Result<FieldValue> {
    if raw.len() < width {
        return Err(CfsError::ShortField {
            needed: width,
            available: raw.len(),
        });
    }
    let raw = &raw[..width];

    let value = match FieldKind::for_width(width, as_float) {
        FieldKind::U8 => FieldValue::U8(raw[0]),
        FieldKind::I16 => FieldValue::I16(i16::from_le_bytes([raw[0], raw[1]])),
        FieldKind::I32 => FieldValue::I32(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
        FieldKind::F32 => FieldValue::F32(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
        FieldKind::FixedText => {
            let text = std::str::from_utf8(raw)?;
            FieldValue::Text(text.trim_end_matches('\0').trim_end().to_string())
        }
        FieldKind::PrefixedText => FieldValue::Text(decode_prefixed(raw)?.to_string()),
    };

    Ok(value)
}

/// Decode a length-prefixed string held in `raw`.
pub fn decode_prefixed(raw: &[u8]) -> Result<&str> {
    let Some((&len, rest)) = raw.split_first() else {
        return Err(CfsError::StringLength {
            claimed: 1,
            available: 0,
        });
    };
    let len = len as usize;
    if len > rest.len() {
        return Err(CfsError::StringLength {
            claimed: len,
            available: rest.len(),
        });
    }
    Ok(std::str::from_utf8(&rest[..len])?)
}

/// Decoded fields of one structure, in layout order.
#[derive(Debug, Clone, Default)]
pub struct Fields {
    entries: Vec<(&'static str, FieldValue)>,
}

impl Fields {
    pub fn with_capacity(capacity: usize) -> Self {
        Fields {
            entries: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, name: &'static str, value: FieldValue) {
        self.entries.push((name, value));
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.entries.iter().find(|(n, _)| *n == name).map(|(_, v)| v)
    }

    pub fn int(&self, name: &'static str) -> Result<i64> {
        self.get(name)
            .and_then(FieldValue::as_int)
            .ok_or(CfsError::MissingField(name))
    }

    pub fn float(&self, name: &'static str) -> Result<f32> {
        self.get(name)
            .and_then(FieldValue::as_f32)
            .ok_or(CfsError::MissingField(name))
    }

    pub fn text(&self, name: &'static str) -> Result<String> {
        self.get(name)
            .and_then(FieldValue::as_text)
            .map(str::to_string)
            .ok_or(CfsError::MissingField(name))
    }

    /// Integer field that must be non-negative, e.g. a count or an absolute offset.
    pub fn unsigned(&self, name: &'static str) -> Result<u64> {
        let value = self.int(name)?;
        u64::try_from(value).map_err(|_| CfsError::InvalidField { field: name, value })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
