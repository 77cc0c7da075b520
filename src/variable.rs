// src/variable.rs
// Variable Resolver: typed values for file and frame variables

use std::fmt;
use std::io::{Read, Seek};

use crate::error::{CfsError, Result};
use crate::header::VariableDescriptor;
use crate::source::ByteSource;
use crate::structure::DataType;

/// A decoded variable value, typed by the descriptor's type code.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    I8(i8),
    U8(u8),
    I16(i16),
    U16(u16),
    I32(i32),
    F32(f32),
    F64(f64),
    Text(String),
}

impl Value {
    /// Decode a numeric value of `dtype` from the start of `raw`.
    ///
    /// Strings are handled by [`resolve`], which needs the length byte first.
    pub fn from_numeric(dtype: DataType, raw: &[u8]) -> Result<Self> {
        if raw.len() < dtype.size() {
            return Err(CfsError::ShortField {
                needed: dtype.size(),
                available: raw.len(),
            });
        }
        Ok(match dtype {
            DataType::Int1 => Value::I8(raw[0] as i8),
            DataType::Wrd1 => Value::U8(raw[0]),
            DataType::Int2 => Value::I16(i16::from_le_bytes([raw[0], raw[1]])),
            DataType::Wrd2 => Value::U16(u16::from_le_bytes([raw[0], raw[1]])),
            DataType::Int4 => Value::I32(i32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
            DataType::Rl4 => Value::F32(f32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]])),
            DataType::Rl8 => Value::F64(f64::from_le_bytes([
                raw[0], raw[1], raw[2], raw[3], raw[4], raw[5], raw[6], raw[7],
            ])),
            DataType::Lstr => return Err(CfsError::UnknownDataType(dtype.code() as i64)),
        })
    }

    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::I8(v) => Some(v as f64),
            Value::U8(v) => Some(v as f64),
            Value::I16(v) => Some(v as f64),
            Value::U16(v) => Some(v as f64),
            Value::I32(v) => Some(v as f64),
            Value::F32(v) => Some(v as f64),
            Value::F64(v) => Some(v),
            Value::Text(_) => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::I8(v) => write!(f, "{}", v),
            Value::U8(v) => write!(f, "{}", v),
            Value::I16(v) => write!(f, "{}", v),
            Value::U16(v) => write!(f, "{}", v),
            Value::I32(v) => write!(f, "{}", v),
            Value::F32(v) => write!(f, "{}", v),
            Value::F64(v) => write!(f, "{}", v),
            Value::Text(s) => f.write_str(s),
        }
    }
}

/// A resolved variable together with its units.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub value: Value,
    pub units: String,
}

/// Read the value of `var`, stored at `base + var.offset`.
///
/// Nothing is cached; each call reads from the source again.
pub fn resolve<R: Read + Seek>(
    src: &mut ByteSource<R>,
    var: &VariableDescriptor,
    base: u64,
) -> Result<Value> {
    let offset = base
        .checked_add_signed(var.offset as i64)
        .ok_or(CfsError::InvalidField {
            field: "variable_offset",
            value: var.offset as i64,
        })?;

    match var.data_type {
        DataType::Lstr => {
            let len = src.read_at(offset, 1)?[0] as usize;
            let raw = src.read_at(offset + 1, len)?;
            Ok(Value::Text(std::str::from_utf8(&raw)?.to_string()))
        }
        dtype => {
            let raw = src.read_at(offset, dtype.size())?;
            Value::from_numeric(dtype, &raw)
        }
    }
}
