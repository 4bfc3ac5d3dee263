use crate::{Error, Result};

/// Canonical type of one array element, derived from a Zarr v2 dtype
/// descriptor (byte order + kind + byte width, e.g. `<f4`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Int8,
    UInt8,
    Int16,
    UInt16,
    Int32,
    UInt32,
    Float32,
    Float64,
}

impl ElementType {
    /// Resolve a dtype descriptor against the fixed catalog.
    pub fn from_dtype(descriptor: &str) -> Result<Self> {
        let out = match descriptor {
            "<b" | "<i1" | "|i1" => Self::Int8,
            "<B" | "<u1" | ">u1" | "|u1" => Self::UInt8,
            "<i2" => Self::Int16,
            "<u2" => Self::UInt16,
            "<i4" => Self::Int32,
            "<u4" => Self::UInt32,
            "<f4" => Self::Float32,
            "<f8" => Self::Float64,
            _ => return Err(Error::UnsupportedElementType(descriptor.to_string())),
        };
        Ok(out)
    }

    /// Byte width of one element.
    pub fn size_of(&self) -> usize {
        match self {
            Self::Int8 | Self::UInt8 => 1,
            Self::Int16 | Self::UInt16 => 2,
            Self::Int32 | Self::UInt32 | Self::Float32 => 4,
            Self::Float64 => 8,
        }
    }

    pub fn is_unsigned_byte(&self) -> bool {
        matches!(self, Self::UInt8)
    }
}
