//! The voxel data types an MRtrix image header may declare in its
//! `datatype` entry.

use std::fmt;
use std::str::FromStr;

use byteordered::Endianness;

use crate::error::MrtrixError;

/// The numeric type of each voxel, without byte order.
#[derive(Debug, PartialEq, Eq, Hash, Clone, Copy)]
pub enum ScalarKind {
    /// Single bit, packed.
    Bit,
    /// signed char.
    Int8,
    /// unsigned char.
    UInt8,
    /// signed short.
    Int16,
    /// unsigned short.
    UInt16,
    /// signed int.
    Int32,
    /// unsigned int.
    UInt32,
    /// signed long long.
    Int64,
    /// unsigned long long.
    UInt64,
    /// 32 bit float.
    Float32,
    /// 64 bit float.
    Float64,
    /// 64 bit complex = 2 32 bit floats.
    CFloat32,
    /// 128 bit complex = 2 64 bit floats.
    CFloat64,
}

const KINDS: [(&str, ScalarKind); 13] = [
    ("Bit", ScalarKind::Bit),
    ("Int8", ScalarKind::Int8),
    ("UInt8", ScalarKind::UInt8),
    ("Int16", ScalarKind::Int16),
    ("UInt16", ScalarKind::UInt16),
    ("Int32", ScalarKind::Int32),
    ("UInt32", ScalarKind::UInt32),
    ("Int64", ScalarKind::Int64),
    ("UInt64", ScalarKind::UInt64),
    ("Float32", ScalarKind::Float32),
    ("Float64", ScalarKind::Float64),
    ("CFloat32", ScalarKind::CFloat32),
    ("CFloat64", ScalarKind::CFloat64),
];

impl ScalarKind {
    /// Number of bits per element.
    pub fn size_bits(self) -> usize {
        match self {
            ScalarKind::Bit => 1,
            ScalarKind::Int8 | ScalarKind::UInt8 => 8,
            ScalarKind::Int16 | ScalarKind::UInt16 => 16,
            ScalarKind::Int32 | ScalarKind::UInt32 | ScalarKind::Float32 => 32,
            ScalarKind::Int64 | ScalarKind::UInt64 | ScalarKind::Float64 | ScalarKind::CFloat32 => 64,
            ScalarKind::CFloat64 => 128,
        }
    }

    fn name(self) -> &'static str {
        KINDS
            .iter()
            .find(|(_, k)| *k == self)
            .map(|(name, _)| *name)
            .unwrap_or("Undefined")
    }
}

/// A voxel data type, as in `Float32LE` or `UInt8`.
///
/// Multi-byte types may carry an explicit byte order. When they don't, the
/// data is in the byte order of the machine which wrote it, which
/// `endianness()` reports as the native one.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct DataType {
    kind: ScalarKind,
    endianness: Option<Endianness>,
}

impl DataType {
    /// Create a data type with an explicit byte order.
    pub fn new(kind: ScalarKind, endianness: Endianness) -> Self {
        DataType {
            kind,
            endianness: if kind.size_bits() > 8 {
                Some(endianness)
            } else {
                None
            },
        }
    }

    /// The element type.
    pub fn kind(&self) -> ScalarKind {
        self.kind
    }

    /// The byte order of the stored data.
    pub fn endianness(&self) -> Endianness {
        self.endianness.unwrap_or_else(Endianness::native)
    }

    /// Whether the byte order was written out in the header.
    pub fn has_explicit_endianness(&self) -> bool {
        self.endianness.is_some()
    }

    /// Number of bytes per voxel, or `None` for bit-packed data.
    pub fn bytes_per_voxel(&self) -> Option<usize> {
        match self.kind {
            ScalarKind::Bit => None,
            k => Some(k.size_bits() / 8),
        }
    }

    /// Size in bytes of a data block with the given dimensions, or `None`
    /// if it does not fit in a `usize`.
    pub fn data_len(&self, dims: &[usize]) -> Option<usize> {
        let count = dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d))?;
        match self.bytes_per_voxel() {
            Some(n) => count.checked_mul(n),
            None => Some(count / 8 + usize::from(count % 8 != 0)),
        }
    }
}

impl FromStr for DataType {
    type Err = MrtrixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (base, endianness) = if let Some(base) = s.strip_suffix("LE") {
            (base, Some(Endianness::Little))
        } else if let Some(base) = s.strip_suffix("BE") {
            (base, Some(Endianness::Big))
        } else {
            (s, None)
        };
        let kind = KINDS
            .iter()
            .find(|(name, _)| *name == base)
            .map(|(_, kind)| *kind)
            .ok_or_else(|| MrtrixError::UnknownDataType(s.to_owned()))?;
        if endianness.is_some() && kind.size_bits() <= 8 {
            return Err(MrtrixError::UnknownDataType(s.to_owned()));
        }
        Ok(DataType { kind, endianness })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.kind.name())?;
        match self.endianness {
            Some(Endianness::Little) => f.write_str("LE"),
            Some(Endianness::Big) => f.write_str("BE"),
            None => Ok(()),
        }
    }
}
