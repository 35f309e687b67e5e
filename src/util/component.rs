//! Component types - the numeric kinds a single accessor value can have.

use byteorder::{ByteOrder, LittleEndian};
use bytemuck::{Pod, Zeroable};
use std::fmt;
use std::str::FromStr;

use super::{Error, Result};

/// Numeric kind of one scalar value inside an accessor.
///
/// Discriminants are the GL component-type constants used by glTF.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u16)]
pub enum ComponentType {
    /// Signed 8-bit integer (`BYTE`)
    Int8 = 5120,
    /// Unsigned 8-bit integer (`UNSIGNED_BYTE`)
    Uint8 = 5121,
    /// Signed 16-bit integer (`SHORT`)
    Int16 = 5122,
    /// Unsigned 16-bit integer (`UNSIGNED_SHORT`)
    Uint16 = 5123,
    /// Unsigned 32-bit integer (`UNSIGNED_INT`)
    Uint32 = 5125,
    /// 32-bit IEEE 754 float (`FLOAT`)
    Float32 = 5126,
}

impl ComponentType {
    /// All supported component types.
    pub const ALL: [Self; 6] = [
        Self::Int8,
        Self::Uint8,
        Self::Int16,
        Self::Uint16,
        Self::Uint32,
        Self::Float32,
    ];

    /// Size in bytes of one component.
    #[inline]
    pub const fn byte_size(self) -> usize {
        match self {
            Self::Int8 | Self::Uint8 => 1,
            Self::Int16 | Self::Uint16 => 2,
            Self::Uint32 | Self::Float32 => 4,
        }
    }

    /// Per-accessor alignment requirement.
    ///
    /// Every accessor must start at a multiple of its component size.
    #[inline]
    pub const fn alignment(self) -> usize {
        self.byte_size()
    }

    /// GL constant of this component type.
    #[inline]
    pub const fn gl_constant(self) -> u16 {
        self as u16
    }

    /// Look up a component type by GL constant.
    pub fn from_gl_constant(value: u32) -> Result<Self> {
        match value {
            5120 => Ok(Self::Int8),
            5121 => Ok(Self::Uint8),
            5122 => Ok(Self::Int16),
            5123 => Ok(Self::Uint16),
            5125 => Ok(Self::Uint32),
            5126 => Ok(Self::Float32),
            _ => Err(Error::UnknownComponentType(value.to_string())),
        }
    }

    /// Name of the GL constant (`BYTE`, `UNSIGNED_SHORT`, ...).
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Int8 => "BYTE",
            Self::Uint8 => "UNSIGNED_BYTE",
            Self::Int16 => "SHORT",
            Self::Uint16 => "UNSIGNED_SHORT",
            Self::Uint32 => "UNSIGNED_INT",
            Self::Float32 => "FLOAT",
        }
    }

    /// Returns true for the floating point kind.
    #[inline]
    pub const fn is_float(self) -> bool {
        matches!(self, Self::Float32)
    }

    /// Returns true for the signed integer kinds.
    #[inline]
    pub const fn is_signed_integer(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16)
    }
}

impl FromStr for ComponentType {
    type Err = Error;

    /// Accepts the GL constant name or its decimal value.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "BYTE" => Ok(Self::Int8),
            "UNSIGNED_BYTE" => Ok(Self::Uint8),
            "SHORT" => Ok(Self::Int16),
            "UNSIGNED_SHORT" => Ok(Self::Uint16),
            "UNSIGNED_INT" => Ok(Self::Uint32),
            "FLOAT" => Ok(Self::Float32),
            other => match other.parse::<u32>() {
                Ok(v) => Self::from_gl_constant(v),
                Err(_) => Err(Error::UnknownComponentType(other.to_string())),
            },
        }
    }
}

impl fmt::Display for ComponentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// One component value, tagged with its kind.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ComponentValue {
    Int8(i8),
    Uint8(u8),
    Int16(i16),
    Uint16(u16),
    Uint32(u32),
    Float32(f32),
}

impl ComponentValue {
    /// Kind of this value.
    #[inline]
    pub const fn component_type(self) -> ComponentType {
        match self {
            Self::Int8(_) => ComponentType::Int8,
            Self::Uint8(_) => ComponentType::Uint8,
            Self::Int16(_) => ComponentType::Int16,
            Self::Uint16(_) => ComponentType::Uint16,
            Self::Uint32(_) => ComponentType::Uint32,
            Self::Float32(_) => ComponentType::Float32,
        }
    }

    /// Widen to f64. Lossless for every component kind.
    #[inline]
    pub fn as_f64(self) -> f64 {
        match self {
            Self::Int8(v) => v as f64,
            Self::Uint8(v) => v as f64,
            Self::Int16(v) => v as f64,
            Self::Uint16(v) => v as f64,
            Self::Uint32(v) => v as f64,
            Self::Float32(v) => v as f64,
        }
    }

    /// Decode a little-endian value of the given kind from the start of `bytes`.
    pub fn read(component_type: ComponentType, bytes: &[u8]) -> Self {
        match component_type {
            ComponentType::Int8 => Self::Int8(i8::read_le(bytes)),
            ComponentType::Uint8 => Self::Uint8(u8::read_le(bytes)),
            ComponentType::Int16 => Self::Int16(i16::read_le(bytes)),
            ComponentType::Uint16 => Self::Uint16(u16::read_le(bytes)),
            ComponentType::Uint32 => Self::Uint32(u32::read_le(bytes)),
            ComponentType::Float32 => Self::Float32(f32::read_le(bytes)),
        }
    }

    /// Encode this value little-endian at the start of `bytes`.
    pub fn write(self, bytes: &mut [u8]) {
        match self {
            Self::Int8(v) => v.write_le(bytes),
            Self::Uint8(v) => v.write_le(bytes),
            Self::Int16(v) => v.write_le(bytes),
            Self::Uint16(v) => v.write_le(bytes),
            Self::Uint32(v) => v.write_le(bytes),
            Self::Float32(v) => v.write_le(bytes),
        }
    }
}

impl fmt::Display for ComponentValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int8(v) => write!(f, "{v}"),
            Self::Uint8(v) => write!(f, "{v}"),
            Self::Int16(v) => write!(f, "{v}"),
            Self::Uint16(v) => write!(f, "{v}"),
            Self::Uint32(v) => write!(f, "{v}"),
            Self::Float32(v) => write!(f, "{v}"),
        }
    }
}

// === Component trait for typed access ===

/// Rust types that can be stored as accessor components.
pub trait Component: Pod + Zeroable + Copy + Default + PartialOrd + fmt::Debug {
    /// The corresponding component type.
    const COMPONENT_TYPE: ComponentType;

    /// Size of this type in bytes.
    const SIZE: usize = std::mem::size_of::<Self>();

    /// Decode from the first `SIZE` bytes (little-endian).
    fn read_le(bytes: &[u8]) -> Self;

    /// Encode into the first `SIZE` bytes (little-endian).
    fn write_le(self, bytes: &mut [u8]);

    /// Tag this value with its kind.
    fn into_value(self) -> ComponentValue;

    /// Extract a value of this kind, `None` on kind mismatch.
    fn from_value(value: ComponentValue) -> Option<Self>;
}

impl Component for i8 {
    const COMPONENT_TYPE: ComponentType = ComponentType::Int8;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0] as i8
    }

    #[inline]
    fn write_le(self, bytes: &mut [u8]) {
        bytes[0] = self as u8;
    }

    fn into_value(self) -> ComponentValue {
        ComponentValue::Int8(self)
    }

    fn from_value(value: ComponentValue) -> Option<Self> {
        match value {
            ComponentValue::Int8(v) => Some(v),
            _ => None,
        }
    }
}

impl Component for u8 {
    const COMPONENT_TYPE: ComponentType = ComponentType::Uint8;

    #[inline]
    fn read_le(bytes: &[u8]) -> Self {
        bytes[0]
    }

    #[inline]
    fn write_le(self, bytes: &mut [u8]) {
        bytes[0] = self;
    }

    fn into_value(self) -> ComponentValue {
        ComponentValue::Uint8(self)
    }

    fn from_value(value: ComponentValue) -> Option<Self> {
        match value {
            ComponentValue::Uint8(v) => Some(v),
            _ => None,
        }
    }
}

/// Multi-byte components all go through `byteorder`.
macro_rules! impl_component_le {
    ($ty:ty, $kind:ident, $read:ident, $write:ident) => {
        impl Component for $ty {
            const COMPONENT_TYPE: ComponentType = ComponentType::$kind;

            #[inline]
            fn read_le(bytes: &[u8]) -> Self {
                LittleEndian::$read(bytes)
            }

            #[inline]
            fn write_le(self, bytes: &mut [u8]) {
                LittleEndian::$write(bytes, self)
            }

            fn into_value(self) -> ComponentValue {
                ComponentValue::$kind(self)
            }

            fn from_value(value: ComponentValue) -> Option<Self> {
                match value {
                    ComponentValue::$kind(v) => Some(v),
                    _ => None,
                }
            }
        }
    };
}

impl_component_le!(i16, Int16, read_i16, write_i16);
impl_component_le!(u16, Uint16, read_u16, write_u16);
impl_component_le!(u32, Uint32, read_u32, write_u32);
impl_component_le!(f32, Float32, read_f32, write_f32);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_sizes() {
        assert_eq!(ComponentType::Int8.byte_size(), 1);
        assert_eq!(ComponentType::Uint8.byte_size(), 1);
        assert_eq!(ComponentType::Int16.byte_size(), 2);
        assert_eq!(ComponentType::Uint16.byte_size(), 2);
        assert_eq!(ComponentType::Uint32.byte_size(), 4);
        assert_eq!(ComponentType::Float32.byte_size(), 4);
        for ct in ComponentType::ALL {
            assert_eq!(ct.alignment(), ct.byte_size());
        }
    }

    #[test]
    fn test_component_names() {
        for ct in ComponentType::ALL {
            assert_eq!(ct.name().parse::<ComponentType>().unwrap(), ct);
            assert_eq!(ComponentType::from_gl_constant(ct.gl_constant() as u32).unwrap(), ct);
        }
        assert_eq!("5126".parse::<ComponentType>().unwrap(), ComponentType::Float32);
        assert!(matches!(
            "DOUBLE".parse::<ComponentType>(),
            Err(Error::UnknownComponentType(_))
        ));
        assert!(ComponentType::from_gl_constant(5124).is_err());
    }

    #[test]
    fn test_value_encoding_is_little_endian() {
        let mut buf = [0u8; 4];
        ComponentValue::Uint16(0x0102).write(&mut buf);
        assert_eq!(&buf[..2], &[0x02, 0x01]);

        ComponentValue::Float32(1.0).write(&mut buf);
        assert_eq!(buf, 1.0f32.to_le_bytes());
        assert_eq!(ComponentValue::read(ComponentType::Float32, &buf), ComponentValue::Float32(1.0));
    }

    #[test]
    fn test_signed_bit_patterns() {
        let buf = [0xFFu8, 0xFF];
        assert_eq!(ComponentValue::read(ComponentType::Int8, &buf), ComponentValue::Int8(-1));
        assert_eq!(ComponentValue::read(ComponentType::Uint8, &buf), ComponentValue::Uint8(255));
        assert_eq!(ComponentValue::read(ComponentType::Int16, &buf), ComponentValue::Int16(-1));
        assert_eq!(ComponentValue::read(ComponentType::Uint16, &buf), ComponentValue::Uint16(65535));
    }

    #[test]
    fn test_value_widening() {
        assert_eq!(ComponentValue::Int8(-128).as_f64(), -128.0);
        assert_eq!(ComponentValue::Uint32(u32::MAX).as_f64(), u32::MAX as f64);
        assert_eq!(f32::from_value(ComponentValue::Float32(2.5)), Some(2.5));
        assert_eq!(u16::from_value(ComponentValue::Float32(2.5)), None);
    }
}
