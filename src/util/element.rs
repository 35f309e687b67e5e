//! Element types - the shape of one accessor element.

use std::fmt;
use std::str::FromStr;

use super::math::align_up;
use super::{ComponentType, Error, Result};

/// Shape of one accessor element.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ElementType {
    Scalar,
    Vec2,
    Vec3,
    Vec4,
    Mat2,
    Mat3,
    Mat4,
}

impl ElementType {
    /// All element types.
    pub const ALL: [Self; 7] = [
        Self::Scalar,
        Self::Vec2,
        Self::Vec3,
        Self::Vec4,
        Self::Mat2,
        Self::Mat3,
        Self::Mat4,
    ];

    /// Number of components per element.
    #[inline]
    pub const fn num_components(self) -> usize {
        match self {
            Self::Scalar => 1,
            Self::Vec2 => 2,
            Self::Vec3 => 3,
            Self::Vec4 | Self::Mat2 => 4,
            Self::Mat3 => 9,
            Self::Mat4 => 16,
        }
    }

    /// Returns true for MAT2, MAT3 and MAT4.
    #[inline]
    pub const fn is_matrix(self) -> bool {
        matches!(self, Self::Mat2 | Self::Mat3 | Self::Mat4)
    }

    /// Rows per matrix column, 1 for non-matrix types.
    #[inline]
    pub const fn matrix_rows(self) -> usize {
        match self {
            Self::Mat2 => 2,
            Self::Mat3 => 3,
            Self::Mat4 => 4,
            _ => 1,
        }
    }

    /// glTF name of this element type.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Scalar => "SCALAR",
            Self::Vec2 => "VEC2",
            Self::Vec3 => "VEC3",
            Self::Vec4 => "VEC4",
            Self::Mat2 => "MAT2",
            Self::Mat3 => "MAT3",
            Self::Mat4 => "MAT4",
        }
    }
}

impl FromStr for ElementType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name() == s)
            .ok_or_else(|| Error::UnknownElementType(s.to_string()))
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Byte distance between the starts of two consecutive matrix columns.
///
/// Columns of sub-4-byte components start on 4-byte boundaries. For
/// non-matrix types this is simply the size of the whole element.
#[inline]
pub fn column_stride(component_type: ComponentType, element_type: ElementType) -> usize {
    let column = element_type.matrix_rows() * component_type.byte_size();
    if element_type.is_matrix() && component_type.byte_size() < 4 {
        align_up(column, 4)
    } else if element_type.is_matrix() {
        column
    } else {
        element_type.num_components() * component_type.byte_size()
    }
}

/// Size in bytes of one element, including matrix column padding.
#[inline]
pub fn element_byte_size(component_type: ComponentType, element_type: ElementType) -> usize {
    if element_type.is_matrix() {
        column_stride(component_type, element_type) * element_type.matrix_rows()
    } else {
        element_type.num_components() * component_type.byte_size()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_components() {
        let counts: Vec<usize> = ElementType::ALL.iter().map(|t| t.num_components()).collect();
        assert_eq!(counts, vec![1, 2, 3, 4, 4, 9, 16]);
    }

    #[test]
    fn test_element_names() {
        for t in ElementType::ALL {
            assert_eq!(t.name().parse::<ElementType>().unwrap(), t);
        }
        assert!(matches!("VEC5".parse::<ElementType>(), Err(Error::UnknownElementType(_))));
        assert!("scalar".parse::<ElementType>().is_err());
    }

    #[test]
    fn test_plain_element_sizes() {
        assert_eq!(element_byte_size(ComponentType::Float32, ElementType::Scalar), 4);
        assert_eq!(element_byte_size(ComponentType::Float32, ElementType::Vec3), 12);
        assert_eq!(element_byte_size(ComponentType::Uint8, ElementType::Vec3), 3);
        assert_eq!(element_byte_size(ComponentType::Uint16, ElementType::Vec4), 8);
        assert_eq!(element_byte_size(ComponentType::Float32, ElementType::Mat4), 64);
        assert_eq!(element_byte_size(ComponentType::Uint32, ElementType::Mat3), 36);
    }

    #[test]
    fn test_matrix_column_padding() {
        // 2 bytes per column padded to 4
        assert_eq!(element_byte_size(ComponentType::Int8, ElementType::Mat2), 8);
        // 3 bytes per column padded to 4
        assert_eq!(element_byte_size(ComponentType::Uint8, ElementType::Mat3), 12);
        // 4 bytes per column, already aligned
        assert_eq!(element_byte_size(ComponentType::Int8, ElementType::Mat4), 16);
        assert_eq!(element_byte_size(ComponentType::Int16, ElementType::Mat2), 8);
        // 6 bytes per column padded to 8
        assert_eq!(element_byte_size(ComponentType::Uint16, ElementType::Mat3), 24);
        assert_eq!(element_byte_size(ComponentType::Int16, ElementType::Mat4), 32);

        assert_eq!(column_stride(ComponentType::Uint8, ElementType::Mat3), 4);
        assert_eq!(column_stride(ComponentType::Float32, ElementType::Mat3), 12);
    }
}
