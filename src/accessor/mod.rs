//! Strided accessor indexing.
//!
//! [`AccessorData`] maps a logical `(element, component)` coordinate to a
//! physical byte offset inside a byte region and reads or writes the value
//! stored there. It is used by the builder to fill freshly allocated
//! storage, to compute bounds, and by consumers reading packed buffers.
//!
//! Matrix elements whose components are smaller than 4 bytes carry filler
//! after each column so every column starts on a 4-byte boundary:
//!
//! ```text
//! MAT2 / BYTE, one element:  c0r0 c0r1 pad pad | c1r0 c1r1 pad pad
//! ```

mod bounds;

pub use bounds::ComponentBounds;

use crate::util::{
    column_stride, element_byte_size, Component, ComponentType, ComponentValue, ElementType,
    Error, Result,
};

/// Typed, strided view over a byte region.
///
/// `B` is any byte container: `&[u8]` for read-only views, `&mut [u8]` or
/// `Vec<u8>` when values must be written.
#[derive(Clone, Debug)]
pub struct AccessorData<B> {
    bytes: B,
    start: usize,
    component_type: ComponentType,
    element_type: ElementType,
    count: usize,
    byte_stride: usize,
}

impl<B: AsRef<[u8]>> AccessorData<B> {
    /// Create a view of `count` elements starting at `start`.
    ///
    /// `byte_stride` defaults to the element byte size. Fails if the stride
    /// is smaller than one element or the region is too short.
    pub fn new(
        bytes: B,
        start: usize,
        component_type: ComponentType,
        element_type: ElementType,
        count: usize,
        byte_stride: Option<usize>,
    ) -> Result<Self> {
        let element_size = element_byte_size(component_type, element_type);
        let byte_stride = byte_stride.unwrap_or(element_size);
        if byte_stride < element_size {
            return Err(Error::invalid(format!(
                "byte stride {byte_stride} is smaller than the {element_type}/{component_type} element size {element_size}"
            )));
        }

        let needed = if count == 0 {
            Some(start)
        } else {
            (count - 1)
                .checked_mul(byte_stride)
                .and_then(|n| n.checked_add(element_size))
                .and_then(|n| n.checked_add(start))
        };
        let Some(needed) = needed else {
            return Err(Error::invalid(format!(
                "accessor of {count} {element_type}/{component_type} elements with stride {byte_stride} overflows the address space"
            )));
        };
        let available = bytes.as_ref().len();
        if needed > available {
            return Err(Error::invalid(format!(
                "accessor of {count} {element_type}/{component_type} elements needs {needed} bytes, region has {available}"
            )));
        }

        Ok(Self {
            bytes,
            start,
            component_type,
            element_type,
            count,
            byte_stride,
        })
    }

    #[inline]
    pub fn component_type(&self) -> ComponentType {
        self.component_type
    }

    #[inline]
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Number of elements.
    #[inline]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Distance in bytes between the starts of consecutive elements.
    #[inline]
    pub fn byte_stride(&self) -> usize {
        self.byte_stride
    }

    /// Offset of element 0 inside the region.
    #[inline]
    pub fn start(&self) -> usize {
        self.start
    }

    /// Total number of components (`count * numComponents`).
    #[inline]
    pub fn total_components(&self) -> usize {
        self.count * self.element_type.num_components()
    }

    /// Physical byte offset of a component inside the region.
    pub fn physical_offset(&self, element: usize, component: usize) -> Result<usize> {
        self.check_index(element, component)?;
        let size = self.component_type.byte_size();
        let base = self.start + element * self.byte_stride;
        if self.element_type.is_matrix() {
            let rows = self.element_type.matrix_rows();
            let column = component / rows;
            let row = component % rows;
            let stride = column_stride(self.component_type, self.element_type);
            Ok(base + column * stride + row * size)
        } else {
            Ok(base + component * size)
        }
    }

    /// Read the value of one component.
    pub fn get(&self, element: usize, component: usize) -> Result<ComponentValue> {
        let offset = self.physical_offset(element, component)?;
        Ok(ComponentValue::read(self.component_type, &self.bytes.as_ref()[offset..]))
    }

    /// Read one component as `T`, which must match the component type.
    pub fn get_as<T: Component>(&self, element: usize, component: usize) -> Result<T> {
        self.check_kind(T::COMPONENT_TYPE)?;
        let offset = self.physical_offset(element, component)?;
        Ok(T::read_le(&self.bytes.as_ref()[offset..]))
    }

    /// Collect all components in logical order (element-major), skipping
    /// stride gaps and column padding.
    pub fn to_vec<T: Component>(&self) -> Result<Vec<T>> {
        self.check_kind(T::COMPONENT_TYPE)?;
        let n = self.element_type.num_components();
        let mut out = Vec::with_capacity(self.total_components());
        for e in 0..self.count {
            for c in 0..n {
                out.push(self.get_as::<T>(e, c)?);
            }
        }
        Ok(out)
    }

    /// Per-component min/max over all elements, `None` when empty.
    pub fn bounds(&self) -> Option<ComponentBounds> {
        ComponentBounds::scan(self)
    }

    /// Raw bytes of one element (including any column padding).
    pub fn element_bytes(&self, element: usize) -> Result<&[u8]> {
        self.check_index(element, 0)?;
        let begin = self.start + element * self.byte_stride;
        let size = element_byte_size(self.component_type, self.element_type);
        Ok(&self.bytes.as_ref()[begin..begin + size])
    }

    fn check_index(&self, element: usize, component: usize) -> Result<()> {
        if element >= self.count {
            return Err(Error::IndexOutOfRange {
                what: "element",
                index: element,
                count: self.count,
            });
        }
        let n = self.element_type.num_components();
        if component >= n {
            return Err(Error::IndexOutOfRange {
                what: "component",
                index: component,
                count: n,
            });
        }
        Ok(())
    }

    fn check_kind(&self, actual: ComponentType) -> Result<()> {
        if actual != self.component_type {
            return Err(Error::TypeMismatch {
                expected: self.component_type.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(())
    }
}

impl<B: AsRef<[u8]> + AsMut<[u8]>> AccessorData<B> {
    /// Write one component. The value kind must match the component type.
    pub fn set(&mut self, element: usize, component: usize, value: ComponentValue) -> Result<()> {
        self.check_kind(value.component_type())?;
        let offset = self.physical_offset(element, component)?;
        value.write(&mut self.bytes.as_mut()[offset..]);
        Ok(())
    }

    /// Write one component from a typed value.
    pub fn set_as<T: Component>(&mut self, element: usize, component: usize, value: T) -> Result<()> {
        self.set(element, component, value.into_value())
    }

    /// Fill from logical component values in element-major order.
    pub fn fill_from<T: Component>(&mut self, values: &[T]) -> Result<()> {
        if values.len() != self.total_components() {
            return Err(Error::invalid(format!(
                "expected {} components, got {}",
                self.total_components(),
                values.len()
            )));
        }
        let n = self.element_type.num_components();
        for (i, &v) in values.iter().enumerate() {
            self.set_as(i / n, i % n, v)?;
        }
        Ok(())
    }
}

impl<B> AccessorData<B> {
    /// Give back the underlying region.
    pub fn into_inner(self) -> B {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn i8_bytes(values: &[i8]) -> Vec<u8> {
        values.iter().map(|&v| v as u8).collect()
    }

    #[test]
    fn test_mat2_int8_column_padding() {
        let bytes = i8_bytes(&[1, 2, -1, -1, 3, 4, -1, -1, 2, 3, -1, -1, 4, 5, -1, -1]);
        let data = AccessorData::new(&bytes[..], 0, ComponentType::Int8, ElementType::Mat2, 2, None)
            .unwrap();
        assert_eq!(data.byte_stride(), 8);

        let e0: Vec<i8> = (0..4).map(|c| data.get_as::<i8>(0, c).unwrap()).collect();
        let e1: Vec<i8> = (0..4).map(|c| data.get_as::<i8>(1, c).unwrap()).collect();
        assert_eq!(e0, vec![1, 2, 3, 4]);
        assert_eq!(e1, vec![2, 3, 4, 5]);
        assert_eq!(data.get(1, 3).unwrap(), ComponentValue::Int8(5));
    }

    #[test]
    fn test_mat3_uint16_offsets() {
        let bytes = vec![0u8; 48];
        let data = AccessorData::new(&bytes[..], 0, ComponentType::Uint16, ElementType::Mat3, 2, None)
            .unwrap();
        // columns of 6 bytes padded to 8
        assert_eq!(data.physical_offset(0, 2).unwrap(), 4);
        assert_eq!(data.physical_offset(0, 3).unwrap(), 8);
        assert_eq!(data.physical_offset(0, 8).unwrap(), 20);
        assert_eq!(data.physical_offset(1, 0).unwrap(), 24);
    }

    #[test]
    fn test_strided_vec3_offsets() {
        let bytes = vec![0u8; 64];
        let data = AccessorData::new(&bytes[..], 4, ComponentType::Float32, ElementType::Vec3, 3, Some(20))
            .unwrap();
        assert_eq!(data.physical_offset(0, 0).unwrap(), 4);
        assert_eq!(data.physical_offset(1, 2).unwrap(), 4 + 20 + 8);
        assert_eq!(data.physical_offset(2, 1).unwrap(), 4 + 40 + 4);
    }

    #[test]
    fn test_out_of_range() {
        let bytes = vec![0u8; 12];
        let data = AccessorData::new(&bytes[..], 0, ComponentType::Float32, ElementType::Vec3, 1, None)
            .unwrap();
        assert!(matches!(
            data.get(1, 0),
            Err(Error::IndexOutOfRange { what: "element", index: 1, count: 1 })
        ));
        assert!(matches!(
            data.get(0, 3),
            Err(Error::IndexOutOfRange { what: "component", index: 3, count: 3 })
        ));
    }

    #[test]
    fn test_region_too_short() {
        let bytes = vec![0u8; 11];
        let result = AccessorData::new(&bytes[..], 0, ComponentType::Float32, ElementType::Vec3, 1, None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let result = AccessorData::new(&bytes[..], 0, ComponentType::Float32, ElementType::Scalar, 1, Some(2));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }

    #[test]
    fn test_float_roundtrip_is_bit_exact() {
        let values = [0.1f32, -0.0, f32::MIN_POSITIVE, 1.0e30, -7.25, f32::MAX];
        let mut data = AccessorData::new(vec![0u8; 24], 0, ComponentType::Float32, ElementType::Vec2, 3, None)
            .unwrap();
        data.fill_from(&values).unwrap();
        let back = data.to_vec::<f32>().unwrap();
        for (a, b) in values.iter().zip(&back) {
            assert_eq!(a.to_bits(), b.to_bits());
        }
    }

    #[test]
    fn test_integer_roundtrip() {
        let mut data = AccessorData::new(vec![0u8; 8], 0, ComponentType::Int16, ElementType::Vec4, 1, None)
            .unwrap();
        data.fill_from(&[i16::MIN, -1, 0, i16::MAX]).unwrap();
        assert_eq!(data.to_vec::<i16>().unwrap(), vec![i16::MIN, -1, 0, i16::MAX]);

        let mut data = AccessorData::new(vec![0u8; 4], 0, ComponentType::Uint8, ElementType::Vec4, 1, None)
            .unwrap();
        data.set(0, 2, ComponentValue::Uint8(255)).unwrap();
        assert_eq!(data.get(0, 2).unwrap(), ComponentValue::Uint8(255));
    }

    #[test]
    fn test_kind_mismatch() {
        let mut data = AccessorData::new(vec![0u8; 4], 0, ComponentType::Float32, ElementType::Scalar, 1, None)
            .unwrap();
        assert!(matches!(
            data.set(0, 0, ComponentValue::Uint32(1)),
            Err(Error::TypeMismatch { .. })
        ));
        assert!(data.get_as::<u32>(0, 0).is_err());
    }

    #[test]
    fn test_fill_writes_column_padding_as_zero() {
        let mut data = AccessorData::new(vec![0u8; 12], 0, ComponentType::Uint8, ElementType::Mat3, 1, None)
            .unwrap();
        data.fill_from(&[1u8, 2, 3, 4, 5, 6, 7, 8, 9]).unwrap();
        assert_eq!(data.into_inner(), vec![1, 2, 3, 0, 4, 5, 6, 0, 7, 8, 9, 0]);
    }

    #[test]
    fn test_empty_accessor() {
        let data = AccessorData::new(&[0u8; 0][..], 0, ComponentType::Float32, ElementType::Vec3, 0, None).unwrap();
        assert_eq!(data.total_components(), 0);
        assert!(data.bounds().is_none());
        assert!(data.to_vec::<f32>().unwrap().is_empty());
    }

    #[test]
    fn test_huge_count_is_rejected() {
        let bytes = [0u8; 16];
        let result = AccessorData::new(&bytes[..], 0, ComponentType::Float32, ElementType::Vec4, usize::MAX, None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let result = AccessorData::new(&bytes[..], 0, ComponentType::Uint8, ElementType::Scalar, 2, Some(usize::MAX));
        assert!(matches!(result, Err(Error::InvalidArgument(_))));

        let result = AccessorData::new(&bytes[..], usize::MAX, ComponentType::Uint8, ElementType::Scalar, 1, None);
        assert!(matches!(result, Err(Error::InvalidArgument(_))));
    }
}
