//! Accessor, buffer view and buffer models.
//!
//! Models are created by [`crate::builder::BufferStructureBuilder`] and
//! owned by a [`crate::structure::BufferStructure`]. Cross references are
//! plain arena indices ([`AccessorIndex`], [`BufferViewIndex`],
//! [`BufferIndex`]), never pointers. Offsets and parents are filled in when
//! an entity is grouped and are immutable afterwards.

use smallvec::SmallVec;
use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::accessor::{AccessorData, ComponentBounds};
use crate::util::{element_byte_size, ComponentType, ElementType, Error, Result};

macro_rules! arena_index {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub(crate) usize);

        impl $name {
            /// Position in the owning arena, which is also the glTF index.
            #[inline]
            pub const fn index(self) -> usize {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

arena_index!(
    /// Handle of an accessor inside a buffer structure.
    AccessorIndex
);
arena_index!(
    /// Handle of a buffer view inside a buffer structure.
    BufferViewIndex
);
arena_index!(
    /// Handle of a buffer inside a buffer structure.
    BufferIndex
);

/// Usage hint of a buffer view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Target {
    /// Vertex attribute data
    ArrayBuffer = 34962,
    /// Index data
    ElementArrayBuffer = 34963,
}

impl Target {
    #[inline]
    pub const fn gl_constant(self) -> u16 {
        self as u16
    }

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::ArrayBuffer => "ARRAY_BUFFER",
            Self::ElementArrayBuffer => "ELEMENT_ARRAY_BUFFER",
        }
    }
}

impl FromStr for Target {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ARRAY_BUFFER" | "34962" => Ok(Self::ArrayBuffer),
            "ELEMENT_ARRAY_BUFFER" | "34963" => Ok(Self::ElementArrayBuffer),
            _ => Err(Error::invalid(format!("unknown buffer view target: {s}"))),
        }
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// AccessorModel
// ============================================================================

/// One logical typed array.
#[derive(Clone, Debug)]
pub struct AccessorModel {
    pub(crate) id: String,
    pub(crate) component_type: ComponentType,
    pub(crate) element_type: ElementType,
    pub(crate) count: usize,
    pub(crate) byte_stride: usize,
    pub(crate) byte_offset: usize,
    pub(crate) alignment: usize,
    pub(crate) buffer_view: Option<BufferViewIndex>,
    /// Own tightly packed bytes, released once copied into a buffer.
    pub(crate) staged: Option<Vec<u8>>,
}

impl AccessorModel {
    pub(crate) fn new(
        id: String,
        component_type: ComponentType,
        element_type: ElementType,
        count: usize,
        alignment: usize,
        data: Vec<u8>,
    ) -> Self {
        Self {
            id,
            component_type,
            element_type,
            count,
            byte_stride: element_byte_size(component_type, element_type),
            byte_offset: 0,
            alignment,
            buffer_view: None,
            staged: Some(data),
        }
    }

    #[inline]
    pub fn id(&self) -> &str {
        &self.id
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

    /// Distance between consecutive elements inside the owning view.
    #[inline]
    pub fn byte_stride(&self) -> usize {
        self.byte_stride
    }

    /// Offset from the start of the owning buffer view.
    #[inline]
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    /// Required alignment of the accessor start, relative to the buffer.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Owning buffer view, `None` until grouped.
    #[inline]
    pub fn buffer_view(&self) -> Option<BufferViewIndex> {
        self.buffer_view
    }

    /// Size of one element including matrix column padding.
    #[inline]
    pub fn element_byte_size(&self) -> usize {
        element_byte_size(self.component_type, self.element_type)
    }

    /// Number of bytes of real data (`count * elementByteSize`).
    #[inline]
    pub fn data_byte_length(&self) -> usize {
        self.count * self.element_byte_size()
    }

    /// Bytes spanned inside the owning view, including stride gaps.
    pub fn byte_extent(&self) -> usize {
        if self.count == 0 {
            0
        } else {
            (self.count - 1) * self.byte_stride + self.element_byte_size()
        }
    }

    /// Indexer over the staged bytes, `None` once packed into a buffer.
    pub fn staged_data(&self) -> Option<AccessorData<&[u8]>> {
        let bytes = self.staged.as_deref()?;
        AccessorData::new(bytes, 0, self.component_type, self.element_type, self.count, None).ok()
    }

    /// Per-component bounds of the staged data.
    pub fn bounds(&self) -> Option<ComponentBounds> {
        self.staged_data()?.bounds()
    }
}

// ============================================================================
// BufferViewModel
// ============================================================================

/// An aligned byte range of a buffer holding one or more accessors.
#[derive(Clone, Debug)]
pub struct BufferViewModel {
    pub(crate) id: String,
    pub(crate) byte_offset: usize,
    pub(crate) byte_length: usize,
    pub(crate) byte_stride: Option<usize>,
    pub(crate) target: Option<Target>,
    pub(crate) alignment: usize,
    pub(crate) buffer: Option<BufferIndex>,
    pub(crate) accessors: Vec<AccessorIndex>,
    /// Padding ranges relative to the start of the view.
    pub(crate) padding: SmallVec<[Range<usize>; 4]>,
}

impl BufferViewModel {
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Offset into the owning buffer. Meaningful once the buffer exists.
    #[inline]
    pub fn byte_offset(&self) -> usize {
        self.byte_offset
    }

    #[inline]
    pub fn byte_length(&self) -> usize {
        self.byte_length
    }

    /// Shared element stride, set for interleaved views only.
    #[inline]
    pub fn byte_stride(&self) -> Option<usize> {
        self.byte_stride
    }

    #[inline]
    pub fn target(&self) -> Option<Target> {
        self.target
    }

    /// Combined alignment of all accessors in this view.
    #[inline]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    #[inline]
    pub fn buffer(&self) -> Option<BufferIndex> {
        self.buffer
    }

    /// Accessors in creation order.
    #[inline]
    pub fn accessors(&self) -> &[AccessorIndex] {
        &self.accessors
    }

    /// Padding inside the view, relative to its start.
    #[inline]
    pub fn padding_ranges(&self) -> &[Range<usize>] {
        &self.padding
    }

    #[inline]
    pub fn is_interleaved(&self) -> bool {
        self.byte_stride.is_some()
    }
}

// ============================================================================
// BufferModel
// ============================================================================

/// Final packed byte region.
#[derive(Clone, Debug)]
pub struct BufferModel {
    pub(crate) id: String,
    pub(crate) uri: Option<String>,
    pub(crate) data: Vec<u8>,
    pub(crate) views: Vec<BufferViewIndex>,
    pub(crate) padding: SmallVec<[Range<usize>; 4]>,
}

impl BufferModel {
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Opaque origin of the buffer, `None` for embedded/internal data.
    #[inline]
    pub fn uri(&self) -> Option<&str> {
        self.uri.as_deref()
    }

    #[inline]
    pub fn byte_length(&self) -> usize {
        self.data.len()
    }

    /// The packed bytes. Padding bytes are zero.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Buffer views in creation order.
    #[inline]
    pub fn views(&self) -> &[BufferViewIndex] {
        &self.views
    }

    /// Sorted, disjoint byte ranges that are pure alignment padding.
    #[inline]
    pub fn padding_ranges(&self) -> &[Range<usize>] {
        &self.padding
    }

    /// Returns true if the byte at `index` is padding.
    pub fn is_padding_byte_index(&self, index: usize) -> bool {
        let pos = self.padding.partition_point(|r| r.end <= index);
        self.padding.get(pos).is_some_and(|r| r.contains(&index))
    }

    /// Total number of padding bytes.
    pub fn padding_byte_count(&self) -> usize {
        self.padding.iter().map(|r| r.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_names() {
        assert_eq!("ARRAY_BUFFER".parse::<Target>().unwrap(), Target::ArrayBuffer);
        assert_eq!("34963".parse::<Target>().unwrap(), Target::ElementArrayBuffer);
        assert_eq!(Target::ArrayBuffer.gl_constant(), 34962);
        assert!("UNIFORM".parse::<Target>().is_err());
    }

    #[test]
    fn test_accessor_sizes() {
        let a = AccessorModel::new(
            "a".into(),
            ComponentType::Uint8,
            ElementType::Mat3,
            2,
            1,
            vec![0; 24],
        );
        assert_eq!(a.element_byte_size(), 12);
        assert_eq!(a.byte_stride(), 12);
        assert_eq!(a.data_byte_length(), 24);
        assert_eq!(a.byte_extent(), 24);
        assert!(a.buffer_view().is_none());
        assert!(a.staged_data().is_some());
    }

    #[test]
    fn test_padding_lookup() {
        let buffer = BufferModel {
            id: "b".into(),
            uri: None,
            data: vec![0; 16],
            views: Vec::new(),
            padding: smallvec::smallvec![2..4, 9..12],
        };
        let padding: Vec<usize> = (0..16).filter(|&i| buffer.is_padding_byte_index(i)).collect();
        assert_eq!(padding, vec![2, 3, 9, 10, 11]);
        assert_eq!(buffer.padding_byte_count(), 5);
    }
}
