//! Alignment policy.
//!
//! By default the layout is minimal: accessors align to their component size
//! and views to the least common multiple of their accessors. A policy can
//! raise both floors, e.g. to the 4-byte alignment GPUs expect for vertex
//! attributes.

use crate::util::{combined_alignment, lcm, ComponentType, Error, Result};

/// Interleaved record strides are always a multiple of this.
pub const INTERLEAVED_STRIDE_ALIGNMENT: usize = 4;

/// Minimum alignments applied on top of the computed ones.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AlignmentPolicy {
    min_accessor_alignment: usize,
    min_view_alignment: usize,
}

impl AlignmentPolicy {
    /// Smallest padding that satisfies component alignment.
    pub const fn minimal() -> Self {
        Self {
            min_accessor_alignment: 1,
            min_view_alignment: 1,
        }
    }

    /// Every accessor and view starts on a 4-byte boundary.
    pub const fn gpu_friendly() -> Self {
        Self {
            min_accessor_alignment: 4,
            min_view_alignment: 4,
        }
    }

    /// Set the accessor alignment floor. Zero is rejected.
    pub fn with_min_accessor_alignment(mut self, alignment: usize) -> Result<Self> {
        self.min_accessor_alignment = nonzero(alignment, "accessor")?;
        Ok(self)
    }

    /// Set the buffer view alignment floor. Zero is rejected.
    pub fn with_min_view_alignment(mut self, alignment: usize) -> Result<Self> {
        self.min_view_alignment = nonzero(alignment, "buffer view")?;
        Ok(self)
    }

    #[inline]
    pub fn min_accessor_alignment(&self) -> usize {
        self.min_accessor_alignment
    }

    #[inline]
    pub fn min_view_alignment(&self) -> usize {
        self.min_view_alignment
    }

    /// Alignment required for an accessor of the given component type.
    #[inline]
    pub fn accessor_alignment(&self, component_type: ComponentType) -> usize {
        lcm(component_type.alignment(), self.min_accessor_alignment)
    }

    /// Alignment required for a view holding accessors with these alignments.
    pub fn view_alignment(&self, accessor_alignments: impl IntoIterator<Item = usize>) -> usize {
        lcm(combined_alignment(accessor_alignments), self.min_view_alignment)
    }
}

impl Default for AlignmentPolicy {
    fn default() -> Self {
        Self::minimal()
    }
}

fn nonzero(alignment: usize, what: &str) -> Result<usize> {
    if alignment == 0 {
        return Err(Error::invalid(format!("{what} alignment must be at least 1")));
    }
    Ok(alignment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_policy() {
        let p = AlignmentPolicy::default();
        assert_eq!(p, AlignmentPolicy::minimal());
        assert_eq!(p.accessor_alignment(ComponentType::Uint8), 1);
        assert_eq!(p.accessor_alignment(ComponentType::Int16), 2);
        assert_eq!(p.view_alignment([2, 4, 1]), 4);
        assert_eq!(p.view_alignment([]), 1);
    }

    #[test]
    fn test_gpu_friendly_policy() {
        let p = AlignmentPolicy::gpu_friendly();
        assert_eq!(p.accessor_alignment(ComponentType::Uint8), 4);
        assert_eq!(p.view_alignment([1]), 4);
    }

    #[test]
    fn test_custom_policy() {
        let p = AlignmentPolicy::minimal().with_min_view_alignment(16).unwrap();
        assert_eq!(p.view_alignment([4]), 16);
        assert_eq!(p.accessor_alignment(ComponentType::Float32), 4);

        let p = AlignmentPolicy::minimal().with_min_accessor_alignment(3).unwrap();
        assert_eq!(p.accessor_alignment(ComponentType::Int16), 6);

        assert!(AlignmentPolicy::minimal().with_min_view_alignment(0).is_err());
        assert!(AlignmentPolicy::minimal().with_min_accessor_alignment(0).is_err());
    }
}
