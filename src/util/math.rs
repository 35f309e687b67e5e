//! Alignment arithmetic and math type re-exports.
//!
//! Every offset computed by the layout engine goes through [`padding_for`]
//! and [`lcm`]; the helpers here are the only place where alignment
//! requirements are combined.

// Re-export the glam types accepted by the typed accessor constructors
pub use glam::{Mat2, Mat3, Mat4, Vec2, Vec3, Vec4};

/// Greatest common divisor (Euclid). `gcd(a, 0) == a`.
#[inline]
pub const fn gcd(mut a: usize, mut b: usize) -> usize {
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

/// Least common multiple.
///
/// Returns `b` if `a == 0` and `a` if `b == 0`, so folding over an empty
/// set starting from 0 or 1 behaves as expected.
#[inline]
pub const fn lcm(a: usize, b: usize) -> usize {
    if a == 0 {
        return b;
    }
    if b == 0 {
        return a;
    }
    a / gcd(a, b) * b
}

/// Number of filler bytes needed to bring `size` up to the next multiple
/// of `alignment`.
///
/// # Panics
///
/// Panics if `alignment` is zero.
#[inline]
pub fn padding_for(size: usize, alignment: usize) -> usize {
    assert!(alignment > 0, "alignment must be at least 1");
    let r = size % alignment;
    if r == 0 { 0 } else { alignment - r }
}

/// Round `size` up to the next multiple of `alignment`.
///
/// # Panics
///
/// Panics if `alignment` is zero.
#[inline]
pub fn align_up(size: usize, alignment: usize) -> usize {
    size + padding_for(size, alignment)
}

/// Combine any number of alignment requirements into one satisfying all.
///
/// An empty iterator yields 1.
pub fn combined_alignment(alignments: impl IntoIterator<Item = usize>) -> usize {
    alignments.into_iter().fold(1, lcm)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gcd() {
        assert_eq!(gcd(12, 8), 4);
        assert_eq!(gcd(7, 0), 7);
        assert_eq!(gcd(0, 7), 7);
        assert_eq!(gcd(17, 5), 1);
    }

    #[test]
    fn test_lcm() {
        assert_eq!(lcm(0, 4), 4);
        assert_eq!(lcm(4, 0), 4);
        assert_eq!(lcm(2, 4), 4);
        assert_eq!(lcm(4, 6), 12);
        assert_eq!(lcm(1, 1), 1);
    }

    #[test]
    fn test_padding_for() {
        assert_eq!(padding_for(0, 4), 0);
        assert_eq!(padding_for(6, 4), 2);
        assert_eq!(padding_for(8, 4), 0);
        assert_eq!(padding_for(5, 1), 0);
        assert_eq!(padding_for(13, 12), 11);
        assert_eq!(align_up(6, 4), 8);
    }

    #[test]
    #[should_panic(expected = "alignment must be at least 1")]
    fn test_padding_for_zero_alignment() {
        let _ = padding_for(3, 0);
    }

    #[test]
    fn test_combined_alignment() {
        assert_eq!(combined_alignment([]), 1);
        assert_eq!(combined_alignment([2, 4, 1]), 4);
        assert_eq!(combined_alignment([2, 3]), 6);
    }
}
