//! Per-component min/max, as exported in accessor `min`/`max` fields.

use super::AccessorData;

/// Minimum and maximum of every component over all elements.
///
/// Values are widened to f64, which is lossless for every component kind.
#[derive(Clone, Debug, PartialEq)]
pub struct ComponentBounds {
    pub min: Vec<f64>,
    pub max: Vec<f64>,
}

impl ComponentBounds {
    /// Scan an accessor once. Returns `None` for an empty accessor.
    pub fn scan<B: AsRef<[u8]>>(data: &AccessorData<B>) -> Option<Self> {
        if data.count() == 0 {
            return None;
        }
        let n = data.element_type().num_components();
        let mut min = vec![f64::INFINITY; n];
        let mut max = vec![f64::NEG_INFINITY; n];
        for e in 0..data.count() {
            for c in 0..n {
                // Indices are in range by construction
                let v = data.get(e, c).ok()?.as_f64();
                min[c] = min[c].min(v);
                max[c] = max[c].max(v);
            }
        }
        Some(Self { min, max })
    }

    /// Number of components covered.
    pub fn len(&self) -> usize {
        self.min.len()
    }

    pub fn is_empty(&self) -> bool {
        self.min.is_empty()
    }
}
