//! Feature extraction.
//!
//! There is no trained model behind this: the vector is derived from a rolling
//! hash of the image reference (or the image bytes), so the same input always
//! yields the same features. The interface is what a real extractor would fill.

/// Number of values in a feature vector.
pub const FEATURE_COUNT: usize = 10;

/// Fixed-length vector of values in `[0.0, 1.0)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
}

impl FeatureVector {
    /// Features for an image identified by URL or path.
    pub fn from_reference(reference: &str) -> Self {
        Self::from_hash(rolling_hash(reference.encode_utf16().map(i32::from)))
    }

    /// Features for raw image bytes.
    pub fn from_bytes(data: &[u8]) -> Self {
        Self::from_hash(rolling_hash(data.iter().map(|&b| i32::from(b))))
    }

    /// Build a vector from explicit values. Values are clamped into `[0.0, 1.0]`.
    pub fn from_values(values: [f64; FEATURE_COUNT]) -> Self {
        Self { values: values.map(|v| if v.is_nan() { 0.0 } else { v.clamp(0.0, 1.0) }) }
    }

    fn from_hash(hash: i32) -> Self {
        let base = u64::from(hash.unsigned_abs());
        let mut values = [0.0; FEATURE_COUNT];
        for (i, value) in values.iter_mut().enumerate() {
            *value = ((base + i as u64 * 31) % 100) as f64 / 100.0;
        }
        Self { values }
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn mean(&self) -> f64 {
        self.values.iter().sum::<f64>() / FEATURE_COUNT as f64
    }

    /// Population variance.
    pub fn variance(&self) -> f64 {
        let mean = self.mean();
        self.values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / FEATURE_COUNT as f64
    }

    pub fn max(&self) -> f64 {
        self.values.iter().copied().fold(f64::MIN, f64::max)
    }

    pub fn min(&self) -> f64 {
        self.values.iter().copied().fold(f64::MAX, f64::min)
    }
}

/// `h = h * 31 + c` over 32-bit signed arithmetic with wraparound.
fn rolling_hash(units: impl Iterator<Item = i32>) -> i32 {
    units.fold(0i32, |h, c| h.wrapping_shl(5).wrapping_sub(h).wrapping_add(c))
}
