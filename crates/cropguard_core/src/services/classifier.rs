//! Class selection: maps a feature vector to one of the supported labels.

use serde::{Deserialize, Serialize};

use super::features::FeatureVector;

/// One supported classification label and what it implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LabelMapping {
    pub label: &'static str,
    pub plant_name: &'static str,
    pub scientific_name: &'static str,
    /// Knowledge-base disease id, if the label names a disease
    pub disease: Option<&'static str>,
    /// Knowledge-base pest id, if the label names a pest
    pub pest: Option<&'static str>,
}

const fn healthy(label: &'static str, plant_name: &'static str, scientific_name: &'static str) -> LabelMapping {
    LabelMapping { label, plant_name, scientific_name, disease: None, pest: None }
}

const fn diseased(
    label: &'static str,
    plant_name: &'static str,
    scientific_name: &'static str,
    disease: &'static str,
) -> LabelMapping {
    LabelMapping { label, plant_name, scientific_name, disease: Some(disease), pest: None }
}

const fn infested(
    label: &'static str,
    plant_name: &'static str,
    scientific_name: &'static str,
    pest: &'static str,
) -> LabelMapping {
    LabelMapping { label, plant_name, scientific_name, disease: None, pest: Some(pest) }
}

const APPLE: &str = "Malus domestica";
const CORN: &str = "Zea mays";
const GRAPE: &str = "Vitis vinifera";
const PEPPER: &str = "Capsicum annuum";
const POTATO: &str = "Solanum tuberosum";
const TOMATO: &str = "Solanum lycopersicum";

/// Supported labels. Order matters: the selector indexes into this table.
pub static LABELS: [LabelMapping; 34] = [
    diseased("Apple___Apple_scab", "Apple", APPLE, "apple_scab"),
    diseased("Apple___Black_rot", "Apple", APPLE, "black_rot"),
    diseased("Apple___Cedar_apple_rust", "Apple", APPLE, "cedar_apple_rust"),
    healthy("Apple___healthy", "Apple", APPLE),
    healthy("Blueberry___healthy", "Blueberry", "Vaccinium corymbosum"),
    diseased("Cherry___Powdery_mildew", "Cherry", "Prunus avium", "powdery_mildew"),
    infested("Pepper___Aphids", "Pepper", PEPPER, "aphids"),
    diseased("Corn___Cercospora_leaf_spot", "Corn", CORN, "gray_leaf_spot"),
    diseased("Corn___Common_rust", "Corn", CORN, "common_rust"),
    diseased("Corn___Northern_Leaf_Blight", "Corn", CORN, "northern_leaf_blight"),
    healthy("Corn___healthy", "Corn", CORN),
    diseased("Grape___Black_rot", "Grape", GRAPE, "black_rot"),
    diseased("Grape___Esca", "Grape", GRAPE, "esca"),
    diseased("Grape___Leaf_blight", "Grape", GRAPE, "isariopsis_leaf_spot"),
    healthy("Grape___healthy", "Grape", GRAPE),
    diseased("Orange___Citrus_greening", "Orange", "Citrus sinensis", "citrus_greening"),
    diseased("Peach___Bacterial_spot", "Peach", "Prunus persica", "bacterial_spot"),
    healthy("Peach___healthy", "Peach", "Prunus persica"),
    diseased("Pepper___Bacterial_spot", "Pepper", PEPPER, "bacterial_spot"),
    healthy("Pepper___healthy", "Pepper", PEPPER),
    diseased("Potato___Early_blight", "Potato", POTATO, "early_blight"),
    diseased("Potato___Late_blight", "Potato", POTATO, "late_blight"),
    healthy("Potato___healthy", "Potato", POTATO),
    diseased("Squash___Powdery_mildew", "Squash", "Cucurbita pepo", "powdery_mildew"),
    diseased("Strawberry___Leaf_scorch", "Strawberry", "Fragaria × ananassa", "leaf_scorch"),
    healthy("Strawberry___healthy", "Strawberry", "Fragaria × ananassa"),
    diseased("Tomato___Bacterial_spot", "Tomato", TOMATO, "bacterial_spot"),
    diseased("Tomato___Early_blight", "Tomato", TOMATO, "early_blight"),
    diseased("Tomato___Late_blight", "Tomato", TOMATO, "late_blight"),
    diseased("Tomato___Leaf_Mold", "Tomato", TOMATO, "leaf_mold"),
    diseased("Tomato___Septoria_leaf_spot", "Tomato", TOMATO, "septoria_leaf_spot"),
    infested("Tomato___Spider_mites", "Tomato", TOMATO, "spider_mites"),
    LabelMapping {
        label: "Tomato___Yellow_Leaf_Curl_Virus",
        plant_name: "Tomato",
        scientific_name: TOMATO,
        disease: Some("yellow_leaf_curl_virus"),
        pest: Some("whiteflies"),
    },
    healthy("Tomato___healthy", "Tomato", TOMATO),
];

/// Find the mapping for a label.
pub fn mapping_for(label: &str) -> Option<&'static LabelMapping> {
    LABELS.iter().find(|m| m.label == label)
}

/// How the selector seeds its choice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedMode {
    /// Seed from the feature vector only. Same image, same label.
    #[default]
    Content,
    /// Mix the current time into the seed so repeated scans of one image vary.
    WallClock,
}

impl SeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Content => "content",
            Self::WallClock => "wall_clock",
        }
    }
}

/// Source of the current time in milliseconds.
pub trait Clock: Send + Sync {
    fn now_millis(&self) -> i64;
}

/// [`Clock`] backed by the system time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// Picks one label per feature vector.
pub struct ClassSelector {
    mode: SeedMode,
    clock: Box<dyn Clock>,
}

impl Default for ClassSelector {
    fn default() -> Self {
        Self::new(SeedMode::Content)
    }
}

impl std::fmt::Debug for ClassSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClassSelector").field("mode", &self.mode).finish()
    }
}

impl ClassSelector {
    /// Create a selector using the system clock.
    pub fn new(mode: SeedMode) -> Self {
        Self::with_clock(mode, SystemClock)
    }

    /// Create a selector with an injected clock.
    pub fn with_clock(mode: SeedMode, clock: impl Clock + 'static) -> Self {
        Self { mode, clock: Box::new(clock) }
    }

    pub fn mode(&self) -> SeedMode {
        self.mode
    }

    /// Select a label for the given features.
    pub fn select(&self, features: &FeatureVector) -> &'static LabelMapping {
        let mut seed = content_seed(features);
        if self.mode == SeedMode::WallClock {
            seed = seed.wrapping_add(self.clock.now_millis());
        }
        let index = seed.rem_euclid(LABELS.len() as i64) as usize;
        let mapping = &LABELS[index];

        tracing::debug!(seed = seed, index = index, label = mapping.label, "Class selected");
        mapping
    }
}

/// Deterministic seed derived from the feature values and their statistics.
fn content_seed(features: &FeatureVector) -> i64 {
    let weighted: i64 = features
        .values()
        .iter()
        .enumerate()
        .map(|(i, v)| (v * 100.0).round() as i64 * (i as i64 + 1))
        .sum();

    weighted
        + (features.mean() * 1000.0).round() as i64
        + (features.variance() * 10000.0).round() as i64
        + (features.max() * 100.0).round() as i64
        + (features.min() * 100.0).round() as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicI64, Ordering};
    use std::sync::Arc;

    struct StepClock(Arc<AtomicI64>);

    impl Clock for StepClock {
        fn now_millis(&self) -> i64 {
            self.0.fetch_add(1, Ordering::SeqCst)
        }
    }

    #[test]
    fn test_labels_are_unique() {
        let mut labels: Vec<_> = LABELS.iter().map(|m| m.label).collect();
        labels.sort_unstable();
        labels.dedup();
        assert_eq!(labels.len(), LABELS.len());
    }

    #[test]
    fn test_healthy_labels_have_no_findings() {
        for mapping in LABELS.iter().filter(|m| m.label.ends_with("___healthy")) {
            assert!(mapping.disease.is_none() && mapping.pest.is_none(), "{}", mapping.label);
        }
    }

    #[test]
    fn test_mapping_for() {
        let mapping = mapping_for("Potato___Late_blight").unwrap();
        assert_eq!(mapping.plant_name, "Potato");
        assert_eq!(mapping.disease, Some("late_blight"));
        assert!(mapping_for("Banana___Panama").is_none());

        let tylcv = mapping_for("Tomato___Yellow_Leaf_Curl_Virus").unwrap();
        assert_eq!(tylcv.pest, Some("whiteflies"));
    }

    #[test]
    fn test_content_mode_is_deterministic() {
        let selector = ClassSelector::default();
        let features = FeatureVector::from_reference("https://example.com/leaf.jpg");
        let first = selector.select(&features);
        for _ in 0..10 {
            assert_eq!(selector.select(&features), first);
        }
    }

    #[test]
    fn test_content_seed_for_zero_hash() {
        // values 0,31,62,93,24,55,86,17,48,79 (x0.01)
        let features = FeatureVector::from_reference("");
        let weighted = 31 * 2 + 62 * 3 + 93 * 4 + 24 * 5 + 55 * 6 + 86 * 7 + 17 * 8 + 48 * 9 + 79 * 10;
        let variance = (features.variance() * 10000.0).round() as i64;
        assert_eq!(content_seed(&features), weighted + 495 + variance + 93);
    }

    #[test]
    fn test_wall_clock_mode_varies_with_time() {
        let ticks = Arc::new(AtomicI64::new(1_000));
        let selector = ClassSelector::with_clock(SeedMode::WallClock, StepClock(ticks));
        let features = FeatureVector::from_reference("file:///leaf.jpg");

        let first = selector.select(&features);
        let second = selector.select(&features);
        assert_ne!(first.label, second.label);
    }

    #[test]
    fn test_seed_mode_serde() {
        assert_eq!(serde_json::to_string(&SeedMode::WallClock).unwrap(), "\"wall_clock\"");
        assert_eq!(SeedMode::default(), SeedMode::Content);
    }
}
