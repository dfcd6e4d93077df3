//! Static disease and pest reference data.
//!
//! The knowledge base is built once on first access and shared for the life
//! of the process. Lookups that miss return `None`; callers decide whether a
//! miss is an error (the report assembler treats it as one).

use crate::models::{
    DiseaseRecord, PestKind, PestRecord, Prevention, Severity, Treatment, TreatmentMethod,
};

use std::collections::BTreeMap;
use std::sync::LazyLock;

static BUILTIN: LazyLock<KnowledgeBase> = LazyLock::new(KnowledgeBase::build);

/// Disease/pest reference tables keyed by identifier.
#[derive(Debug)]
pub struct KnowledgeBase {
    diseases: BTreeMap<String, DiseaseRecord>,
    pests: BTreeMap<String, PestRecord>,
}

impl KnowledgeBase {
    /// The built-in knowledge base.
    pub fn builtin() -> &'static KnowledgeBase {
        &BUILTIN
    }

    /// Look up a disease by id.
    pub fn disease(&self, id: &str) -> Option<&DiseaseRecord> {
        self.diseases.get(id)
    }

    /// Look up a pest by id.
    pub fn pest(&self, id: &str) -> Option<&PestRecord> {
        self.pests.get(id)
    }

    /// All diseases, ordered by id.
    pub fn diseases(&self) -> impl Iterator<Item = &DiseaseRecord> {
        self.diseases.values()
    }

    /// All pests, ordered by id.
    pub fn pests(&self) -> impl Iterator<Item = &PestRecord> {
        self.pests.values()
    }

    /// Diseases whose name, common names or symptoms mention `query` (case-insensitive).
    pub fn search_diseases(&self, query: &str) -> Vec<&DiseaseRecord> {
        let needle = query.to_lowercase();
        self.diseases
            .values()
            .filter(|d| {
                d.name.to_lowercase().contains(&needle)
                    || d.common_names.iter().any(|n| n.to_lowercase().contains(&needle))
                    || d.symptoms.iter().any(|s| s.to_lowercase().contains(&needle))
            })
            .collect()
    }

    fn build() -> Self {
        let diseases: BTreeMap<_, _> =
            disease_records().into_iter().map(|d| (d.id.clone(), d)).collect();
        let pests: BTreeMap<_, _> = pest_records().into_iter().map(|p| (p.id.clone(), p)).collect();

        tracing::debug!(
            diseases = diseases.len(),
            pests = pests.len(),
            "Knowledge base loaded"
        );

        Self { diseases, pests }
    }
}

// ========== Record Builders ==========

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[allow(clippy::too_many_arguments)]
fn treatment(
    id: &str,
    name: &str,
    description: &str,
    method: TreatmentMethod,
    application: &str,
    frequency: &str,
    duration: &str,
    precautions: &[&str],
    effectiveness: u8,
) -> Treatment {
    Treatment {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        method,
        application: application.to_string(),
        frequency: frequency.to_string(),
        duration: duration.to_string(),
        precautions: strings(precautions),
        effectiveness,
    }
}

fn prevention(
    id: &str,
    name: &str,
    description: &str,
    methods: &[&str],
    timing: &str,
    frequency: &str,
) -> Prevention {
    Prevention {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        methods: strings(methods),
        timing: timing.to_string(),
        frequency: frequency.to_string(),
    }
}

struct DiseaseEntry<'a> {
    id: &'a str,
    name: &'a str,
    scientific_name: &'a str,
    common_names: &'a [&'a str],
    description: &'a str,
    symptoms: &'a [&'a str],
    causes: &'a [&'a str],
    severity: Severity,
}

impl DiseaseEntry<'_> {
    fn record(self, treatments: Vec<Treatment>, prevention: Vec<Prevention>) -> DiseaseRecord {
        DiseaseRecord {
            id: self.id.to_string(),
            name: self.name.to_string(),
            scientific_name: self.scientific_name.to_string(),
            common_names: strings(self.common_names),
            description: self.description.to_string(),
            symptoms: strings(self.symptoms),
            causes: strings(self.causes),
            treatments,
            prevention,
            severity: self.severity,
        }
    }
}

// ========== Shared Treatments ==========

fn copper_fungicide() -> Treatment {
    treatment(
        "copper_fungicide",
        "Copper Fungicide",
        "Apply a copper-based fungicide to protect healthy foliage",
        TreatmentMethod::Chemical,
        "Spray on affected areas and surrounding foliage",
        "Every 7-10 days",
        "2-3 weeks",
        &["Wear protective equipment", "Avoid overuse", "Do not spray before rain"],
        85,
    )
}

fn chlorothalonil() -> Treatment {
    treatment(
        "chlorothalonil",
        "Chlorothalonil Spray",
        "Broad-spectrum protectant fungicide",
        TreatmentMethod::Chemical,
        "Spray to full coverage of leaves, including undersides",
        "Every 7-14 days",
        "Through the wet season",
        &["Wear protective equipment", "Observe pre-harvest interval"],
        80,
    )
}

fn sulfur_spray() -> Treatment {
    treatment(
        "sulfur_spray",
        "Sulfur Spray",
        "Wettable sulfur suppresses powdery mildews and rusts",
        TreatmentMethod::Organic,
        "Spray on leaves at first sign of infection",
        "Every 7 days",
        "3-4 weeks",
        &["Do not apply above 32°C", "Do not combine with oil sprays"],
        75,
    )
}

fn prune_infected() -> Treatment {
    treatment(
        "prune_infected",
        "Remove Infected Tissue",
        "Cut out and destroy infected leaves, shoots and fruit",
        TreatmentMethod::Cultural,
        "Prune affected parts and bag them; do not compost",
        "As symptoms appear",
        "Ongoing",
        &["Disinfect tools between cuts"],
        60,
    )
}

fn rogue_plants() -> Treatment {
    treatment(
        "rogue_plants",
        "Remove Infected Plants",
        "Pull and destroy infected plants to stop spread",
        TreatmentMethod::Cultural,
        "Remove whole plant including roots",
        "Once, immediately",
        "1 day",
        &["Bag plants before moving them through the field"],
        70,
    )
}

fn bacillus_subtilis() -> Treatment {
    treatment(
        "bacillus_subtilis",
        "Bacillus subtilis Biofungicide",
        "Beneficial bacterium that competes with foliar pathogens",
        TreatmentMethod::Biological,
        "Spray on foliage preventively or at first symptoms",
        "Every 5-7 days",
        "3-4 weeks",
        &["Store product away from heat"],
        65,
    )
}

fn neem_oil() -> Treatment {
    treatment(
        "neem_oil",
        "Neem Oil",
        "Botanical oil that smothers soft-bodied pests and repels feeding",
        TreatmentMethod::Organic,
        "Spray on all leaf surfaces in the evening",
        "Every 7 days",
        "3 weeks",
        &["Avoid spraying in full sun", "Avoid spraying open flowers"],
        70,
    )
}

fn insecticidal_soap() -> Treatment {
    treatment(
        "insecticidal_soap",
        "Insecticidal Soap",
        "Potassium fatty acid soap that kills pests on contact",
        TreatmentMethod::Organic,
        "Spray directly on pests, especially leaf undersides",
        "Every 5-7 days",
        "2-3 weeks",
        &["Test on a few leaves first"],
        75,
    )
}

fn insecticide() -> Treatment {
    treatment(
        "insecticide",
        "Insecticide Treatment",
        "Apply a registered contact insecticide",
        TreatmentMethod::Chemical,
        "Spray on affected areas",
        "Every 7-10 days",
        "2-3 weeks",
        &["Wear protective equipment", "Avoid overuse", "Protect pollinators"],
        85,
    )
}

fn miticide() -> Treatment {
    treatment(
        "miticide",
        "Miticide Treatment",
        "Apply a registered miticide that targets eggs and adults",
        TreatmentMethod::Chemical,
        "Spray leaf undersides thoroughly",
        "Every 7 days",
        "2 weeks",
        &["Rotate active ingredients to avoid resistance"],
        80,
    )
}

fn predatory_mites() -> Treatment {
    treatment(
        "predatory_mites",
        "Predatory Mites",
        "Release Phytoseiulus persimilis to hunt spider mites",
        TreatmentMethod::Biological,
        "Release on infested leaves",
        "Once, repeat if needed",
        "2-4 weeks",
        &["Stop broad-spectrum sprays before release"],
        80,
    )
}

fn ladybugs() -> Treatment {
    treatment(
        "ladybugs",
        "Ladybug Release",
        "Release lady beetles to feed on aphid colonies",
        TreatmentMethod::Biological,
        "Release at dusk near infested plants",
        "Once per infestation",
        "2-3 weeks",
        &["Water plants before release"],
        70,
    )
}

fn yellow_sticky_traps() -> Treatment {
    treatment(
        "yellow_sticky_traps",
        "Yellow Sticky Traps",
        "Trap flying adults to reduce populations and monitor pressure",
        TreatmentMethod::Cultural,
        "Hang traps just above the canopy",
        "Replace every 2 weeks",
        "Season-long",
        &["Traps also catch beneficial insects"],
        50,
    )
}

// ========== Shared Prevention ==========

fn crop_rotation() -> Prevention {
    prevention(
        "crop_rotation",
        "Crop Rotation",
        "Rotate crops annually",
        &["Plant non-solanaceous crops", "Wait 2-3 years before replanting the same family"],
        "Before planting season",
        "Every year",
    )
}

fn air_circulation() -> Prevention {
    prevention(
        "air_circulation",
        "Air Circulation",
        "Keep foliage dry by improving airflow",
        &["Space plants properly", "Prune lower leaves", "Stake or trellis plants"],
        "Throughout the season",
        "Weekly check",
    )
}

fn drip_irrigation() -> Prevention {
    prevention(
        "drip_irrigation",
        "Avoid Overhead Watering",
        "Water at the base so leaves stay dry",
        &["Use drip irrigation or soaker hoses", "Water early in the day"],
        "Throughout the season",
        "Every watering",
    )
}

fn sanitation() -> Prevention {
    prevention(
        "sanitation",
        "Garden Sanitation",
        "Remove crop debris where pathogens overwinter",
        &["Clear fallen leaves and fruit", "Disinfect tools", "Destroy infected debris"],
        "End of season and during outbreaks",
        "Every season",
    )
}

fn resistant_varieties() -> Prevention {
    prevention(
        "resistant_varieties",
        "Resistant Varieties",
        "Plant cultivars bred for resistance",
        &["Check seed catalog resistance codes"],
        "At planting",
        "Every planting",
    )
}

fn certified_stock() -> Prevention {
    prevention(
        "certified_stock",
        "Certified Planting Material",
        "Start with disease-free seed, transplants or nursery stock",
        &["Buy certified seed", "Inspect transplants before planting"],
        "Before planting",
        "Every planting",
    )
}

fn beneficial_habitat() -> Prevention {
    prevention(
        "beneficial_habitat",
        "Natural Predators",
        "Encourage predators that keep pest numbers down",
        &["Plant flowering borders", "Introduce ladybugs", "Avoid broad-spectrum insecticides"],
        "Before infestation",
        "As needed",
    )
}

fn regular_scouting() -> Prevention {
    prevention(
        "regular_scouting",
        "Regular Scouting",
        "Inspect leaves, especially undersides, for early signs",
        &["Use a hand lens", "Check new growth first"],
        "Throughout the season",
        "Twice weekly",
    )
}

fn reflective_mulch() -> Prevention {
    prevention(
        "reflective_mulch",
        "Reflective Mulch",
        "Silver mulch repels whiteflies and aphids from young plants",
        &["Lay mulch before transplanting"],
        "At planting",
        "Every season",
    )
}

fn insect_netting() -> Prevention {
    prevention(
        "insect_netting",
        "Insect Netting",
        "Exclude vectors with fine mesh row covers",
        &["Cover seedlings with 50-mesh netting"],
        "From transplanting to flowering",
        "Every season",
    )
}

fn humidity_control() -> Prevention {
    prevention(
        "humidity_control",
        "Humidity Control",
        "Keep greenhouse relative humidity below 85%",
        &["Ventilate", "Heat at night if needed"],
        "Throughout the season",
        "Daily",
    )
}

// ========== Diseases ==========

fn disease_records() -> Vec<DiseaseRecord> {
    vec![
        DiseaseEntry {
            id: "apple_scab",
            name: "Apple Scab",
            scientific_name: "Venturia inaequalis",
            common_names: &["Apple scab", "Black spot"],
            description: "A fungal disease of apple leaves and fruit favored by cool, wet springs",
            symptoms: &["Olive-green to black velvety spots", "Curled leaves", "Corky fruit lesions"],
            causes: &["Fungal infection", "Wet spring weather", "Infected leaf litter"],
            severity: Severity::Medium,
        }
        .record(vec![copper_fungicide(), sulfur_spray()], vec![sanitation(), resistant_varieties()]),
        DiseaseEntry {
            id: "bacterial_spot",
            name: "Bacterial Spot",
            scientific_name: "Xanthomonas campestris",
            common_names: &["Bacterial spot", "Bacterial leaf spot"],
            description: "A bacterial disease causing leaf and fruit spots on tomato, pepper and stone fruit",
            symptoms: &["Small water-soaked spots", "Spots with yellow halos", "Scabby fruit lesions"],
            causes: &["Bacterial infection", "Warm wet weather", "Splashing water"],
            severity: Severity::Medium,
        }
        .record(
            vec![copper_fungicide(), prune_infected()],
            vec![certified_stock(), drip_irrigation(), crop_rotation()],
        ),
        DiseaseEntry {
            id: "black_rot",
            name: "Black Rot",
            scientific_name: "Botryosphaeria obtusa",
            common_names: &["Black rot", "Frogeye leaf spot"],
            description: "A fungal disease causing fruit rot, leaf spots and limb cankers",
            symptoms: &["Purple-bordered leaf spots", "Rotting fruit with rings", "Shriveled mummified fruit"],
            causes: &["Fungal infection", "Dead wood and mummies left on plants", "Warm wet weather"],
            severity: Severity::High,
        }
        .record(vec![prune_infected(), copper_fungicide()], vec![sanitation(), air_circulation()]),
        DiseaseEntry {
            id: "cedar_apple_rust",
            name: "Cedar Apple Rust",
            scientific_name: "Gymnosporangium juniperi-virginianae",
            common_names: &["Cedar apple rust"],
            description: "A rust fungus that alternates between apples and junipers",
            symptoms: &["Bright orange leaf spots", "Tube-like growths under leaves", "Early leaf drop"],
            causes: &["Fungal spores from nearby junipers", "Wet spring weather"],
            severity: Severity::Medium,
        }
        .record(vec![sulfur_spray()], vec![resistant_varieties(), sanitation()]),
        DiseaseEntry {
            id: "citrus_greening",
            name: "Citrus Greening",
            scientific_name: "Candidatus Liberibacter asiaticus",
            common_names: &["Huanglongbing", "HLB", "Yellow dragon disease"],
            description: "An incurable bacterial disease spread by the Asian citrus psyllid",
            symptoms: &["Blotchy mottled leaves", "Lopsided bitter fruit", "Twig dieback"],
            causes: &["Bacterial infection", "Psyllid vectors", "Infected budwood"],
            severity: Severity::Critical,
        }
        .record(vec![rogue_plants(), insecticide()], vec![certified_stock(), regular_scouting()]),
        DiseaseEntry {
            id: "common_rust",
            name: "Common Rust",
            scientific_name: "Puccinia sorghi",
            common_names: &["Common rust", "Corn rust"],
            description: "A fungal rust of corn leaves favored by cool humid weather",
            symptoms: &["Cinnamon-brown pustules on both leaf surfaces", "Leaf yellowing"],
            causes: &["Wind-blown fungal spores", "Cool humid nights"],
            severity: Severity::Low,
        }
        .record(vec![chlorothalonil()], vec![resistant_varieties()]),
        DiseaseEntry {
            id: "early_blight",
            name: "Early Blight",
            scientific_name: "Alternaria solani",
            common_names: &["Early blight", "Target spot"],
            description: "A fungal disease affecting tomatoes and potatoes",
            symptoms: &["Dark spots on leaves", "Concentric rings", "Leaf yellowing", "Defoliation"],
            causes: &["Fungal infection", "Wet conditions", "Poor air circulation"],
            severity: Severity::Medium,
        }
        .record(
            vec![copper_fungicide(), chlorothalonil(), prune_infected()],
            vec![crop_rotation(), air_circulation(), drip_irrigation()],
        ),
        DiseaseEntry {
            id: "esca",
            name: "Esca",
            scientific_name: "Phaeomoniella chlamydospora",
            common_names: &["Black measles", "Grapevine trunk disease"],
            description: "A wood-decay disease complex of grapevines",
            symptoms: &["Tiger-striped leaves", "Dark spotted berries", "Sudden vine collapse"],
            causes: &["Fungal infection through pruning wounds", "Old infected wood"],
            severity: Severity::High,
        }
        .record(vec![prune_infected()], vec![sanitation()]),
        DiseaseEntry {
            id: "gray_leaf_spot",
            name: "Gray Leaf Spot",
            scientific_name: "Cercospora zeae-maydis",
            common_names: &["Gray leaf spot", "Cercospora leaf spot"],
            description: "A fungal leaf disease of corn favored by warm humid weather",
            symptoms: &["Rectangular gray-tan lesions", "Lesions bounded by leaf veins"],
            causes: &["Fungal infection", "Corn residue", "High humidity"],
            severity: Severity::Medium,
        }
        .record(vec![chlorothalonil()], vec![crop_rotation(), resistant_varieties()]),
        DiseaseEntry {
            id: "isariopsis_leaf_spot",
            name: "Isariopsis Leaf Spot",
            scientific_name: "Pseudocercospora vitis",
            common_names: &["Grape leaf blight", "Isariopsis leaf spot"],
            description: "A fungal leaf blight of grapevines",
            symptoms: &["Irregular dark brown leaf spots", "Premature defoliation"],
            causes: &["Fungal infection", "Warm humid weather"],
            severity: Severity::Medium,
        }
        .record(vec![copper_fungicide()], vec![sanitation(), air_circulation()]),
        DiseaseEntry {
            id: "late_blight",
            name: "Late Blight",
            scientific_name: "Phytophthora infestans",
            common_names: &["Late blight", "Potato blight"],
            description: "A fast-spreading water-mold disease affecting potatoes and tomatoes",
            symptoms: &["Dark spots on leaves", "White fungal growth", "Leaf yellowing", "Stem lesions"],
            causes: &["Water-mold infection", "Wet conditions", "Poor air circulation"],
            severity: Severity::High,
        }
        .record(
            vec![copper_fungicide(), chlorothalonil(), rogue_plants()],
            vec![crop_rotation(), certified_stock(), drip_irrigation()],
        ),
        DiseaseEntry {
            id: "leaf_mold",
            name: "Leaf Mold",
            scientific_name: "Passalora fulva",
            common_names: &["Tomato leaf mold"],
            description: "A fungal disease of tomato common in humid greenhouses",
            symptoms: &["Pale yellow spots on upper leaf", "Olive-green mold underneath"],
            causes: &["Fungal infection", "High humidity", "Poor ventilation"],
            severity: Severity::Low,
        }
        .record(vec![bacillus_subtilis(), chlorothalonil()], vec![humidity_control(), air_circulation()]),
        DiseaseEntry {
            id: "leaf_scorch",
            name: "Leaf Scorch",
            scientific_name: "Diplocarpon earlianum",
            common_names: &["Strawberry leaf scorch"],
            description: "A fungal leaf disease of strawberry",
            symptoms: &["Small purple blotches", "Leaves that look scorched", "Dried leaf edges"],
            causes: &["Fungal infection", "Overhead watering", "Old infected leaves"],
            severity: Severity::Low,
        }
        .record(vec![prune_infected(), copper_fungicide()], vec![sanitation(), drip_irrigation()]),
        DiseaseEntry {
            id: "northern_leaf_blight",
            name: "Northern Leaf Blight",
            scientific_name: "Exserohilum turcicum",
            common_names: &["Northern corn leaf blight"],
            description: "A fungal disease producing long cigar-shaped lesions on corn",
            symptoms: &["Cigar-shaped gray-green lesions", "Lesions turning tan", "Blighted leaves"],
            causes: &["Fungal infection", "Corn residue", "Moderate temperatures with dew"],
            severity: Severity::Medium,
        }
        .record(vec![chlorothalonil()], vec![crop_rotation(), resistant_varieties()]),
        DiseaseEntry {
            id: "powdery_mildew",
            name: "Powdery Mildew",
            scientific_name: "Podosphaera spp.",
            common_names: &["Powdery mildew"],
            description: "A fungal disease forming white powdery growth on leaves",
            symptoms: &["White powdery patches", "Distorted new growth", "Leaf yellowing"],
            causes: &["Fungal infection", "Dry days with humid nights", "Crowded plantings"],
            severity: Severity::Low,
        }
        .record(vec![sulfur_spray(), bacillus_subtilis()], vec![air_circulation(), resistant_varieties()]),
        DiseaseEntry {
            id: "septoria_leaf_spot",
            name: "Septoria Leaf Spot",
            scientific_name: "Septoria lycopersici",
            common_names: &["Septoria leaf spot"],
            description: "A fungal leaf spot of tomato that starts on lower leaves",
            symptoms: &["Small round spots with gray centers", "Dark spot borders", "Lower leaf drop"],
            causes: &["Fungal infection", "Splashing water", "Infected debris"],
            severity: Severity::Medium,
        }
        .record(vec![chlorothalonil(), prune_infected()], vec![sanitation(), drip_irrigation()]),
        DiseaseEntry {
            id: "yellow_leaf_curl_virus",
            name: "Tomato Yellow Leaf Curl Virus",
            scientific_name: "Begomovirus TYLCV",
            common_names: &["TYLCV", "Yellow leaf curl"],
            description: "A whitefly-transmitted viral disease of tomato with no cure",
            symptoms: &["Upward curling leaves", "Yellow leaf margins", "Stunted plants", "Flower drop"],
            causes: &["Viral infection", "Whitefly vectors"],
            severity: Severity::Critical,
        }
        .record(vec![rogue_plants(), yellow_sticky_traps()], vec![insect_netting(), reflective_mulch(), resistant_varieties()]),
    ]
}

// ========== Pests ==========

fn pest_records() -> Vec<PestRecord> {
    vec![
        PestRecord {
            id: "aphids".to_string(),
            name: "Aphids".to_string(),
            scientific_name: "Aphis gossypii".to_string(),
            kind: PestKind::Insect,
            common_names: strings(&["Aphids", "Greenfly", "Plant lice"]),
            description: "Small sap-sucking insects that attack plants".to_string(),
            symptoms: strings(&["Yellowing leaves", "Stunted growth", "Honeydew secretion"]),
            damage: strings(&["Sap loss", "Sooty mold on honeydew", "Virus transmission"]),
            treatments: vec![insecticidal_soap(), ladybugs(), insecticide()],
            prevention: vec![beneficial_habitat(), reflective_mulch()],
            severity: Severity::Medium,
        },
        PestRecord {
            id: "spider_mites".to_string(),
            name: "Spider Mites".to_string(),
            scientific_name: "Tetranychus urticae".to_string(),
            kind: PestKind::Mite,
            common_names: strings(&["Two-spotted spider mite", "Red spider mite"]),
            description: "Tiny arachnids that feed on leaf cells in hot dry conditions".to_string(),
            symptoms: strings(&["Stippled pale leaves", "Fine webbing", "Bronzed foliage"]),
            damage: strings(&["Reduced photosynthesis", "Leaf drop", "Plant decline"]),
            treatments: vec![predatory_mites(), miticide(), neem_oil()],
            prevention: vec![regular_scouting(), humidity_control()],
            severity: Severity::Medium,
        },
        PestRecord {
            id: "thrips".to_string(),
            name: "Thrips".to_string(),
            scientific_name: "Frankliniella occidentalis".to_string(),
            kind: PestKind::Insect,
            common_names: strings(&["Western flower thrips"]),
            description: "Slender insects that rasp leaf and flower tissue".to_string(),
            symptoms: strings(&["Silvery streaks on leaves", "Black specks of frass", "Deformed flowers"]),
            damage: strings(&["Scarred fruit", "Tospovirus transmission"]),
            treatments: vec![insecticidal_soap(), neem_oil()],
            prevention: vec![regular_scouting(), insect_netting()],
            severity: Severity::Medium,
        },
        PestRecord {
            id: "whiteflies".to_string(),
            name: "Whiteflies".to_string(),
            scientific_name: "Bemisia tabaci".to_string(),
            kind: PestKind::Insect,
            common_names: strings(&["Silverleaf whitefly", "Sweet potato whitefly"]),
            description: "Small white flying insects that feed on leaf undersides and spread viruses".to_string(),
            symptoms: strings(&["Clouds of white insects when disturbed", "Sticky leaves", "Yellowing"]),
            damage: strings(&["Sap loss", "Sooty mold", "Begomovirus transmission"]),
            treatments: vec![yellow_sticky_traps(), insecticidal_soap(), neem_oil()],
            prevention: vec![reflective_mulch(), insect_netting()],
            severity: Severity::High,
        },
    ]
}
