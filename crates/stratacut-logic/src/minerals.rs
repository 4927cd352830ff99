//! Keyed mineral lookup with fuzzy layer-label matching.
//!
//! Layer labels arrive from survey data in mixed languages and loose
//! spellings ("Aobayama Formation", "青葉山層", "aobayama"). The lookup
//! table resolves a label to mineral compositions through a strict
//! four-tier priority — first match wins, later tiers are never tried:
//!
//! 1. exact match against any declared language variant of a record;
//! 2. exact match of the normalized label in the precomputed alias map;
//! 3. substring containment in either direction;
//! 4. keyword fallback buckets (sand → quartz, clay/mud → clay minerals,
//!    limestone → calcite, otherwise a generic mixed bucket).
//!
//! [`MineralLookupTable::lookup`] never panics and never fails: an empty
//! label yields an empty list, an unknown one yields a fallback bucket.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Descriptive physical and chemical properties of a mineral.
/// Read-only reference data; all fields optional in the feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MineralProperties {
    #[serde(default)]
    pub mohs_hardness: Option<String>,
    #[serde(default)]
    pub density: Option<String>,
    #[serde(default)]
    pub magnetism: Option<String>,
    #[serde(default)]
    pub appearance: Option<String>,
    #[serde(default)]
    pub acid_reaction: bool,
    #[serde(default)]
    pub uv_fluorescence: Option<String>,
    #[serde(default)]
    pub polarized_color: Option<String>,
}

/// One mineral within a layer's composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MineralComposition {
    pub id: String,
    /// Primary name.
    pub name: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub name_ja: Option<String>,
    /// Fraction of the layer's composition, in [0, 1].
    pub percentage: f32,
    #[serde(default)]
    pub properties: MineralProperties,
}

impl MineralComposition {
    fn fallback(id: &str, name: &str, name_en: &str, percentage: f32) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            name_en: Some(name_en.to_string()),
            name_ja: None,
            percentage,
            properties: MineralProperties::default(),
        }
    }
}

/// One keyed record of the reference feed: a stratigraphic layer with its
/// language-variant names and mineral composition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerRecord {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub name_en: Option<String>,
    #[serde(default)]
    pub name_ja: Option<String>,
    pub minerals: Vec<MineralComposition>,
}

impl LayerRecord {
    /// All declared name variants, primary first.
    fn variants(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.name.as_str())
            .chain(self.name_en.as_deref())
            .chain(self.name_ja.as_deref())
    }
}

/// Decorative suffixes stripped during normalization.
const DECORATIVE_SUFFIXES: [&str; 4] = ["formation", "layer", "层", "層"];

/// Normalize a layer label: lowercase, trim, collapse internal whitespace,
/// strip one trailing decorative suffix.
pub fn normalize_label(label: &str) -> String {
    let lower = label.to_lowercase();
    let mut collapsed = lower.split_whitespace().collect::<Vec<_>>().join(" ");
    for suffix in DECORATIVE_SUFFIXES {
        if let Some(stripped) = collapsed.strip_suffix(suffix) {
            collapsed = stripped.trim_end().to_string();
            break;
        }
    }
    collapsed
}

/// In-memory mineral lookup table over a preloaded record set.
#[derive(Debug, Clone, Default)]
pub struct MineralLookupTable {
    records: Vec<LayerRecord>,
    /// normalized alias → record index. Built once at construction.
    normalized_index: HashMap<String, usize>,
}

impl MineralLookupTable {
    /// Build a table from a preloaded record set, precomputing the
    /// normalized alias map (plain and whitespace-free forms of every
    /// name variant).
    pub fn from_records(records: Vec<LayerRecord>) -> Self {
        let mut normalized_index = HashMap::new();
        for (idx, record) in records.iter().enumerate() {
            for variant in record.variants() {
                let normalized = normalize_label(variant);
                if normalized.is_empty() {
                    continue;
                }
                let squashed = normalized.replace(' ', "");
                // First record to claim an alias keeps it
                normalized_index.entry(normalized).or_insert(idx);
                normalized_index.entry(squashed).or_insert(idx);
            }
        }
        Self {
            records,
            normalized_index,
        }
    }

    /// A table with no records. Every query degrades to the tier-4
    /// fallback buckets — the shape the system takes when the backing
    /// database failed to load.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Names of all layers in the table, in record order.
    pub fn known_layers(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.name.as_str()).collect()
    }

    /// Whether a label resolves to an actual record (tiers 1–3), as
    /// opposed to a fallback bucket.
    pub fn contains_layer(&self, label: &str) -> bool {
        self.find_record(label).is_some()
    }

    /// Resolve a layer label to its mineral composition.
    ///
    /// Never panics. Empty and whitespace-only labels return an empty
    /// vec; labels that miss tiers 1–3 return a fallback bucket.
    pub fn lookup(&self, label: &str) -> Vec<MineralComposition> {
        let normalized = normalize_label(label);
        if normalized.is_empty() {
            return Vec::new();
        }

        if let Some(record) = self.find_record(label) {
            return record.minerals.clone();
        }

        fallback_minerals(&normalized)
    }

    /// Tiers 1–3 of the matching policy. `None` means fall through to
    /// the keyword buckets.
    fn find_record(&self, label: &str) -> Option<&LayerRecord> {
        // Tier 1: exact variant match, case- and trim-insensitive
        let plain = label.trim().to_lowercase();
        if plain.is_empty() {
            return None;
        }
        if let Some(record) = self.records.iter().find(|r| {
            r.variants()
                .any(|v| v.trim().to_lowercase() == plain)
        }) {
            return Some(record);
        }

        // Tier 2: normalized alias map
        let normalized = normalize_label(label);
        if let Some(&idx) = self
            .normalized_index
            .get(&normalized)
            .or_else(|| self.normalized_index.get(&normalized.replace(' ', "")))
        {
            return Some(&self.records[idx]);
        }

        // Tier 3: substring containment, either direction
        self.records.iter().find(|r| {
            r.variants().any(|v| {
                let v = normalize_label(v);
                !v.is_empty() && (normalized.contains(&v) || v.contains(&normalized))
            })
        })
    }
}

/// Tier 4: guess a composition from keywords in the normalized label.
fn fallback_minerals(normalized: &str) -> Vec<MineralComposition> {
    const SAND_TOKENS: [&str; 2] = ["sand", "砂"];
    const CLAY_TOKENS: [&str; 5] = ["clay", "mud", "shale", "页", "泥"];
    const LIMESTONE_TOKENS: [&str; 2] = ["limestone", "石灰"];

    if SAND_TOKENS.iter().any(|t| normalized.contains(t)) {
        vec![MineralComposition::fallback(
            "quartz_default",
            "石英",
            "Quartz",
            0.7,
        )]
    } else if CLAY_TOKENS.iter().any(|t| normalized.contains(t)) {
        vec![MineralComposition::fallback(
            "clay_default",
            "粘土鉱物",
            "Clay minerals",
            0.8,
        )]
    } else if LIMESTONE_TOKENS.iter().any(|t| normalized.contains(t)) {
        vec![MineralComposition::fallback(
            "calcite_default",
            "方解石",
            "Calcite",
            0.9,
        )]
    } else {
        vec![MineralComposition::fallback(
            "mixed_default",
            "混合鉱物",
            "Mixed minerals",
            1.0,
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mineral(id: &str, percentage: f32) -> MineralComposition {
        MineralComposition {
            id: id.into(),
            name: id.into(),
            name_en: None,
            name_ja: None,
            percentage,
            properties: MineralProperties::default(),
        }
    }

    fn test_table() -> MineralLookupTable {
        MineralLookupTable::from_records(vec![
            LayerRecord {
                id: "aobayama".into(),
                name: "青葉山層".into(),
                name_en: Some("Aobayama Formation".into()),
                name_ja: Some("あおばやまそう".into()),
                minerals: vec![mineral("quartz_001", 0.45), mineral("feldspar_001", 0.3)],
            },
            LayerRecord {
                id: "tatsunokuchi".into(),
                name: "竜の口層".into(),
                name_en: Some("Tatsunokuchi Formation".into()),
                name_ja: None,
                minerals: vec![mineral("calcite_001", 0.5)],
            },
        ])
    }

    #[test]
    fn test_normalize_label() {
        assert_eq!(normalize_label("  Aobayama   Formation "), "aobayama");
        assert_eq!(normalize_label("Sandstone Layer"), "sandstone");
        assert_eq!(normalize_label("青葉山層"), "青葉山");
        assert_eq!(normalize_label("  MIXED  case  "), "mixed case");
        assert_eq!(normalize_label(""), "");
    }

    #[test]
    fn test_exact_variant_match() {
        let table = test_table();
        // Any declared variant, case-insensitive
        assert_eq!(table.lookup("青葉山層")[0].id, "quartz_001");
        assert_eq!(table.lookup("aobayama formation")[0].id, "quartz_001");
        assert_eq!(table.lookup("あおばやまそう")[0].id, "quartz_001");
    }

    #[test]
    fn test_normalized_match() {
        let table = test_table();
        // Suffix-stripped alias hits tier 2
        assert_eq!(table.lookup("Aobayama")[0].id, "quartz_001");
        assert_eq!(table.lookup("青葉山")[0].id, "quartz_001");
        // Whitespace-free alias
        assert_eq!(table.lookup("AobayamaFormation")[0].id, "quartz_001");
    }

    #[test]
    fn test_substring_match() {
        let table = test_table();
        let minerals = table.lookup("upper aobayama member");
        assert_eq!(minerals[0].id, "quartz_001");
    }

    #[test]
    fn test_first_match_wins_across_tiers() {
        // A label that exactly matches record B but also contains record
        // A's name as a substring must resolve to B (tier 1 beats tier 3).
        let table = MineralLookupTable::from_records(vec![
            LayerRecord {
                id: "a".into(),
                name: "green".into(),
                name_en: None,
                name_ja: None,
                minerals: vec![mineral("m_a", 1.0)],
            },
            LayerRecord {
                id: "b".into(),
                name: "greenstone belt".into(),
                name_en: None,
                name_ja: None,
                minerals: vec![mineral("m_b", 1.0)],
            },
        ]);
        assert_eq!(table.lookup("greenstone belt")[0].id, "m_b");
        // Substring-only label falls to the first containing record
        assert_eq!(table.lookup("pale green unit")[0].id, "m_a");
    }

    #[test]
    fn test_empty_label_returns_empty() {
        let table = test_table();
        assert!(table.lookup("").is_empty());
        assert!(table.lookup("   ").is_empty());
    }

    #[test]
    fn test_unknown_label_fallback_bucket() {
        let table = test_table();
        let minerals = table.lookup("totally-unknown-layer-xyz");
        assert_eq!(minerals.len(), 1);
        assert_eq!(minerals[0].id, "mixed_default");
        assert_eq!(minerals[0].percentage, 1.0);
    }

    #[test]
    fn test_keyword_buckets() {
        let table = MineralLookupTable::empty();
        assert_eq!(table.lookup("coarse sandstone")[0].id, "quartz_default");
        assert_eq!(table.lookup("coarse sandstone")[0].percentage, 0.7);
        assert_eq!(table.lookup("mudstone bed")[0].id, "clay_default");
        assert_eq!(table.lookup("mudstone bed")[0].percentage, 0.8);
        assert_eq!(table.lookup("gray limestone")[0].id, "calcite_default");
        assert_eq!(table.lookup("gray limestone")[0].percentage, 0.9);
        assert_eq!(table.lookup("砂岩")[0].id, "quartz_default");
        assert_eq!(table.lookup("泥岩")[0].id, "clay_default");
        assert_eq!(table.lookup("石灰岩")[0].id, "calcite_default");
    }

    #[test]
    fn test_empty_table_degrades_to_fallback() {
        let table = MineralLookupTable::empty();
        assert!(table.is_empty());
        let minerals = table.lookup("Aobayama Formation");
        assert_eq!(minerals.len(), 1);
        assert_eq!(minerals[0].id, "mixed_default");
    }

    #[test]
    fn test_known_layers_and_membership() {
        let table = test_table();
        assert_eq!(table.known_layers(), vec!["青葉山層", "竜の口層"]);
        assert!(table.contains_layer("aobayama"));
        assert!(!table.contains_layer("totally-unknown-layer-xyz"));
        assert!(!table.contains_layer(""));
    }
}
