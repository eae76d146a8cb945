// src/domain/zoning.rs

use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Base code for a missing or blank label.
pub const NO_ZONING: &str = "NOZONING";

/// Minimum land per unit for codes the table does not know.
pub const DEFAULT_MIN_LAND_PER_UNIT: u32 = 1000;

// Overlays "(Q)", notes "[T]", anything after '-' or '/', and all whitespace.
// `(?s)` so a newline inside an overlay cannot survive the first pass.
fn label_noise() -> &'static Regex {
    static NOISE: OnceLock<Regex> = OnceLock::new();
    NOISE.get_or_init(|| {
        Regex::new(r"(?s)\(.*?\)|\[.*?\]|-.*|/.*|\s+").expect("zone label pattern is valid")
    })
}

/// Reduces a free-text zoning label to its base zone code.
///
/// `"(Q)C2-1VL"` becomes `"C2"`, `"R3+C1"` becomes `"R3"`. Missing, blank, or
/// fully-stripped labels become [`NO_ZONING`]. Applying it to its own output
/// returns the same code.
pub fn classify(label: Option<&str>) -> String {
    let Some(label) = label.filter(|l| !l.trim().is_empty()) else {
        return NO_ZONING.to_string();
    };

    let stripped = label_noise().replace_all(label, "");
    let base = stripped
        .split(['-', '+'])
        .next()
        .unwrap_or_default()
        .to_uppercase();

    if base.is_empty() {
        NO_ZONING.to_string()
    } else {
        base
    }
}

/// Base zone code to minimum land area (sqft) per buildable unit.
/// The numbers are policy handed in by the caller; this type only looks them up.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityTable {
    entries: HashMap<String, u32>,
    default: u32,
}

impl DensityTable {
    pub fn from_entries<I, S>(entries: I, default: u32) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(code, sqft)| (code.into().to_uppercase(), sqft))
                .collect(),
            default,
        }
    }

    /// Unknown codes, `NOZONING` included, fall back to the default.
    pub fn min_land_per_unit(&self, base_code: &str) -> u32 {
        self.entries.get(base_code).copied().unwrap_or(self.default)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl Default for DensityTable {
    /// City of Los Angeles base zones.
    fn default() -> Self {
        Self::from_entries(
            [
                // Agricultural and estate
                ("A1", 108_900),
                ("A2", 43_560),
                ("RA", 17_500),
                ("RE9", 9_000),
                ("RE11", 11_000),
                ("RE15", 15_000),
                ("RE20", 20_000),
                ("RE40", 40_000),
                // Residential
                ("R1", 5_000),
                ("RS", 7_500),
                ("R2", 2_500),
                ("RD1.5", 1_500),
                ("RD2", 2_000),
                ("RD3", 3_000),
                ("RD4", 4_000),
                ("RD5", 5_000),
                ("RD6", 6_000),
                ("RMP", 20_000),
                ("RW2", 1_150),
                ("RAS3", 800),
                ("R3", 800),
                ("R4", 400),
                ("R5", 200),
                // Commercial and industrial
                ("CR", 400),
                ("C1", 800),
                ("C2", 400),
                ("C4", 400),
                ("C5", 400),
                ("CM", 800),
                ("MR1", 400),
                ("M1", 400),
                ("MR2", 200),
                ("M2", 200),
                ("PB", 1),
            ],
            DEFAULT_MIN_LAND_PER_UNIT,
        )
    }
}
