// src/domain/policy.rs

/// Thresholds for the land/development run.
#[derive(Debug, Clone, PartialEq)]
pub struct DevelopmentPolicy {
    /// Listings at or below this price never reach ranking.
    pub min_list_price: f64,
    /// Lots at or below this size (sqft) are dropped.
    pub min_lot_sqft: f64,
    pub excluded_types: Vec<String>,
    pub excluded_subtypes: Vec<String>,
    /// Ranked rows must cost at least this much per potential unit.
    pub min_price_per_unit: u64,
}

impl Default for DevelopmentPolicy {
    fn default() -> Self {
        Self {
            min_list_price: 50_000.0,
            min_lot_sqft: 100.0,
            excluded_types: strings(&["Apartment", "Condominium"]),
            excluded_subtypes: strings(&[
                "Apartment",
                "Condominium",
                "Condo",
                "Planned Development",
            ]),
            min_price_per_unit: 25_000,
        }
    }
}

/// How the pre-1978 community rule is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RetrofitRule {
    /// Keep a listing only when its city is not a known community and it was
    /// built before the cutoff year. This is the long-standing behavior.
    #[default]
    Literal,
    /// Drop listings in a known community built before the cutoff year.
    ExcludeOlderInCommunities,
}

impl std::str::FromStr for RetrofitRule {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "literal" => Ok(RetrofitRule::Literal),
            "exclude-older-in-communities" => Ok(RetrofitRule::ExcludeOlderInCommunities),
            other => Err(format!("unknown retrofit rule '{other}'")),
        }
    }
}

/// Thresholds for the income-property run.
#[derive(Debug, Clone, PartialEq)]
pub struct ApartmentPolicy {
    pub min_units: f64,
    pub max_units: f64,
    /// Building area required per unit (sqft).
    pub min_building_sqft_per_unit: f64,
    pub max_bedrooms_per_unit: f64,
    /// Parking spaces required per unit.
    pub min_parking_per_unit: f64,
    pub retrofit_cutoff_year: i32,
    pub retrofit_rule: RetrofitRule,
    /// Distance (m) at or under which a listing counts as near the coast.
    pub near_coast_m: f64,
    pub near_coast_cap: u64,
    pub inland_cap: u64,
}

impl Default for ApartmentPolicy {
    fn default() -> Self {
        Self {
            min_units: 2.0,
            max_units: 1000.0,
            min_building_sqft_per_unit: 1000.0,
            max_bedrooms_per_unit: 2.0,
            min_parking_per_unit: 1.0,
            retrofit_cutoff_year: 1978,
            retrofit_rule: RetrofitRule::Literal,
            near_coast_m: 804.672,
            near_coast_cap: 600_000,
            inland_cap: 500_000,
        }
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
