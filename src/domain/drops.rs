// src/domain/drops.rs

use std::collections::BTreeMap;
use std::fmt;

/// Why a record left the pipeline early. Drops are counted, never raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DropReason {
    ExcludedType,
    SubUnit,
    Association,
    MissingPrice,
    BelowMinPrice,
    MissingLocation,
    MissingLotArea,
    LotTooSmall,
    UnitCountOutOfRange,
    MissingBuildingFacts,
    RetrofitRule,
    Undersized,
    TooManyBedrooms,
    InsufficientParking,
    NoZone,
    NoUnitEstimate,
    BelowMinPricePerUnit,
    AboveCap,
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            DropReason::ExcludedType => "excluded property type",
            DropReason::SubUnit => "has a unit number",
            DropReason::Association => "has an association",
            DropReason::MissingPrice => "no price",
            DropReason::BelowMinPrice => "price below minimum",
            DropReason::MissingLocation => "no usable location",
            DropReason::MissingLotArea => "no lot area",
            DropReason::LotTooSmall => "lot too small",
            DropReason::UnitCountOutOfRange => "unit count out of range",
            DropReason::MissingBuildingFacts => "missing building facts",
            DropReason::RetrofitRule => "pre-1978 community rule",
            DropReason::Undersized => "building too small for unit count",
            DropReason::TooManyBedrooms => "too many bedrooms per unit",
            DropReason::InsufficientParking => "not enough parking",
            DropReason::NoZone => "outside every zoning polygon",
            DropReason::NoUnitEstimate => "no unit estimate",
            DropReason::BelowMinPricePerUnit => "price per unit below minimum",
            DropReason::AboveCap => "price per unit above cap",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DropCounts(BTreeMap<DropReason, usize>);

impl DropCounts {
    pub fn record(&mut self, reason: DropReason) {
        *self.0.entry(reason).or_default() += 1;
    }

    #[cfg(test)]
    pub fn get(&self, reason: DropReason) -> usize {
        self.0.get(&reason).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (DropReason, usize)> + '_ {
        self.0.iter().map(|(r, n)| (*r, *n))
    }
}
