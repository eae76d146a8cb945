// src/domain/metrics.rs

use crate::domain::drops::{DropCounts, DropReason};
use crate::domain::listing::{ApartmentDeal, DevelopmentDeal, NormalizedListing};
use crate::domain::policy::ApartmentPolicy;
use crate::domain::zoning::{classify, DensityTable};

/// `ceil(lot / density)`. `None` when the density is zero or the lot is not
/// positive, which means there is no unit estimate.
pub fn max_units(lot_area_sqft: f64, min_land_per_unit: u32) -> Option<u64> {
    if min_land_per_unit == 0 || !(lot_area_sqft > 0.0) {
        return None;
    }
    Some((lot_area_sqft / min_land_per_unit as f64).ceil() as u64)
}

/// Price divided by units, rounded half to even. Zero when there are no units.
pub fn price_per_unit(price: f64, units: f64) -> u64 {
    if !(units > 0.0) || !(price > 0.0) {
        return 0;
    }
    (price / units).round_ties_even() as u64
}

/// `(near_coast, cap)`. The threshold itself counts as near the coast.
pub fn price_cap(distance_m: f64, policy: &ApartmentPolicy) -> (bool, u64) {
    if distance_m <= policy.near_coast_m {
        (true, policy.near_coast_cap)
    } else {
        (false, policy.inland_cap)
    }
}

/// Display form: `253_400` becomes `"253k"`. Never used for filtering.
pub fn display_thousands(price_per_unit: u64) -> String {
    let k = (price_per_unit as f64 / 1000.0).round_ties_even() as u64;
    format!("{k}k")
}

/// Classifies the zoning label, estimates units, and prices them.
pub fn derive_development(
    listing: NormalizedListing,
    zoning_label: Option<String>,
    densities: &DensityTable,
    drops: &mut DropCounts,
) -> Option<DevelopmentDeal> {
    let base_zone_code = classify(zoning_label.as_deref());
    let min_land_per_unit = densities.min_land_per_unit(&base_zone_code);

    let Some(units) = listing
        .lot_area_sqft
        .and_then(|lot| max_units(lot, min_land_per_unit))
    else {
        drops.record(DropReason::NoUnitEstimate);
        return None;
    };

    Some(DevelopmentDeal {
        price_per_unit: price_per_unit(listing.price, units as f64),
        listing,
        zoning_label,
        base_zone_code,
        min_land_per_unit,
        max_units: units,
    })
}

/// Prices an income property per declared unit and attaches its coastal cap.
pub fn derive_apartment(
    listing: NormalizedListing,
    distance_to_coast_m: f64,
    policy: &ApartmentPolicy,
    drops: &mut DropCounts,
) -> Option<ApartmentDeal> {
    let Some(units_total) = listing.income.map(|f| f.units_total).filter(|u| *u > 0.0) else {
        drops.record(DropReason::NoUnitEstimate);
        return None;
    };

    let (near_coast, cap) = price_cap(distance_to_coast_m, policy);

    Some(ApartmentDeal {
        price_per_unit: price_per_unit(listing.price, units_total),
        listing,
        units_total,
        distance_to_coast_m,
        near_coast,
        max_allowed_price_per_unit: cap,
    })
}
