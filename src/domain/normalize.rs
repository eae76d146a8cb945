// src/domain/normalize.rs

use crate::domain::communities::Communities;
use crate::domain::drops::{DropCounts, DropReason};
use crate::domain::listing::{Association, IncomeFacts, NormalizedListing};
use crate::domain::policy::{ApartmentPolicy, DevelopmentPolicy, RetrofitRule};
use crate::source::RawListing;

pub const SQFT_PER_ACRE: f64 = 43_560.0;

/// Street number, street name and city, single-spaced. Missing or blank parts
/// are skipped.
pub fn build_address(raw: &RawListing) -> String {
    [&raw.street_number, &raw.street_name, &raw.city]
        .into_iter()
        .flatten()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lot area in square feet.
///
/// An area with a unit label wins (acres are converted); otherwise the
/// catalog's own square-footage field is used.
pub fn lot_area_sqft(raw: &RawListing) -> Option<f64> {
    let unit = raw
        .lot_size_units
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty());

    match (raw.lot_size_area, unit) {
        (Some(area), Some(unit)) if unit.to_lowercase().contains("acre") => {
            Some(area * SQFT_PER_ACRE)
        }
        (Some(area), Some(_)) => Some(area),
        _ => raw.lot_size_square_feet,
    }
}

fn location(raw: &RawListing) -> Option<(f64, f64)> {
    let lon = raw.longitude.filter(|x| (-180.0..=180.0).contains(x))?;
    let lat = raw.latitude.filter(|y| (-90.0..=90.0).contains(y))?;
    Some((lon, lat))
}

fn non_blank(s: &Option<String>) -> bool {
    s.as_deref().is_some_and(|s| !s.trim().is_empty())
}

fn base_listing(
    raw: RawListing,
    price: f64,
    (longitude, latitude): (f64, f64),
) -> NormalizedListing {
    NormalizedListing {
        id: raw.listing_key.clone().unwrap_or_default(),
        address: build_address(&raw),
        lot_area_sqft: None,
        status: raw.mls_status,
        price,
        city: raw.city,
        longitude,
        latitude,
        property_type: raw.property_type,
        property_subtype: raw.property_sub_type,
        association: Association {
            fee: raw.association_fee,
            member: raw.association_yn,
            name: raw.association_name,
        },
        days_on_market: raw
            .days_on_market
            .filter(|d| *d >= 0.0)
            .map(|d| d.round() as u32),
        income: None,
    }
}

/// Cleans development candidates: no condos or apartments, no sub-units, no
/// association, and a resolvable lot above the minimum size.
pub fn normalize_development(
    raws: Vec<RawListing>,
    policy: &DevelopmentPolicy,
    drops: &mut DropCounts,
) -> Vec<NormalizedListing> {
    let excluded = |value: &Option<String>, set: &[String]| {
        value.as_ref().is_some_and(|v| set.iter().any(|s| s == v))
    };

    let mut out = Vec::with_capacity(raws.len());

    for raw in raws {
        let reason = if excluded(&raw.property_type, &policy.excluded_types)
            || excluded(&raw.property_sub_type, &policy.excluded_subtypes)
        {
            Some(DropReason::ExcludedType)
        } else if non_blank(&raw.unit_number) {
            Some(DropReason::SubUnit)
        } else if raw.association_fee.is_some_and(|fee| fee > 0.0)
            || raw.association_yn == Some(true)
            || non_blank(&raw.association_name)
        {
            Some(DropReason::Association)
        } else {
            None
        };

        if let Some(reason) = reason {
            drops.record(reason);
            continue;
        }

        let Some(price) = raw.list_price else {
            drops.record(DropReason::MissingPrice);
            continue;
        };
        let Some(point) = location(&raw) else {
            drops.record(DropReason::MissingLocation);
            continue;
        };
        let Some(lot) = lot_area_sqft(&raw) else {
            drops.record(DropReason::MissingLotArea);
            continue;
        };
        if lot <= policy.min_lot_sqft {
            drops.record(DropReason::LotTooSmall);
            continue;
        }
        if price <= 0.0 || price <= policy.min_list_price {
            drops.record(DropReason::BelowMinPrice);
            continue;
        }

        let mut listing = base_listing(raw, price, point);
        listing.lot_area_sqft = Some(lot);
        out.push(listing);
    }

    out
}

/// Cleans income properties: complete building facts, a sane unit count, and
/// enough building, bedrooms and parking for the units claimed.
pub fn normalize_apartment(
    raws: Vec<RawListing>,
    policy: &ApartmentPolicy,
    communities: &Communities,
    drops: &mut DropCounts,
) -> Vec<NormalizedListing> {
    let mut out = Vec::with_capacity(raws.len());

    for raw in raws {
        let Some(price) = raw.list_price else {
            drops.record(DropReason::MissingPrice);
            continue;
        };
        let Some(point) = location(&raw) else {
            drops.record(DropReason::MissingLocation);
            continue;
        };
        let (Some(units), Some(area), Some(bedrooms), Some(parking), Some(year)) = (
            raw.number_of_units_total,
            raw.building_area_total,
            raw.bedrooms_total,
            raw.parking_total,
            raw.year_built,
        ) else {
            drops.record(DropReason::MissingBuildingFacts);
            continue;
        };

        if units < policy.min_units || units > policy.max_units {
            drops.record(DropReason::UnitCountOutOfRange);
            continue;
        }
        if price <= 0.0 {
            drops.record(DropReason::BelowMinPrice);
            continue;
        }

        let year_built = year.round() as i32;
        if !passes_retrofit_rule(policy, communities, raw.city.as_deref(), year_built) {
            drops.record(DropReason::RetrofitRule);
            continue;
        }

        if area < units * policy.min_building_sqft_per_unit {
            drops.record(DropReason::Undersized);
            continue;
        }
        if bedrooms > units * policy.max_bedrooms_per_unit {
            drops.record(DropReason::TooManyBedrooms);
            continue;
        }
        if parking < units * policy.min_parking_per_unit {
            drops.record(DropReason::InsufficientParking);
            continue;
        }

        let mut listing = base_listing(raw, price, point);
        listing.income = Some(IncomeFacts {
            units_total: units,
            building_area_sqft: area,
            bedrooms,
            parking,
            year_built,
        });
        out.push(listing);
    }

    out
}

fn passes_retrofit_rule(
    policy: &ApartmentPolicy,
    communities: &Communities,
    city: Option<&str>,
    year_built: i32,
) -> bool {
    let in_community = communities.contains(city);
    let older = year_built < policy.retrofit_cutoff_year;

    match policy.retrofit_rule {
        RetrofitRule::Literal => !in_community && older,
        RetrofitRule::ExcludeOlderInCommunities => !(in_community && older),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn land(key: &str) -> RawListing {
        RawListing {
            listing_key: Some(key.into()),
            list_price: Some(500_000.0),
            street_number: Some("123".into()),
            street_name: Some("Main St".into()),
            city: Some("Los Angeles".into()),
            longitude: Some(-118.3),
            latitude: Some(34.05),
            lot_size_square_feet: Some(10_000.0),
            ..Default::default()
        }
    }

    fn income(key: &str) -> RawListing {
        RawListing {
            listing_key: Some(key.into()),
            list_price: Some(1_200_000.0),
            city: Some("Long Beach".into()),
            longitude: Some(-118.19),
            latitude: Some(33.77),
            number_of_units_total: Some(4.0),
            building_area_total: Some(4_400.0),
            bedrooms_total: Some(6.0),
            parking_total: Some(4.0),
            year_built: Some(1962.0),
            ..Default::default()
        }
    }

    #[test]
    fn address_skips_missing_and_blank_parts() {
        let mut raw = land("a");
        assert_eq!(build_address(&raw), "123 Main St Los Angeles");

        raw.street_number = Some("  ".into());
        raw.city = None;
        assert_eq!(build_address(&raw), "Main St");
    }

    #[test]
    fn one_acre_is_43560_sqft() {
        let raw = RawListing {
            lot_size_area: Some(1.0),
            lot_size_units: Some("Acres".into()),
            lot_size_square_feet: Some(999.0),
            ..Default::default()
        };
        assert_eq!(lot_area_sqft(&raw), Some(43_560.0));
    }

    #[test]
    fn lot_area_falls_back_to_square_feet_field() {
        let with_unit = RawListing {
            lot_size_area: Some(7_500.0),
            lot_size_units: Some("Square Feet".into()),
            ..Default::default()
        };
        let without_unit = RawListing {
            lot_size_area: Some(2.0),
            lot_size_square_feet: Some(6_000.0),
            ..Default::default()
        };

        assert_eq!(lot_area_sqft(&with_unit), Some(7_500.0));
        assert_eq!(lot_area_sqft(&without_unit), Some(6_000.0));
        assert_eq!(lot_area_sqft(&RawListing::default()), None);
    }

    #[test]
    fn development_drops_are_counted_by_reason() {
        let mut condo = land("condo");
        condo.property_sub_type = Some("Condominium".into());
        let mut unit = land("unit");
        unit.unit_number = Some("4B".into());
        let mut hoa = land("hoa");
        hoa.association_yn = Some(true);
        let mut hoa_fee = land("fee");
        hoa_fee.association_fee = Some(125.0);
        let mut tiny = land("tiny");
        tiny.lot_size_square_feet = Some(100.0);
        let mut cheap = land("cheap");
        cheap.list_price = Some(40_000.0);
        let mut nowhere = land("nowhere");
        nowhere.latitude = None;

        let raws = vec![land("ok"), condo, unit, hoa, hoa_fee, tiny, cheap, nowhere];
        let mut drops = DropCounts::default();
        let out = normalize_development(raws, &DevelopmentPolicy::default(), &mut drops);

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].id, "ok");
        assert_eq!(out[0].lot_area_sqft, Some(10_000.0));
        assert_eq!(drops.get(DropReason::ExcludedType), 1);
        assert_eq!(drops.get(DropReason::SubUnit), 1);
        assert_eq!(drops.get(DropReason::Association), 2);
        assert_eq!(drops.get(DropReason::LotTooSmall), 1);
        assert_eq!(drops.get(DropReason::BelowMinPrice), 1);
        assert_eq!(drops.get(DropReason::MissingLocation), 1);
        assert_eq!(drops.total(), 7);
    }

    #[test]
    fn zero_fee_and_blank_association_name_are_allowed() {
        let mut raw = land("ok");
        raw.association_fee = Some(0.0);
        raw.association_yn = Some(false);
        raw.association_name = Some("".into());

        let mut drops = DropCounts::default();
        let out = normalize_development(vec![raw], &DevelopmentPolicy::default(), &mut drops);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn apartment_building_checks() {
        let mut small = income("small");
        small.building_area_total = Some(3_999.0);
        let mut bedrooms = income("beds");
        bedrooms.bedrooms_total = Some(9.0);
        let mut parking = income("park");
        parking.parking_total = Some(3.0);
        let mut single = income("single");
        single.number_of_units_total = Some(1.0);
        let mut unknown_year = income("year");
        unknown_year.year_built = None;

        let raws = vec![income("ok"), small, bedrooms, parking, single, unknown_year];
        let mut drops = DropCounts::default();
        let out = normalize_apartment(
            raws,
            &ApartmentPolicy::default(),
            &Communities::embedded(),
            &mut drops,
        );

        assert_eq!(out.len(), 1);
        assert_eq!(out[0].income.map(|f| f.units_total), Some(4.0));
        assert_eq!(drops.get(DropReason::Undersized), 1);
        assert_eq!(drops.get(DropReason::TooManyBedrooms), 1);
        assert_eq!(drops.get(DropReason::InsufficientParking), 1);
        assert_eq!(drops.get(DropReason::UnitCountOutOfRange), 1);
        assert_eq!(drops.get(DropReason::MissingBuildingFacts), 1);
    }

    #[test]
    fn literal_retrofit_rule_keeps_only_older_non_community_buildings() {
        let policy = ApartmentPolicy::default();
        let communities = Communities::from_lines("venice");

        let mut newer = income("newer");
        newer.year_built = Some(1990.0);
        let mut older_in_community = income("venice-old");
        older_in_community.city = Some("Venice".into());

        let mut drops = DropCounts::default();
        let out = normalize_apartment(
            vec![income("older"), newer, older_in_community],
            &policy,
            &communities,
            &mut drops,
        );

        let ids: Vec<_> = out.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["older"]);
        assert_eq!(drops.get(DropReason::RetrofitRule), 2);
    }

    #[test]
    fn community_retrofit_rule_drops_only_older_community_buildings() {
        let policy = ApartmentPolicy {
            retrofit_rule: RetrofitRule::ExcludeOlderInCommunities,
            ..ApartmentPolicy::default()
        };
        let communities = Communities::from_lines("venice");

        let mut newer = income("newer");
        newer.year_built = Some(1990.0);
        let mut older_in_community = income("venice-old");
        older_in_community.city = Some("Venice".into());

        let mut drops = DropCounts::default();
        let out = normalize_apartment(
            vec![income("older"), newer, older_in_community],
            &policy,
            &communities,
            &mut drops,
        );

        let ids: Vec<_> = out.iter().map(|l| l.id.as_str()).collect();
        assert_eq!(ids, vec!["older", "newer"]);
        assert_eq!(drops.get(DropReason::RetrofitRule), 1);
    }
}
