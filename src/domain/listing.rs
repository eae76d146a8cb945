// src/domain/listing.rs

/// A listing that passed the normalization boundary.
/// Every field here has been validated once; downstream stages do not re-check it.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedListing {
    /// `ListingKey`, or empty when the catalog omitted it.
    pub id: String,
    pub status: Option<String>,
    /// Always positive.
    pub price: f64,
    /// Street number, street name and city joined by single spaces.
    pub address: String,
    pub city: Option<String>,
    /// Always a finite WGS84 pair.
    pub longitude: f64,
    pub latitude: f64,
    /// Present and above the minimum lot size for development listings.
    pub lot_area_sqft: Option<f64>,
    pub property_type: Option<String>,
    pub property_subtype: Option<String>,
    pub association: Association,
    pub days_on_market: Option<u32>,
    /// Only set for income properties.
    pub income: Option<IncomeFacts>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Association {
    pub fee: Option<f64>,
    pub member: Option<bool>,
    pub name: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IncomeFacts {
    pub units_total: f64,
    pub building_area_sqft: f64,
    pub bedrooms: f64,
    pub parking: f64,
    pub year_built: i32,
}

/// A land/development parcel with its zoning and unit estimate.
#[derive(Debug, Clone, PartialEq)]
pub struct DevelopmentDeal {
    pub listing: NormalizedListing,
    pub zoning_label: Option<String>,
    pub base_zone_code: String,
    pub min_land_per_unit: u32,
    pub max_units: u64,
    pub price_per_unit: u64,
}

/// An income property scored against its distance to the coast.
#[derive(Debug, Clone, PartialEq)]
pub struct ApartmentDeal {
    pub listing: NormalizedListing,
    pub units_total: f64,
    pub distance_to_coast_m: f64,
    pub near_coast: bool,
    pub price_per_unit: u64,
    pub max_allowed_price_per_unit: u64,
}
