use crate::source::SourceError;
use url::Url;

const DEVELOPMENT_FIELDS: &[&str] = &[
    "ListingKey",
    "MlsStatus",
    "ListPrice",
    "StreetNumber",
    "StreetName",
    "UnitNumber",
    "City",
    "Longitude",
    "Latitude",
    "LotSizeArea",
    "LotSizeUnits",
    "LotSizeSquareFeet",
    "PropertyType",
    "PropertySubType",
    "AssociationFee",
    "AssociationYN",
    "AssociationName",
    "DaysOnMarket",
];

const DEVELOPMENT_FILTER: &str = "MlsStatus eq 'Active' and ListPrice gt 50000 \
and Longitude ne null and Latitude ne null and LotSizeSquareFeet gt 100";

const APARTMENT_FIELDS: &[&str] = &[
    "ListingKey",
    "MlsStatus",
    "ListPrice",
    "StreetNumber",
    "StreetName",
    "UnitNumber",
    "City",
    "Longitude",
    "Latitude",
    "DaysOnMarket",
    "PropertyType",
    "PropertySubType",
    "NumberOfUnitsTotal",
    "YearBuilt",
    "BuildingAreaTotal",
    "BedroomsTotal",
    "ParkingTotal",
];

const APARTMENT_FILTER: &str = "MlsStatus eq 'Active' and PropertyType eq 'ResidentialIncome' \
and NumberOfUnitsTotal ge 2 and Longitude ne null and Latitude ne null \
and Latitude ge 32 and Latitude le 35";

/// An OData query against the `Property` resource.
#[derive(Debug, Clone, PartialEq)]
pub struct ListingQuery {
    pub select: Vec<String>,
    pub filter: String,
    pub top: u32,
    pub orderby: String,
}

impl ListingQuery {
    /// Active land/development candidates, cheapest first.
    pub fn development(top: u32) -> Self {
        Self::preset(DEVELOPMENT_FIELDS, DEVELOPMENT_FILTER, top)
    }

    /// Active income properties with two or more units inside the service latitudes.
    pub fn apartment(top: u32) -> Self {
        Self::preset(APARTMENT_FIELDS, APARTMENT_FILTER, top)
    }

    fn preset(fields: &[&str], filter: &str, top: u32) -> Self {
        Self {
            select: fields.iter().map(|f| f.to_string()).collect(),
            filter: filter.to_string(),
            top,
            orderby: "ListPrice asc".to_string(),
        }
    }

    /// First-page URL: `{api_base}/Property?$select=..&$filter=..&$top=..&$orderby=..`
    pub fn to_url(&self, api_base: &str) -> Result<Url, SourceError> {
        let mut url = Url::parse(&format!("{}/Property", api_base.trim_end_matches('/')))?;
        url.query_pairs_mut()
            .append_pair("$select", &self.select.join(","))
            .append_pair("$filter", &self.filter)
            .append_pair("$top", &self.top.to_string())
            .append_pair("$orderby", &self.orderby);
        Ok(url)
    }
}
