use serde::{Deserialize, Deserializer};
use serde_json::Value;

// Page envelope
//  ├── value[]            listing records
//  ├── @odata.nextLink    continuation link, absent on the last page
//  └── @odata.count       total matches, only when the query asks for it

#[derive(Debug, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub value: Vec<RawListing>,
    #[serde(rename = "@odata.nextLink", default)]
    pub next_link: Option<String>,
    #[serde(rename = "@odata.count", default)]
    pub count: Option<u64>,
}

/// One catalog record, as loose as the catalog sends it.
/// Numeric fields accept numbers or numeric strings; anything else reads as absent.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct RawListing {
    #[serde(default, deserialize_with = "lenient_text")]
    pub listing_key: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub mls_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub list_price: Option<f64>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub street_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub street_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub unit_number: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub city: Option<String>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub longitude: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub latitude: Option<f64>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub lot_size_area: Option<f64>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub lot_size_units: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub lot_size_square_feet: Option<f64>,

    #[serde(default, deserialize_with = "lenient_text")]
    pub property_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub property_sub_type: Option<String>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub association_fee: Option<f64>,
    #[serde(rename = "AssociationYN", default, deserialize_with = "lenient_flag")]
    pub association_yn: Option<bool>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub association_name: Option<String>,

    #[serde(default, deserialize_with = "lenient_number")]
    pub days_on_market: Option<f64>,

    // Income-property facts
    #[serde(default, deserialize_with = "lenient_number")]
    pub number_of_units_total: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub year_built: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub building_area_total: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub bedrooms_total: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    pub parking_total: Option<f64>,
}

fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(number_from_value(&value))
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(text_from_value(&value))
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => Some(b),
        Value::String(s) => Some(matches!(
            s.trim().to_ascii_uppercase().as_str(),
            "Y" | "YES" | "TRUE"
        )),
        _ => None,
    })
}

pub(crate) fn number_from_value(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    n.filter(|n| n.is_finite())
}

pub(crate) fn text_from_value(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => match (n.as_i64(), n.as_f64()) {
            (Some(i), _) => Some(i.to_string()),
            (None, Some(f)) if f.fract() == 0.0 && f.is_finite() => Some(format!("{f:.0}")),
            (None, Some(f)) => Some(f.to_string()),
            _ => None,
        },
        _ => None,
    }
}
