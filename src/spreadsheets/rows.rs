// src/spreadsheets/rows.rs
use crate::domain::metrics::display_thousands;
use crate::domain::{ApartmentDeal, DevelopmentDeal};

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
    Empty,
}

impl Cell {
    /// Text form for delimited output. Whole numbers print without a fraction.
    pub fn render(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) if n.fract() == 0.0 => format!("{n:.0}"),
            Cell::Number(n) => format!("{n:.1}"),
            Cell::Empty => String::new(),
        }
    }
}

/// A ranked deal as a row of output cells.
pub trait DealRow {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<Cell>;
}

impl DealRow for DevelopmentDeal {
    fn headers() -> &'static [&'static str] {
        &[
            "Address",
            "Purchase Price",
            "Potential Units",
            "Price per Unit",
            "Days on Market",
            "Zoning",
            "Min Sqft/Unit",
            "Base Zone",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.listing.address.clone()),
            Cell::Number(self.listing.price),
            Cell::Number(self.max_units as f64),
            Cell::Text(display_thousands(self.price_per_unit)),
            self.listing
                .days_on_market
                .map_or(Cell::Empty, |d| Cell::Number(d as f64)),
            self.zoning_label.clone().map_or(Cell::Empty, Cell::Text),
            Cell::Number(self.min_land_per_unit as f64),
            Cell::Text(self.base_zone_code.clone()),
        ]
    }
}

impl DealRow for ApartmentDeal {
    fn headers() -> &'static [&'static str] {
        &[
            "Address",
            "Price per Unit",
            "Purchase Price",
            "Distance to Coast (m)",
        ]
    }

    fn cells(&self) -> Vec<Cell> {
        vec![
            Cell::Text(self.listing.address.clone()),
            Cell::Text(display_thousands(self.price_per_unit)),
            Cell::Number(self.listing.price),
            Cell::Number((self.distance_to_coast_m * 10.0).round() / 10.0),
        ]
    }
}
