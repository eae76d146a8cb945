pub mod export_csv;
pub mod export_error;
pub mod export_xlsx;
pub mod rows;

#[cfg(test)]
pub use export_csv::deals_to_csv_string;
pub use export_csv::save_deals_csv;
pub use export_error::ExportError;
pub use export_xlsx::export_deals_xlsx;
pub use rows::{Cell, DealRow};
