mod client;
mod models;
mod query;
mod source_error;

pub use client::{Credentials, ListingSource, SourceSettings};
pub use models::{Page, RawListing};
pub use query::ListingQuery;
pub use source_error::SourceError;
