pub mod communities;
pub mod drops;
pub mod listing;
pub mod metrics;
pub mod normalize;
pub mod policy;
pub mod rank;
pub mod zoning;

pub use communities::Communities;
pub use drops::{DropCounts, DropReason};
pub use listing::{ApartmentDeal, DevelopmentDeal, NormalizedListing};
pub use policy::{ApartmentPolicy, DevelopmentPolicy, RetrofitRule};
pub use rank::{Ranking, MAX_RANKED_ROWS};
pub use zoning::DensityTable;
