// src/domain/rank.rs

use crate::domain::drops::{DropCounts, DropReason};
use crate::domain::listing::{ApartmentDeal, DevelopmentDeal};
use crate::domain::policy::DevelopmentPolicy;

/// Hard ceiling on ranked output rows.
pub const MAX_RANKED_ROWS: usize = 750;

pub trait Ranked {
    fn price_per_unit(&self) -> u64;
}

impl Ranked for DevelopmentDeal {
    fn price_per_unit(&self) -> u64 {
        self.price_per_unit
    }
}

impl Ranked for ApartmentDeal {
    fn price_per_unit(&self) -> u64 {
        self.price_per_unit
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ranking<T> {
    /// Cheapest per unit first, at most the requested limit.
    pub rows: Vec<T>,
    /// How many rows passed the filter before truncation.
    pub total_matches: usize,
}

/// Keeps rows passing `keep`, sorts ascending by price per unit (ties keep
/// their arrival order) and truncates. `limit` is clamped to
/// [`MAX_RANKED_ROWS`].
pub fn rank<T, F>(
    scored: Vec<T>,
    keep: F,
    limit: usize,
    rejected: DropReason,
    drops: &mut DropCounts,
) -> Ranking<T>
where
    T: Ranked,
    F: Fn(&T) -> bool,
{
    let mut rows: Vec<T> = Vec::with_capacity(scored.len());
    for row in scored {
        if keep(&row) {
            rows.push(row);
        } else {
            drops.record(rejected);
        }
    }

    rows.sort_by_key(|r| r.price_per_unit());
    let total_matches = rows.len();
    rows.truncate(limit.min(MAX_RANKED_ROWS));

    Ranking { rows, total_matches }
}

pub fn rank_development(
    deals: Vec<DevelopmentDeal>,
    policy: &DevelopmentPolicy,
    limit: usize,
    drops: &mut DropCounts,
) -> Ranking<DevelopmentDeal> {
    let floor = policy.min_price_per_unit;
    rank(
        deals,
        |d| d.price_per_unit >= floor,
        limit,
        DropReason::BelowMinPricePerUnit,
        drops,
    )
}

pub fn rank_apartments(
    deals: Vec<ApartmentDeal>,
    limit: usize,
    drops: &mut DropCounts,
) -> Ranking<ApartmentDeal> {
    rank(
        deals,
        |d| d.price_per_unit <= d.max_allowed_price_per_unit,
        limit,
        DropReason::AboveCap,
        drops,
    )
}
