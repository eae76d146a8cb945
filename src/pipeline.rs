// pipeline.rs
use crate::domain::metrics::{derive_apartment, derive_development};
use crate::domain::normalize::{normalize_apartment, normalize_development};
use crate::domain::rank::{rank_apartments, rank_development};
use crate::domain::{
    ApartmentDeal, ApartmentPolicy, Communities, DensityTable, DevelopmentDeal, DevelopmentPolicy,
    DropCounts, Ranking, MAX_RANKED_ROWS,
};
use crate::errors::Result;
use crate::geos::{join_coastal_distance, join_zoning, ProjectedCoastline, ReferenceLayers, Utm};
use crate::progress::ProgressSink;
use crate::source::{ListingQuery, ListingSource, RawListing};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Variant {
    Development,
    Apartment,
}

impl Variant {
    pub fn label(&self) -> &'static str {
        match self {
            Variant::Development => "development",
            Variant::Apartment => "apartment",
        }
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a run's rows are. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Stage {
    Raw,
    Cleaned,
    Joined,
    Scored,
    Ranked,
}

/// What happened during one run: rows per stage and why rows were dropped.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub variant: Variant,
    pub stages: Vec<(Stage, usize)>,
    pub dropped: DropCounts,
    /// Rows that passed the final filter, before truncation.
    pub total_matches: usize,
}

impl RunReport {
    fn new(variant: Variant) -> Self {
        Self {
            variant,
            stages: Vec::new(),
            dropped: DropCounts::default(),
            total_matches: 0,
        }
    }

    fn advance(&mut self, stage: Stage, rows: usize) {
        debug_assert!(self.stages.last().map_or(true, |(last, _)| *last < stage));
        tracing::debug!(variant = %self.variant, stage = ?stage, rows, "stage complete");
        self.stages.push((stage, rows));
    }

    #[cfg(test)]
    pub fn rows_at(&self, stage: Stage) -> Option<usize> {
        self.stages.iter().find(|(s, _)| *s == stage).map(|(_, n)| *n)
    }

    fn log_drops(&self) {
        for (reason, count) in self.dropped.iter() {
            tracing::info!(
                variant = %self.variant,
                reason = %reason,
                dropped = count,
                "records excluded"
            );
        }
        tracing::info!(
            variant = %self.variant,
            dropped = self.dropped.total(),
            matches = self.total_matches,
            "run complete"
        );
    }
}

#[derive(Debug)]
pub struct PipelineOutput<T> {
    pub ranking: Ranking<T>,
    pub report: RunReport,
}

#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub page_size: u32,
    /// Requested row cap; never above [`MAX_RANKED_ROWS`].
    pub limit: usize,
    pub development: DevelopmentPolicy,
    pub apartment: ApartmentPolicy,
    pub densities: DensityTable,
    pub communities: Communities,
    pub utm: Utm,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            page_size: 200,
            limit: MAX_RANKED_ROWS,
            development: DevelopmentPolicy::default(),
            apartment: ApartmentPolicy::default(),
            densities: DensityTable::default(),
            communities: Communities::embedded(),
            utm: Utm::default(),
        }
    }
}

/// Fetch, clean, join, score and rank. Each run is all-or-nothing: any error
/// ends it and nothing computed so far is returned.
pub struct Pipeline {
    source: ListingSource,
    layers: Arc<ReferenceLayers>,
    settings: PipelineSettings,
}

impl Pipeline {
    pub fn new(
        source: ListingSource,
        layers: Arc<ReferenceLayers>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            source,
            layers,
            settings,
        }
    }

    pub fn settings(&self) -> &PipelineSettings {
        &self.settings
    }

    pub fn run_development(
        &self,
        progress: &mut dyn ProgressSink,
    ) -> Result<PipelineOutput<DevelopmentDeal>> {
        let s = &self.settings;
        let mut report = RunReport::new(Variant::Development);

        let zoning = self.layers.zoning()?;

        let raws = self.fetch(&ListingQuery::development(s.page_size), progress)?;
        report.advance(Stage::Raw, raws.len());

        let cleaned = normalize_development(raws, &s.development, &mut report.dropped);
        report.advance(Stage::Cleaned, cleaned.len());

        let joined = join_zoning(cleaned, &zoning, &mut report.dropped);
        report.advance(Stage::Joined, joined.len());

        let scored: Vec<DevelopmentDeal> = joined
            .into_iter()
            .filter_map(|(listing, label)| {
                derive_development(listing, label, &s.densities, &mut report.dropped)
            })
            .collect();
        report.advance(Stage::Scored, scored.len());

        let ranking = rank_development(scored, &s.development, s.limit, &mut report.dropped);
        report.total_matches = ranking.total_matches;
        report.advance(Stage::Ranked, ranking.rows.len());

        report.log_drops();
        Ok(PipelineOutput { ranking, report })
    }

    pub fn run_apartment(
        &self,
        progress: &mut dyn ProgressSink,
    ) -> Result<PipelineOutput<ApartmentDeal>> {
        let s = &self.settings;
        let mut report = RunReport::new(Variant::Apartment);

        let coastline = self.layers.coastline()?;
        let coast = ProjectedCoastline::new(&coastline, s.utm);

        let raws = self.fetch(&ListingQuery::apartment(s.page_size), progress)?;
        report.advance(Stage::Raw, raws.len());

        let cleaned = normalize_apartment(raws, &s.apartment, &s.communities, &mut report.dropped);
        report.advance(Stage::Cleaned, cleaned.len());

        let joined = join_coastal_distance(cleaned, &coast);
        report.advance(Stage::Joined, joined.len());

        let scored: Vec<ApartmentDeal> = joined
            .into_iter()
            .filter_map(|(listing, distance)| {
                derive_apartment(listing, distance, &s.apartment, &mut report.dropped)
            })
            .collect();
        report.advance(Stage::Scored, scored.len());

        let ranking = rank_apartments(scored, s.limit, &mut report.dropped);
        report.total_matches = ranking.total_matches;
        report.advance(Stage::Ranked, ranking.rows.len());

        report.log_drops();
        Ok(PipelineOutput { ranking, report })
    }

    /// Token first, then every page. A token is never reused across runs.
    fn fetch(
        &self,
        query: &ListingQuery,
        progress: &mut dyn ProgressSink,
    ) -> Result<Vec<RawListing>> {
        let token = self.source.request_token()?;
        Ok(self.source.fetch_all(&token, query, progress)?)
    }
}
