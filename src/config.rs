// config.rs
use crate::domain::{Communities, RetrofitRule};
use crate::geos::{LayerLocation, LayerSources, Utm};
use crate::pipeline::PipelineSettings;
use crate::source::{Credentials, SourceSettings};
use anyhow::{anyhow, Context};
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

const DEFAULT_TOKEN_URL: &str = "https://api.cotality.com/trestle/oidc/connect/token";
const DEFAULT_API_BASE: &str = "https://api.cotality.com/trestle/odata";

#[derive(Debug, Clone)]
pub struct Config {
    pub credentials: Credentials,
    pub token_url: String,
    pub api_base: String,
    pub zoning_source: String,
    pub zoning_label_property: String,
    pub coast_source: String,
    pub communities_file: Option<PathBuf>,
    pub layer_ttl_hours: i64,
    pub page_size: u32,
    pub max_pages: usize,
    pub request_timeout_secs: u64,
    pub utm_zone: u8,
    pub retrofit_rule: RetrofitRule,
}

impl Config {
    /// Reads settings from the environment, loading `.env` first when present.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`Config::from_env`] but with an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> anyhow::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let required = |key: &str| var(key).ok_or_else(|| anyhow!("{key} must be set"));
        let or = |key: &str, default: &str| var(key).unwrap_or_else(|| default.to_string());

        let credentials = Credentials {
            client_id: required("CLIENT_ID")?,
            client_secret: required("CLIENT_SECRET")?,
            scope: or("TOKEN_SCOPE", "api"),
        };

        let retrofit_rule = RetrofitRule::from_str(&or("RETROFIT_RULE", "literal"))
            .map_err(|e| anyhow!(e))
            .context("Invalid RETROFIT_RULE")?;

        Ok(Self {
            credentials,
            token_url: or("TOKEN_URL", DEFAULT_TOKEN_URL),
            api_base: or("API_BASE", DEFAULT_API_BASE),
            zoning_source: or("ZONING_SOURCE", "data/zoning.geojson"),
            zoning_label_property: or("ZONING_LABEL_PROPERTY", "Zoning"),
            coast_source: or("COAST_SOURCE", "data/coastal.geojson"),
            communities_file: var("COMMUNITIES_FILE").map(PathBuf::from),
            layer_ttl_hours: parse(&var, "LAYER_TTL_HOURS", 24)?,
            page_size: parse(&var, "PAGE_SIZE", 200)?,
            max_pages: parse(&var, "MAX_PAGES", 500)?,
            request_timeout_secs: parse(&var, "REQUEST_TIMEOUT_SECS", 60)?,
            utm_zone: parse(&var, "UTM_ZONE", 11)?,
            retrofit_rule,
        })
    }

    pub fn source_settings(&self) -> SourceSettings {
        let mut settings = SourceSettings::new(
            self.token_url.clone(),
            self.api_base.clone(),
            self.credentials.clone(),
        );
        settings.max_pages = self.max_pages;
        settings.timeout = Duration::from_secs(self.request_timeout_secs);
        settings
    }

    pub fn layer_sources(&self) -> LayerSources {
        LayerSources {
            zoning: LayerLocation::parse(&self.zoning_source),
            zoning_label_property: self.zoning_label_property.clone(),
            coastline: LayerLocation::parse(&self.coast_source),
        }
    }

    pub fn layer_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(self.layer_ttl_hours)
    }

    pub fn pipeline_settings(&self) -> anyhow::Result<PipelineSettings> {
        let utm = Utm::north(self.utm_zone)
            .ok_or_else(|| anyhow!("UTM_ZONE must be between 1 and 60, got {}", self.utm_zone))?;

        let communities = match &self.communities_file {
            Some(path) => {
                let text = std::fs::read_to_string(path).with_context(|| {
                    format!("Failed to read communities file {}", path.display())
                })?;
                let communities = Communities::from_lines(&text);
                if communities.is_empty() {
                    return Err(anyhow!(
                        "Communities file {} lists no names",
                        path.display()
                    ));
                }
                communities
            }
            None => Communities::embedded(),
        };

        let mut settings = PipelineSettings {
            page_size: self.page_size,
            communities,
            utm,
            ..PipelineSettings::default()
        };
        settings.apartment.retrofit_rule = self.retrofit_rule;
        Ok(settings)
    }
}

fn parse<T, F>(var: &F, key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
    F: Fn(&str) -> Option<String>,
{
    match var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("Invalid {key}: '{raw}'")),
        None => Ok(default),
    }
}
