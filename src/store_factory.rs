use crate::date_provider::{DateProvider, OverrideDateProvider, SystemDateProvider};
use crate::error::Result;
use crate::stats::StatsAggregator;
use crate::store::SqliteStore;
use chrono::NaiveDate;
use log::debug;
use std::sync::Arc;

/// File used when no path is given
pub const DEFAULT_DB_PATH: &str = "multiplication_table.db";

/// Store configuration
#[derive(Debug, Clone, Default)]
pub struct StoreConfig {
    /// Whether to use an in-memory database
    pub is_test_mode: bool,
    /// Custom database file path (ignored if in test mode)
    pub custom_path: Option<String>,
    /// Day to record answers under instead of today
    pub override_date: Option<NaiveDate>,
}

impl StoreConfig {
    pub fn builder() -> StoreConfigBuilder {
        StoreConfigBuilder::default()
    }

    /// Gets the effective database path
    pub fn get_path(&self) -> &str {
        if self.is_test_mode {
            ":memory:"
        } else {
            self.custom_path.as_deref().unwrap_or(DEFAULT_DB_PATH)
        }
    }

    pub fn date_provider(&self) -> Arc<dyn DateProvider> {
        match self.override_date {
            Some(date) => Arc::new(OverrideDateProvider::new(date)),
            None => Arc::new(SystemDateProvider),
        }
    }
}

#[derive(Debug, Default)]
pub struct StoreConfigBuilder {
    config: StoreConfig,
}

impl StoreConfigBuilder {
    pub fn test_mode(mut self) -> Self {
        self.config.is_test_mode = true;
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.config.custom_path = Some(path.into());
        self
    }

    pub fn date(mut self, date: NaiveDate) -> Self {
        self.config.override_date = Some(date);
        self
    }

    /// Invalid calendar dates are ignored
    pub fn date_ymd(mut self, year: i32, month: u32, day: u32) -> Self {
        self.config.override_date = NaiveDate::from_ymd_opt(year, month, day);
        self
    }

    pub fn build(self) -> StoreConfig {
        self.config
    }
}

/// Factory for creating a stats aggregator over the configured store
pub struct StoreFactory;

impl StoreFactory {
    pub fn create(config: &StoreConfig) -> Result<StatsAggregator<SqliteStore>> {
        let path = config.get_path();
        debug!("Opening statistics store at {}", path);
        let store = SqliteStore::open(path)?;
        Ok(StatsAggregator::with_date_provider(
            store,
            config.date_provider(),
        ))
    }
}
