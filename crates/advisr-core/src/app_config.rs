use std::path::PathBuf;
use std::time::Duration;

use crate::geo::LatLng;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub api_base_url: String,
    pub places_base_url: String,
    pub places_api_key: String,
    pub categories_path: Option<PathBuf>,
    pub request_timeout_secs: u64,
    pub user_agent: String,
    pub default_center: LatLng,
    pub search_radius_m: u32,
    pub locate_guard_ms: u64,
    pub watch_timeout_ms: u64,
    pub category_timeout_ms: u64,
    pub category_delay_ms: u64,
    pub nearby_page_delay_ms: u64,
    pub search_page_delay_ms: u64,
    pub search_max_pages: usize,
    pub detail_batch_size: usize,
    pub detail_batch_delay_ms: u64,
}

impl AppConfig {
    #[must_use]
    pub fn locate_guard(&self) -> Duration {
        Duration::from_millis(self.locate_guard_ms)
    }

    #[must_use]
    pub fn watch_timeout(&self) -> Duration {
        Duration::from_millis(self.watch_timeout_ms)
    }

    #[must_use]
    pub fn category_timeout(&self) -> Duration {
        Duration::from_millis(self.category_timeout_ms)
    }

    #[must_use]
    pub fn category_delay(&self) -> Duration {
        Duration::from_millis(self.category_delay_ms)
    }

    #[must_use]
    pub fn nearby_page_delay(&self) -> Duration {
        Duration::from_millis(self.nearby_page_delay_ms)
    }

    #[must_use]
    pub fn search_page_delay(&self) -> Duration {
        Duration::from_millis(self.search_page_delay_ms)
    }

    #[must_use]
    pub fn detail_batch_delay(&self) -> Duration {
        Duration::from_millis(self.detail_batch_delay_ms)
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("api_base_url", &self.api_base_url)
            .field("places_base_url", &self.places_base_url)
            .field("places_api_key", &"[redacted]")
            .field("categories_path", &self.categories_path)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("default_center", &self.default_center)
            .field("search_radius_m", &self.search_radius_m)
            .field("locate_guard_ms", &self.locate_guard_ms)
            .field("watch_timeout_ms", &self.watch_timeout_ms)
            .field("category_timeout_ms", &self.category_timeout_ms)
            .field("category_delay_ms", &self.category_delay_ms)
            .field("nearby_page_delay_ms", &self.nearby_page_delay_ms)
            .field("search_page_delay_ms", &self.search_page_delay_ms)
            .field("search_max_pages", &self.search_max_pages)
            .field("detail_batch_size", &self.detail_batch_size)
            .field("detail_batch_delay_ms", &self.detail_batch_delay_ms)
            .finish()
    }
}
