// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Jonathan D. A. Jewell <hyperpolymath>

//! Configuration management for Vitrine

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::render::DisplayMode;

/// URL prefix the asset tree is served under
pub const ASSETS_PREFIX: &str = "/assets";

/// Routes the server defines itself
const RESERVED_ROUTES: &[&str] = &["/", "/health"];

/// Main application configuration
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Root directory holding one subdirectory per category
    #[serde(default = "default_assets_root")]
    pub assets_root: String,

    /// Category table: identifier, folder, URL base and page container
    #[serde(default = "default_categories")]
    pub categories: Vec<CategoryConfig>,

    /// Scanner server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Client-side loader settings
    #[serde(default)]
    pub loader: LoaderConfig,

    /// Lightbox timing
    #[serde(default)]
    pub lightbox: LightboxConfig,

    /// Static fallback data file
    #[serde(default)]
    pub fallback: FallbackConfig,

    /// Fallback watcher settings
    #[serde(default)]
    pub watcher: WatcherConfig,

    /// Photo normalization settings
    #[serde(default)]
    pub optimize: OptimizeConfig,
}

/// One gallery category.
///
/// `subdir` (server side) and `url_base` (client side) must point at the
/// same folder once deployed.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CategoryConfig {
    pub id: String,
    pub subdir: String,
    pub url_base: String,
    pub container_id: String,
    #[serde(default = "default_alt")]
    pub alt: String,
    #[serde(default)]
    pub display: DisplayMode,
    #[serde(default)]
    pub normalize: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LoaderConfig {
    #[serde(default = "default_scanner_url")]
    pub scanner_url: String,
    #[serde(default = "default_fallback_url")]
    pub fallback_url: String,
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LightboxConfig {
    #[serde(default = "default_close_delay")]
    pub close_delay_ms: u64,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct FallbackConfig {
    #[serde(default = "default_fallback_path")]
    pub path: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct WatcherConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_true")]
    pub normalize: bool,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OptimizeConfig {
    #[serde(default = "default_max_dimension")]
    pub max_dimension: u32,
    #[serde(default = "default_quality")]
    pub quality: u8,
}

// Default value functions
fn default_assets_root() -> String { "assets".to_string() }
fn default_alt() -> String { "Gallery image".to_string() }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 8080 }
fn default_endpoint() -> String { "/api/gallery".to_string() }
fn default_scanner_url() -> String { "http://127.0.0.1:8080/api/gallery".to_string() }
fn default_fallback_url() -> String { "http://127.0.0.1:8080/assets/js/gallery-data.js".to_string() }
fn default_timeout() -> u64 { 10 }
fn default_close_delay() -> u64 { 300 }
fn default_fallback_path() -> String { "assets/js/gallery-data.js".to_string() }
fn default_poll_interval() -> u64 { 2 }
fn default_true() -> bool { true }
fn default_max_dimension() -> u32 { 1200 }
fn default_quality() -> u8 { 85 }

fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig {
            id: "logos".to_string(),
            subdir: "logo".to_string(),
            url_base: "assets/logo/".to_string(),
            container_id: "logos-grid".to_string(),
            alt: "Client Logo".to_string(),
            display: DisplayMode::Contain,
            normalize: false,
        },
        CategoryConfig {
            id: "conference".to_string(),
            subdir: "conference".to_string(),
            url_base: "assets/conference/".to_string(),
            container_id: "conference-grid".to_string(),
            alt: "Conference Highlight".to_string(),
            display: DisplayMode::Cover,
            normalize: true,
        },
        CategoryConfig {
            id: "hospital".to_string(),
            subdir: "hospital".to_string(),
            url_base: "assets/hospital/".to_string(),
            container_id: "hospital-grid".to_string(),
            alt: "Hospital Installation".to_string(),
            display: DisplayMode::Cover,
            normalize: true,
        },
    ]
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            assets_root: default_assets_root(),
            categories: default_categories(),
            server: ServerConfig::default(),
            loader: LoaderConfig::default(),
            lightbox: LightboxConfig::default(),
            fallback: FallbackConfig::default(),
            watcher: WatcherConfig::default(),
            optimize: OptimizeConfig::default(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            endpoint: default_endpoint(),
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            scanner_url: default_scanner_url(),
            fallback_url: default_fallback_url(),
            timeout_secs: default_timeout(),
        }
    }
}

impl Default for LightboxConfig {
    fn default() -> Self {
        Self {
            close_delay_ms: default_close_delay(),
        }
    }
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self {
            path: default_fallback_path(),
        }
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            normalize: true,
        }
    }
}

impl Default for OptimizeConfig {
    fn default() -> Self {
        Self {
            max_dimension: default_max_dimension(),
            quality: default_quality(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> crate::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = serde_json::from_str(&content)
                .map_err(|e| {
                    crate::VitrineError::Config(format!("Failed to parse config: {}", e))
                })?;
            config.validate()?;
            Ok(config)
        } else {
            tracing::info!("Config file not found at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Save configuration to a JSON file
    pub fn save(&self, path: &Path) -> crate::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject tables the scanner and renderer cannot agree on
    pub fn validate(&self) -> crate::Result<()> {
        let mut seen = HashSet::new();
        for category in &self.categories {
            if category.id.trim().is_empty() {
                return Err(crate::VitrineError::Config(
                    "Category id must not be empty".to_string(),
                ));
            }
            if !seen.insert(category.id.as_str()) {
                return Err(crate::VitrineError::Config(format!(
                    "Duplicate category id '{}'",
                    category.id
                )));
            }
        }

        let endpoint = &self.server.endpoint;
        let under_assets =
            endpoint == ASSETS_PREFIX || endpoint.starts_with(&format!("{}/", ASSETS_PREFIX));
        if !endpoint.starts_with('/') || under_assets {
            return Err(crate::VitrineError::Config(format!(
                "Scanner endpoint '{}' must be an absolute path outside {}",
                endpoint, ASSETS_PREFIX
            )));
        }
        if endpoint.contains([':', '*', '{', '}']) {
            return Err(crate::VitrineError::Config(format!(
                "Scanner endpoint '{}' must be a literal path",
                endpoint
            )));
        }
        if RESERVED_ROUTES.contains(&endpoint.as_str()) {
            return Err(crate::VitrineError::Config(format!(
                "Scanner endpoint '{}' collides with a built-in route",
                endpoint
            )));
        }

        if !(1..=100).contains(&self.optimize.quality) {
            return Err(crate::VitrineError::Config(format!(
                "JPEG quality must be within 1..=100, got {}",
                self.optimize.quality
            )));
        }
        if self.optimize.max_dimension == 0 {
            return Err(crate::VitrineError::Config("max_dimension must be positive".to_string()));
        }

        Ok(())
    }

    /// Filesystem directory of a category
    pub fn category_dir(&self, category: &CategoryConfig) -> PathBuf {
        Path::new(&self.assets_root).join(&category.subdir)
    }

    /// Look up a category by identifier
    pub fn category(&self, id: &str) -> Option<&CategoryConfig> {
        self.categories.iter().find(|c| c.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_table_matches_site_layout() {
        let config = AppConfig::default();
        let ids: Vec<&str> = config.categories.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["logos", "conference", "hospital"]);

        let logos = config.category("logos").unwrap();
        assert_eq!(logos.subdir, "logo");
        assert_eq!(logos.display, DisplayMode::Contain);
        assert!(!logos.normalize);
        assert_eq!(config.category_dir(logos), PathBuf::from("assets").join("logo"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config.lightbox.close_delay_ms, 300);
        assert_eq!(config.server.endpoint, "/api/gallery");
    }

    #[test]
    fn partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "assets_root": "public", "server": { "port": 9000 } }"#).unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.assets_root, "public");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.categories.len(), 3);
        assert_eq!(config.optimize.quality, 85);
    }

    #[test]
    fn save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let mut config = AppConfig::default();
        config.watcher.normalize = false;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert!(!loaded.watcher.normalize);
        assert_eq!(loaded.categories, config.categories);
    }

    #[test]
    fn duplicate_ids_rejected() {
        let mut config = AppConfig::default();
        let dup = config.categories[0].clone();
        config.categories.push(dup);
        assert!(matches!(config.validate(), Err(crate::VitrineError::Config(_))));
    }

    #[test]
    fn endpoint_inside_asset_tree_rejected() {
        let mut config = AppConfig::default();
        config.server.endpoint = "/assets/get_gallery_images".to_string();
        assert!(config.validate().is_err());
        config.server.endpoint = "gallery".to_string();
        assert!(config.validate().is_err());
        config.server.endpoint = "/assets-list".to_string();
        assert!(config.validate().is_ok());
        config.server.endpoint = "/health".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn endpoint_with_route_syntax_rejected() {
        let mut config = AppConfig::default();
        for endpoint in ["/api/*rest", "/api/:id", "/api/{id}"] {
            config.server.endpoint = endpoint.to_string();
            assert!(config.validate().is_err(), "{}", endpoint);
        }
    }

    #[test]
    fn quality_out_of_range_rejected() {
        let mut config = AppConfig::default();
        config.optimize.quality = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn malformed_file_is_config_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AppConfig::load(&path), Err(crate::VitrineError::Config(_))));
    }
}
