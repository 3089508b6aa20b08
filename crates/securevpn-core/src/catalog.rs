//! Server Catalog
//!
//! The static list of selectable exit locations shown on the
//! dashboard. Entries are display-only: no routing happens through
//! them, so a profile carries nothing but presentation data.
//!
//! # Built-in locations
//!
//! | Id | City | Typical Latency |
//! |----|------|-----------------|
//! | us-east | New York | 25 ms |
//! | us-west | Los Angeles | 45 ms |
//! | uk | London | 35 ms |
//! | germany | Frankfurt | 30 ms |
//! | canada | Toronto | 40 ms |
//! | netherlands | Amsterdam | 28 ms |
//!
//! A custom catalog can be loaded from TOML or JSON instead.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Server identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ServerId {
    UsEast,
    UsWest,
    Uk,
    Germany,
    Canada,
    Netherlands,
}

impl ServerId {
    /// Get all known server ids
    pub fn all() -> &'static [ServerId] {
        &[
            ServerId::UsEast,
            ServerId::UsWest,
            ServerId::Uk,
            ServerId::Germany,
            ServerId::Canada,
            ServerId::Netherlands,
        ]
    }

    /// Stable slug used in config files and commands
    pub fn slug(&self) -> &'static str {
        match self {
            ServerId::UsEast => "us-east",
            ServerId::UsWest => "us-west",
            ServerId::Uk => "uk",
            ServerId::Germany => "germany",
            ServerId::Canada => "canada",
            ServerId::Netherlands => "netherlands",
        }
    }
}

impl std::fmt::Display for ServerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.slug())
    }
}

impl std::str::FromStr for ServerId {
    type Err = CatalogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "us-east" => Ok(ServerId::UsEast),
            "us-west" => Ok(ServerId::UsWest),
            "uk" => Ok(ServerId::Uk),
            "germany" => Ok(ServerId::Germany),
            "canada" => Ok(ServerId::Canada),
            "netherlands" => Ok(ServerId::Netherlands),
            _ => Err(CatalogError::UnknownServer(s.to_string())),
        }
    }
}

/// Catalog entry (stored in config file)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerProfile {
    /// Server identifier
    pub id: ServerId,
    /// City shown on the dashboard
    pub name: String,
    /// Country shown under the city
    pub country: String,
    /// Flag emoji
    pub flag: String,
    /// Advertised latency (display only, nothing is measured)
    pub latency_ms: u32,
    /// Is this entry selectable?
    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

/// The full server list
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCatalog {
    /// All entries, in display order
    pub servers: Vec<ServerProfile>,
}

impl ServerCatalog {
    /// Load from a file, picking the format from the extension
    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");

        match ext {
            "toml" => Self::from_toml_file(path),
            "json" => Self::from_json_file(path),
            _ => Err(CatalogError::UnsupportedFormat),
        }
    }

    /// Load from TOML file
    pub fn from_toml_file(path: &Path) -> Result<Self, CatalogError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Load from TOML string
    pub fn from_toml(content: &str) -> Result<Self, CatalogError> {
        let catalog: Self =
            toml::from_str(content).map_err(|e| CatalogError::ParseError(e.to_string()))?;
        catalog.validate()
    }

    /// Load from JSON file
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| CatalogError::IoError(e.to_string()))?;
        Self::from_json(&content)
    }

    /// Load from JSON string
    pub fn from_json(content: &str) -> Result<Self, CatalogError> {
        let catalog: Self =
            serde_json::from_str(content).map_err(|e| CatalogError::ParseError(e.to_string()))?;
        catalog.validate()
    }

    /// Export as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_default()
    }

    /// Export as JSON
    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    /// Find a server by id
    pub fn find(&self, id: ServerId) -> Option<&ServerProfile> {
        self.servers.iter().find(|s| s.id == id && s.enabled)
    }

    /// Get selectable servers in display order
    pub fn enabled_servers(&self) -> Vec<&ServerProfile> {
        self.servers.iter().filter(|s| s.enabled).collect()
    }

    /// First selectable entry (the initial selection)
    pub fn first_enabled(&self) -> Option<&ServerProfile> {
        self.servers.iter().find(|s| s.enabled)
    }

    /// A catalog with no selectable entry cannot seed a session
    fn validate(self) -> Result<Self, CatalogError> {
        if self.first_enabled().is_none() {
            return Err(CatalogError::EmptyCatalog);
        }
        Ok(self)
    }
}

impl Default for ServerCatalog {
    fn default() -> Self {
        Self {
            servers: vec![
                ServerProfile {
                    id: ServerId::UsEast,
                    name: "New York".to_string(),
                    country: "United States".to_string(),
                    flag: "🇺🇸".to_string(),
                    latency_ms: 25,
                    enabled: true,
                },
                ServerProfile {
                    id: ServerId::UsWest,
                    name: "Los Angeles".to_string(),
                    country: "United States".to_string(),
                    flag: "🇺🇸".to_string(),
                    latency_ms: 45,
                    enabled: true,
                },
                ServerProfile {
                    id: ServerId::Uk,
                    name: "London".to_string(),
                    country: "United Kingdom".to_string(),
                    flag: "🇬🇧".to_string(),
                    latency_ms: 35,
                    enabled: true,
                },
                ServerProfile {
                    id: ServerId::Germany,
                    name: "Frankfurt".to_string(),
                    country: "Germany".to_string(),
                    flag: "🇩🇪".to_string(),
                    latency_ms: 30,
                    enabled: true,
                },
                ServerProfile {
                    id: ServerId::Canada,
                    name: "Toronto".to_string(),
                    country: "Canada".to_string(),
                    flag: "🇨🇦".to_string(),
                    latency_ms: 40,
                    enabled: true,
                },
                ServerProfile {
                    id: ServerId::Netherlands,
                    name: "Amsterdam".to_string(),
                    country: "Netherlands".to_string(),
                    flag: "🇳🇱".to_string(),
                    latency_ms: 28,
                    enabled: true,
                },
            ],
        }
    }
}

/// Catalog errors
#[derive(Debug, Clone, thiserror::Error)]
pub enum CatalogError {
    #[error("Unknown server: {0}")]
    UnknownServer(String),

    #[error("Catalog has no selectable servers")]
    EmptyCatalog,

    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Unsupported catalog format")]
    UnsupportedFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_id_slug() {
        assert_eq!(ServerId::UsEast.slug(), "us-east");
        assert_eq!(ServerId::Netherlands.to_string(), "netherlands");
    }

    #[test]
    fn test_server_id_parse() {
        let id: ServerId = "us-west".parse().unwrap();
        assert_eq!(id, ServerId::UsWest);

        let id: ServerId = "GERMANY".parse().unwrap();
        assert_eq!(id, ServerId::Germany);

        let err = "mars".parse::<ServerId>();
        assert!(matches!(err, Err(CatalogError::UnknownServer(_))));
    }

    #[test]
    fn test_default_catalog() {
        let catalog = ServerCatalog::default();

        assert_eq!(catalog.servers.len(), 6);
        assert_eq!(catalog.first_enabled().unwrap().id, ServerId::UsEast);

        let frankfurt = catalog.find(ServerId::Germany).unwrap();
        assert_eq!(frankfurt.name, "Frankfurt");
        assert_eq!(frankfurt.latency_ms, 30);
    }

    #[test]
    fn test_disabled_server_not_found() {
        let mut catalog = ServerCatalog::default();
        catalog.servers[0].enabled = false;

        assert!(catalog.find(ServerId::UsEast).is_none());
        assert_eq!(catalog.enabled_servers().len(), 5);
        assert_eq!(catalog.first_enabled().unwrap().id, ServerId::UsWest);
    }

    #[test]
    fn test_catalog_toml_roundtrip() {
        let catalog = ServerCatalog::default();
        let toml = catalog.to_toml();

        let parsed = ServerCatalog::from_toml(&toml).unwrap();
        assert_eq!(parsed.servers, catalog.servers);
    }

    #[test]
    fn test_catalog_json_ids_are_slugs() {
        let json = ServerCatalog::default().to_json();
        assert!(json.contains("\"us-east\""));

        let parsed = ServerCatalog::from_json(&json).unwrap();
        assert_eq!(parsed.servers.len(), 6);
    }

    #[test]
    fn test_empty_catalog_rejected() {
        let result = ServerCatalog::from_json(r#"{ "servers": [] }"#);
        assert!(matches!(result, Err(CatalogError::EmptyCatalog)));
    }
}
