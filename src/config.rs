//! Configuration management for the Schema Registry
//!
//! Supports loading configuration from:
//! - Default values
//! - Config file (schema-registry.toml)
//! - Environment variables (SCHEMA_REGISTRY__*)
//!
//! ## Example config file (schema-registry.toml):
//! ```toml
//! [storage]
//! path = "/var/lib/schema-registry/registry.db"
//!
//! [http]
//! addr = "0.0.0.0:8080"
//! tls_cert = "/etc/schema-registry/cert.pem"
//! tls_key = "/etc/schema-registry/key.pem"
//!
//! [dialects]
//! json_schema = true
//! avro = false
//! ```

use config_crate::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::compiler::{AvroCompiler, CompilerRegistry, JsonSchemaCompiler, AVRO, JSON_SCHEMA};

/// Main configuration for the schema registry
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryConfig {
    /// Storage settings
    #[serde(default)]
    pub storage: StorageConfig,

    /// HTTP transport settings
    #[serde(default)]
    pub http: HttpConfig,

    /// Which built-in dialects to register
    #[serde(default)]
    pub dialects: DialectConfig,
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the database file
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Listen address
    #[serde(default = "default_http_addr")]
    pub addr: String,

    /// PEM certificate chain; serving TLS needs both this and `tls_key`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_cert: Option<PathBuf>,

    /// PEM private key matching `tls_cert`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tls_key: Option<PathBuf>,
}

/// Built-in dialect switches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DialectConfig {
    #[serde(default = "default_true")]
    pub json_schema: bool,

    #[serde(default = "default_true")]
    pub avro: bool,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("schema-registry.db")
}

fn default_http_addr() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            addr: default_http_addr(),
            tls_cert: None,
            tls_key: None,
        }
    }
}

impl HttpConfig {
    /// Certificate and key paths when TLS is configured.
    ///
    /// Setting only one of the two is a configuration error.
    pub fn tls(&self) -> Result<Option<(&Path, &Path)>, ConfigError> {
        match (&self.tls_cert, &self.tls_key) {
            (Some(cert), Some(key)) => Ok(Some((cert.as_path(), key.as_path()))),
            (None, None) => Ok(None),
            (Some(_), None) => Err(ConfigError::Message(
                "http.tls_cert set without tls_key".to_string(),
            )),
            (None, Some(_)) => Err(ConfigError::Message(
                "http.tls_key set without tls_cert".to_string(),
            )),
        }
    }
}

impl Default for DialectConfig {
    fn default() -> Self {
        Self {
            json_schema: true,
            avro: true,
        }
    }
}

impl DialectConfig {
    /// Compiler registry holding the enabled dialects
    pub fn compilers(&self) -> CompilerRegistry {
        let mut registry = CompilerRegistry::new();
        if self.json_schema {
            registry.register(JSON_SCHEMA, JsonSchemaCompiler);
        }
        if self.avro {
            registry.register(AVRO, AvroCompiler);
        }
        registry
    }
}

impl RegistryConfig {
    /// Load configuration, adding a specific file on top of the defaults
    pub fn load_from(config_path: Option<&str>) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        let config_locations = [
            "schema-registry.toml",
            ".schema-registry.toml",
            "config/schema-registry.toml",
        ];

        for location in config_locations {
            builder = builder.add_source(File::with_name(location).required(false));
        }

        let project_dirs =
            directories::ProjectDirs::from("org", "schema-registry", "schema-registry");
        if let Some(config_dir) = project_dirs {
            let xdg_config = config_dir.config_dir().join("schema-registry.toml");
            if xdg_config.exists() {
                builder = builder.add_source(File::from(xdg_config).required(false));
            }
        }

        if let Some(path) = config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        // SCHEMA_REGISTRY__STORAGE__PATH, SCHEMA_REGISTRY__HTTP__ADDR, ...
        builder = builder.add_source(
            Environment::with_prefix("SCHEMA_REGISTRY")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build()?;
        config.try_deserialize()
    }

    /// Save configuration to a file
    pub fn save(&self, path: &str) -> std::io::Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        std::fs::write(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = RegistryConfig::default();
        assert_eq!(config.storage.path, PathBuf::from("schema-registry.db"));
        assert_eq!(config.http.addr, "127.0.0.1:8080");
        assert!(config.dialects.json_schema && config.dialects.avro);
    }

    #[test]
    fn test_serialize_config() {
        let config = RegistryConfig::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[storage]"));
        assert!(toml_str.contains("[http]"));
        assert!(toml_str.contains("[dialects]"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("registry.toml");
        std::fs::write(
            &path,
            "[storage]\npath = \"/tmp/x.db\"\n\n[dialects]\navro = false\n",
        )
        .unwrap();

        let config = RegistryConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(config.storage.path, PathBuf::from("/tmp/x.db"));
        assert!(!config.dialects.avro);
        assert!(config.dialects.json_schema);
        assert_eq!(config.dialects.compilers().types(), vec![JSON_SCHEMA]);
    }

    #[test]
    fn test_load_tls_paths() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tls.toml");
        std::fs::write(
            &path,
            concat!(
                "[http]\n",
                "addr = \"0.0.0.0:8443\"\n",
                "tls_cert = \"/etc/sr/cert.pem\"\n",
                "tls_key = \"/etc/sr/key.pem\"\n",
            ),
        )
        .unwrap();

        let config = RegistryConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        let (cert, key) = config.http.tls().unwrap().unwrap();
        assert_eq!(cert, Path::new("/etc/sr/cert.pem"));
        assert_eq!(key, Path::new("/etc/sr/key.pem"));
    }

    #[test]
    fn test_tls_requires_cert_and_key() {
        let mut http = HttpConfig::default();
        assert!(http.tls().unwrap().is_none());

        http.tls_cert = Some(PathBuf::from("cert.pem"));
        assert!(http.tls().is_err());

        http.tls_cert = None;
        http.tls_key = Some(PathBuf::from("key.pem"));
        assert!(http.tls().is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("saved.toml");
        let mut config = RegistryConfig::default();
        config.http.addr = "0.0.0.0:9000".to_string();
        config.save(path.to_str().unwrap()).unwrap();

        let loaded = RegistryConfig::load_from(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(loaded.http.addr, "0.0.0.0:9000");
    }
}
