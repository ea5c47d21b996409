//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the SSR server.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the rendering server.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct RextConfig {
    /// Development mode: no module caching, manifest pushed by the build.
    pub dev: bool,

    /// Listener and compression settings.
    pub server: ServerConfig,

    /// Project directories.
    pub dir: DirConfig,

    /// Build output layout.
    pub build: BuildConfig,

    /// Names handed to the Document for client bootstrapping.
    pub globals: GlobalsConfig,

    /// Path matching options.
    pub router: RouterConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl RextConfig {
    /// `<root>/<build>`
    pub fn build_dir(&self) -> PathBuf {
        PathBuf::from(&self.dir.root).join(&self.dir.build)
    }

    /// Directory holding compiled server modules.
    pub fn server_dir(&self) -> PathBuf {
        self.build_dir().join(&self.build.dir.server)
    }

    /// Directory holding client assets served by the static stage.
    pub fn static_dir(&self) -> PathBuf {
        self.build_dir().join(&self.build.dir.static_dir)
    }

    /// Location of the resource manifest.
    pub fn manifest_path(&self) -> PathBuf {
        self.build_dir().join(&self.build.manifest)
    }

    /// Route prefix of the static stage, e.g. `/static`.
    pub fn static_route(&self) -> String {
        format!("/{}", self.build.dir.static_dir.trim_matches('/'))
    }

    /// Assets live on an external host (CDN) when the public path is absolute.
    pub fn assets_are_external(&self) -> bool {
        self.build.public_path.starts_with("http")
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,

    pub port: u16,

    /// Response compression (production only).
    pub compressor: CompressorConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
            compressor: CompressorConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// `compressor = false`, `compressor = true` or `[server.compressor]` with options.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CompressorConfig {
    Enabled(bool),
    Options(CompressionOptions),
}

impl Default for CompressorConfig {
    fn default() -> Self {
        CompressorConfig::Enabled(true)
    }
}

/// Encodings offered by the library compression stage.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct CompressionOptions {
    pub gzip: bool,
    pub br: bool,
    pub deflate: bool,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            gzip: true,
            br: true,
            deflate: true,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DirConfig {
    /// Project root; every other directory is relative to it.
    pub root: String,

    /// Build output directory.
    pub build: String,
}

impl Default for DirConfig {
    fn default() -> Self {
        Self {
            root: ".".to_string(),
            build: ".rext".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildConfig {
    /// Public URL prefix of client assets. An `http(s)://` value disables static serving.
    pub public_path: String,

    /// Manifest file name inside the build directory.
    pub manifest: String,

    /// File extension of compiled server modules.
    pub module_extension: String,

    pub dir: BuildDirConfig,
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            public_path: "/static/".to_string(),
            manifest: "resources.json".to_string(),
            module_extension: "js".to_string(),
            dir: BuildDirConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BuildDirConfig {
    #[serde(rename = "static")]
    pub static_dir: String,

    pub server: String,
}

impl Default for BuildDirConfig {
    fn default() -> Self {
        Self {
            static_dir: "static".to_string(),
            server: "server".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GlobalsConfig {
    /// Name of the client-side variable receiving the page state.
    pub context: String,

    /// Id of the element the page body is mounted in.
    pub id: String,
}

impl Default for GlobalsConfig {
    fn default() -> Self {
        Self {
            context: "__REXT__".to_string(),
            id: "__rext".to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(default)]
pub struct RouterConfig {
    /// Match static segments case-sensitively.
    pub case_sensitive: bool,

    /// Treat a trailing slash as significant.
    pub strict: bool,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config: RextConfig = toml::from_str("dev = true").unwrap();
        assert!(config.dev);
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.globals.context, "__REXT__");
        assert_eq!(config.static_route(), "/static");
        assert_eq!(
            config.manifest_path(),
            PathBuf::from("./.rext/resources.json")
        );
    }

    #[test]
    fn test_compressor_forms() {
        let off: RextConfig = toml::from_str("[server]\ncompressor = false").unwrap();
        assert_eq!(off.server.compressor, CompressorConfig::Enabled(false));

        let opts: RextConfig =
            toml::from_str("[server.compressor]\nbr = false").unwrap();
        assert_eq!(
            opts.server.compressor,
            CompressorConfig::Options(CompressionOptions {
                gzip: true,
                br: false,
                deflate: true,
            })
        );
    }

    #[test]
    fn test_external_public_path() {
        let mut config = RextConfig::default();
        assert!(!config.assets_are_external());
        config.build.public_path = "https://cdn.example.com/".into();
        assert!(config.assets_are_external());
    }
}
