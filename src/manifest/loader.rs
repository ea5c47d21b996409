//! Resource manifest loading and route table rebuilds.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use serde::Serialize;
use thiserror::Error;

use crate::config::RouterConfig;
use crate::manifest::fs::ManifestReader;
use crate::observability::metrics;
use crate::routing::RouteTable;

/// Reasons a manifest could not be loaded. Logged, never returned to callers
/// of [`ManifestLoader::load`].
#[derive(Debug, Error)]
pub enum ManifestLoadError {
    #[error("manifest not found at {0}")]
    Missing(PathBuf),

    #[error("failed to read manifest: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Page name → ordered asset list, in manifest order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceManifest {
    entries: Vec<(String, Vec<String>)>,
    index: HashMap<String, usize>,
}

impl ResourceManifest {
    /// Parse the JSON manifest document, keeping key order.
    pub fn parse(json: &str) -> Result<Self, ManifestLoadError> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(json)?;

        let mut manifest = Self::default();
        for (name, assets) in object {
            let assets: Vec<String> = serde_json::from_value(assets)?;
            manifest.push(name, assets);
        }
        Ok(manifest)
    }

    fn push(&mut self, name: String, assets: Vec<String>) {
        self.index.insert(name.clone(), self.entries.len());
        self.entries.push((name, assets));
    }

    /// Entry names in manifest order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn assets(&self, name: &str) -> Option<&[String]> {
        self.index
            .get(name)
            .map(|&i| self.entries[i].1.as_slice())
    }

    /// Client assets of an entry, split by kind. Unknown entries have none.
    pub fn classify(&self, name: &str) -> Assets {
        Assets::classify(self.assets(name).unwrap_or_default())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<String>)> for ResourceManifest {
    fn from_iter<T: IntoIterator<Item = (S, Vec<String>)>>(iter: T) -> Self {
        let mut manifest = Self::default();
        for (name, assets) in iter {
            manifest.push(name.into(), assets);
        }
        manifest
    }
}

/// Scripts and styles an entry needs on the client.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Assets {
    pub scripts: Vec<String>,
    pub styles: Vec<String>,
}

impl Assets {
    /// `.js` files are scripts, `.css` files are styles; anything else is ignored.
    pub fn classify(assets: &[String]) -> Self {
        let mut out = Self::default();
        for asset in assets {
            if asset.ends_with(".js") {
                out.scripts.push(asset.clone());
            } else if asset.ends_with(".css") {
                out.styles.push(asset.clone());
            }
        }
        out
    }
}

/// A manifest together with the route table derived from it.
#[derive(Debug, Default)]
pub struct Routing {
    pub manifest: ResourceManifest,
    pub table: RouteTable,
}

impl Routing {
    pub fn new(manifest: ResourceManifest, options: RouterConfig) -> Self {
        let table = RouteTable::from_entries(manifest.names(), options);
        Self { manifest, table }
    }
}

/// Loads the manifest and publishes `Routing` snapshots.
///
/// Readers see either the previous or the new snapshot, never a mix.
pub struct ManifestLoader {
    path: PathBuf,
    options: RouterConfig,
    current: ArcSwap<Routing>,
}

impl ManifestLoader {
    pub fn new(path: impl Into<PathBuf>, options: RouterConfig) -> Self {
        Self {
            path: path.into(),
            options,
            current: ArcSwap::from_pointee(Routing::default()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Current manifest and route table.
    pub fn current(&self) -> Arc<Routing> {
        self.current.load_full()
    }

    /// (Re)load the manifest through `reader` and rebuild routes.
    ///
    /// On failure an empty manifest replaces the current one and a warning is
    /// logged. Returns the number of entries now loaded.
    pub fn load(&self, reader: &dyn ManifestReader) -> usize {
        let manifest = match self.read(reader) {
            Ok(manifest) => {
                tracing::info!(
                    path = %self.path.display(),
                    entries = manifest.len(),
                    "Resource manifest loaded"
                );
                metrics::record_manifest_load("ok", manifest.len());
                manifest
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "Resource manifest unavailable, continuing with no routes"
                );
                metrics::record_manifest_load("error", 0);
                ResourceManifest::default()
            }
        };

        let count = manifest.len();
        self.current.store(Arc::new(Routing::new(manifest, self.options)));
        count
    }

    fn read(&self, reader: &dyn ManifestReader) -> Result<ResourceManifest, ManifestLoadError> {
        if !reader.exists(&self.path) {
            return Err(ManifestLoadError::Missing(self.path.clone()));
        }
        let content = reader.read_to_string(&self.path)?;
        ResourceManifest::parse(&content)
    }
}

impl std::fmt::Debug for ManifestLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManifestLoader")
            .field("path", &self.path)
            .field("entries", &self.current.load().manifest.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::fs::{DiskFs, MemoryFs};

    const PATH: &str = "/build/resources.json";

    #[test]
    fn test_parse_keeps_order() {
        let manifest =
            ResourceManifest::parse(r#"{"zeta":["z.js"],"alpha":[],"_error":["e.css"]}"#).unwrap();
        assert_eq!(manifest.names().collect::<Vec<_>>(), ["zeta", "alpha", "_error"]);
        assert_eq!(manifest.assets("zeta").unwrap(), ["z.js".to_string()]);
        assert!(manifest.assets("missing").is_none());
    }

    #[test]
    fn test_parse_rejects_non_list_values() {
        assert!(ResourceManifest::parse(r#"{"a": "a.js"}"#).is_err());
        assert!(ResourceManifest::parse("[]").is_err());
    }

    #[test]
    fn test_asset_classification() {
        let manifest = ResourceManifest::parse(r#"{"about":["a.js","a.css","a.map","vendor.js"]}"#)
            .unwrap();
        assert_eq!(
            manifest.classify("about"),
            Assets {
                scripts: vec!["a.js".into(), "vendor.js".into()],
                styles: vec!["a.css".into()],
            }
        );
        assert_eq!(manifest.classify("nope"), Assets::default());
    }

    #[test]
    fn test_load_rebuilds_routes() {
        let loader = ManifestLoader::new(PATH, RouterConfig::default());
        assert!(loader.current().table.is_empty());

        let fs = MemoryFs::new().with_file(PATH, r#"{"about":["a.js","a.css"]}"#);
        assert_eq!(loader.load(&fs), 1);

        let routing = loader.current();
        let matched = routing.table.match_path("/about").unwrap().unwrap();
        assert_eq!(matched.entry, "about");
        assert_eq!(routing.manifest.classify(&matched.entry).scripts, ["a.js"]);
    }

    #[test]
    fn test_failed_load_yields_empty_manifest() {
        let loader = ManifestLoader::new(PATH, RouterConfig::default());
        loader.load(&MemoryFs::new().with_file(PATH, r#"{"about":[]}"#));
        assert_eq!(loader.current().manifest.len(), 1);

        assert_eq!(loader.load(&MemoryFs::new().with_file(PATH, "{not json")), 0);
        assert!(loader.current().manifest.is_empty());

        assert_eq!(loader.load(&MemoryFs::new()), 0);
        assert!(loader.current().table.is_empty());
    }

    #[test]
    fn test_snapshot_survives_reload() {
        let loader = ManifestLoader::new(PATH, RouterConfig::default());
        loader.load(&MemoryFs::new().with_file(PATH, r#"{"old":[]}"#));
        let before = loader.current();

        loader.load(&MemoryFs::new().with_file(PATH, r#"{"new":[]}"#));
        assert_eq!(before.manifest.names().collect::<Vec<_>>(), ["old"]);
        assert_eq!(loader.current().manifest.names().collect::<Vec<_>>(), ["new"]);
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resources.json");
        std::fs::write(&path, r#"{"index":["main.js"],"blog/_id":[]}"#).unwrap();

        let loader = ManifestLoader::new(&path, RouterConfig::default());
        assert_eq!(loader.load(&DiskFs), 2);
        let m = loader.current().table.match_path("/blog/7").unwrap().unwrap();
        assert_eq!(m.params["id"], "7");
    }
}
