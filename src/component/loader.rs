//! Component loading with a per-path module cache.
//!
//! # Responsibilities
//! - Resolve entry names to module paths
//! - Serve modules from cache in production
//! - Bypass the cache entirely in development
//!
//! # Design Decisions
//! - Cache is append-only: first inserted module for a path wins, so two
//!   concurrent loads of the same path hand out the same instance
//! - A failed load never touches the cache
//! - Swapping the module source (new build) clears the cache

use std::path::{Path, PathBuf};
use std::sync::Arc;

use arc_swap::ArcSwap;
use dashmap::DashMap;

use crate::component::registry::{module_path, ModuleLoadError, ModuleSource};
use crate::component::LoadedModule;
use crate::config::RextConfig;
use crate::observability::metrics;

/// How loads interact with the module cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CachePolicy {
    /// Load once, keep for the life of the process.
    Persistent,
    /// Always ask the source; never read or populate the cache.
    Bypass,
}

impl CachePolicy {
    pub fn for_mode(dev: bool) -> Self {
        if dev {
            CachePolicy::Bypass
        } else {
            CachePolicy::Persistent
        }
    }
}

pub struct ComponentLoader {
    dir: PathBuf,
    extension: String,
    policy: CachePolicy,
    source: ArcSwap<Arc<dyn ModuleSource>>,
    cache: DashMap<PathBuf, LoadedModule>,
}

impl ComponentLoader {
    pub fn new(
        dir: impl Into<PathBuf>,
        extension: impl Into<String>,
        policy: CachePolicy,
        source: Arc<dyn ModuleSource>,
    ) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            policy,
            source: ArcSwap::from_pointee(source),
            cache: DashMap::new(),
        }
    }

    pub fn from_config(config: &RextConfig, source: Arc<dyn ModuleSource>) -> Self {
        Self::new(
            config.server_dir(),
            config.build.module_extension.clone(),
            CachePolicy::for_mode(config.dev),
            source,
        )
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    /// Path of the compiled module for `name`.
    pub fn resolve(&self, name: &str) -> PathBuf {
        module_path(&self.dir, name, &self.extension)
    }

    pub fn load_entry(&self, name: &str) -> Result<LoadedModule, ModuleLoadError> {
        self.load(&self.resolve(name))
    }

    pub fn load(&self, path: &Path) -> Result<LoadedModule, ModuleLoadError> {
        if self.policy == CachePolicy::Bypass {
            metrics::record_module_load("bypass");
            return self.load_uncached(path);
        }

        if let Some(module) = self.cache.get(path) {
            metrics::record_module_load("hit");
            return Ok(module.clone());
        }

        metrics::record_module_load("miss");
        let module = self.load_uncached(path)?;
        Ok(self
            .cache
            .entry(path.to_path_buf())
            .or_insert(module)
            .clone())
    }

    fn load_uncached(&self, path: &Path) -> Result<LoadedModule, ModuleLoadError> {
        let source = self.source.load_full();
        let result = source.load(path);
        match &result {
            Ok(_) => tracing::debug!(path = %path.display(), "Module loaded"),
            Err(e) => tracing::debug!(path = %path.display(), error = %e, "Module load failed"),
        }
        result
    }

    /// Replace the module source and drop everything cached from the old one.
    pub fn replace_source(&self, source: Arc<dyn ModuleSource>) {
        self.source.store(Arc::new(source));
        self.cache.clear();
        tracing::info!("Module source replaced");
    }

    /// Number of cached modules.
    pub fn cached(&self) -> usize {
        self.cache.len()
    }
}

impl std::fmt::Debug for ComponentLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ComponentLoader")
            .field("dir", &self.dir)
            .field("policy", &self.policy)
            .field("cached", &self.cache.len())
            .finish()
    }
}
