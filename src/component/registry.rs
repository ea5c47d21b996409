//! Module sources: where compiled modules come from.
//!
//! # Responsibilities
//! - Define the `ModuleSource` seam the loader reads through
//! - Hold modules linked into the binary (`ModuleRegistry`)
//! - Load HTML fragment pages from the build output (`FragmentSource`)

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use crate::component::builtin::StaticFragment;
use crate::component::{Component, DataFetch, LoadedModule};
use crate::config::RextConfig;

/// Failure to obtain a module. Fatal for the request that needed it.
#[derive(Debug, Error)]
pub enum ModuleLoadError {
    #[error("module not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("module {} has no default component", .0.display())]
    MissingComponent(PathBuf),

    #[error("failed to read module {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Produces modules by resolved path.
///
/// Loads may block (`FragmentSource` reads the file system); the renderer
/// runs them on the blocking pool.
pub trait ModuleSource: Send + Sync {
    fn load(&self, path: &Path) -> Result<LoadedModule, ModuleLoadError>;
}

/// `<dir>/<name>.<extension>`; no extension when it is empty.
pub fn module_path(dir: &Path, name: &str, extension: &str) -> PathBuf {
    let name = name.trim_matches('/');
    if extension.is_empty() {
        dir.join(name)
    } else {
        dir.join(format!("{}.{}", name, extension))
    }
}

/// What a compiled module exports.
#[derive(Clone, Default)]
pub struct ModuleExports {
    pub default: Option<Arc<dyn Component>>,
    pub data_fetch: Option<Arc<dyn DataFetch>>,
}

impl ModuleExports {
    pub fn component(component: impl Component + 'static) -> Self {
        Self::shared(Arc::new(component))
    }

    pub fn shared(component: Arc<dyn Component>) -> Self {
        Self {
            default: Some(component),
            data_fetch: None,
        }
    }

    pub fn with_data_fetch(mut self, data_fetch: Arc<dyn DataFetch>) -> Self {
        self.data_fetch = Some(data_fetch);
        self
    }

    fn link(&self, path: &Path) -> Result<LoadedModule, ModuleLoadError> {
        let component = self
            .default
            .clone()
            .ok_or_else(|| ModuleLoadError::MissingComponent(path.to_path_buf()))?;
        Ok(LoadedModule {
            component,
            data_fetch: self.data_fetch.clone(),
        })
    }
}

/// Modules linked into the binary, keyed by their resolved path.
///
/// Names it does not hold go to the fallback source, if any.
#[derive(Clone)]
pub struct ModuleRegistry {
    dir: PathBuf,
    extension: String,
    modules: HashMap<PathBuf, ModuleExports>,
    fallback: Option<Arc<dyn ModuleSource>>,
}

impl ModuleRegistry {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
            modules: HashMap::new(),
            fallback: None,
        }
    }

    /// Registry resolving names the same way the configured loader does.
    pub fn for_config(config: &RextConfig) -> Self {
        Self::new(config.server_dir(), config.build.module_extension.clone())
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        module_path(&self.dir, name, &self.extension)
    }

    pub fn register(&mut self, name: &str, exports: ModuleExports) {
        self.modules.insert(self.path_of(name), exports);
    }

    pub fn with(mut self, name: &str, exports: ModuleExports) -> Self {
        self.register(name, exports);
        self
    }

    pub fn with_fallback(mut self, source: Arc<dyn ModuleSource>) -> Self {
        self.fallback = Some(source);
        self
    }

    pub fn len(&self) -> usize {
        self.modules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

impl ModuleSource for ModuleRegistry {
    fn load(&self, path: &Path) -> Result<LoadedModule, ModuleLoadError> {
        match (self.modules.get(path), &self.fallback) {
            (Some(exports), _) => exports.link(path),
            (None, Some(fallback)) => fallback.load(path),
            (None, None) => Err(ModuleLoadError::NotFound(path.to_path_buf())),
        }
    }
}

/// Pages compiled to static HTML fragments on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FragmentSource;

impl ModuleSource for FragmentSource {
    fn load(&self, path: &Path) -> Result<LoadedModule, ModuleLoadError> {
        match std::fs::read_to_string(path) {
            Ok(html) => Ok(LoadedModule::new(Arc::new(StaticFragment::new(html)))),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(ModuleLoadError::NotFound(path.to_path_buf()))
            }
            Err(source) => Err(ModuleLoadError::Io {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}
