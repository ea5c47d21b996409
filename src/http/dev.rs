//! Development channel and passthrough stage.
//!
//! The build/watch side owns the sending half of an unbounded channel and
//! pushes `DevUpdate`s; the server consumes them. Nothing subscribes to
//! process-wide events.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use tokio::sync::mpsc;

use crate::component::ModuleSource;
use crate::http::stage::{handler, Handler, Stage};
use crate::manifest::MemoryFs;

pub type DevSender = mpsc::UnboundedSender<DevUpdate>;
pub type DevReceiver = mpsc::UnboundedReceiver<DevUpdate>;

pub fn channel() -> (DevSender, DevReceiver) {
    mpsc::unbounded_channel()
}

pub enum DevUpdate {
    /// New in-memory build output; the manifest is reloaded from it.
    Filesystem(Arc<MemoryFs>),
    /// New compiled modules.
    Modules(Arc<dyn ModuleSource>),
    /// Handler the dev passthrough defers to from now on.
    HotReload(Handler),
    /// The manifest changed where the current reader looks.
    ManifestChanged,
}

impl std::fmt::Debug for DevUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DevUpdate::Filesystem(_) => f.write_str("DevUpdate::Filesystem"),
            DevUpdate::Modules(_) => f.write_str("DevUpdate::Modules"),
            DevUpdate::HotReload(_) => f.write_str("DevUpdate::HotReload"),
            DevUpdate::ManifestChanged => f.write_str("DevUpdate::ManifestChanged"),
        }
    }
}

/// First stage in development: the registered hot-reload handler, or
/// straight to the next stage while there is none.
pub fn passthrough(slot: Arc<ArcSwapOption<Handler>>) -> Stage {
    Stage::global(handler(move |request, next| {
        let registered = slot.load_full();
        async move {
            match registered {
                Some(hot_reload) => (**hot_reload)(request, next).await,
                None => next.run(request).await,
            }
        }
    }))
}
