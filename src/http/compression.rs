//! Response compression stage.

use std::convert::Infallible;

use axum::body::Body;
use axum::extract::Request;
use axum::middleware::Next;
use tower::{service_fn, Layer, ServiceExt};
use tower_http::compression::CompressionLayer;

use crate::config::{CompressionOptions, CompressorConfig};
use crate::http::stage::{handler, Handler, Stage};

#[derive(Clone)]
pub enum Compressor {
    Disabled,
    /// tower-http compression with the given encodings.
    Library(CompressionOptions),
    /// Caller-supplied stage handler.
    Custom(Handler),
}

impl Compressor {
    pub fn from_config(config: &CompressorConfig) -> Self {
        match config {
            CompressorConfig::Enabled(false) => Compressor::Disabled,
            CompressorConfig::Enabled(true) => Compressor::Library(CompressionOptions::default()),
            CompressorConfig::Options(options) => Compressor::Library(options.clone()),
        }
    }

    pub fn stage(&self) -> Option<Stage> {
        match self {
            Compressor::Disabled => None,
            Compressor::Custom(custom) => Some(Stage::global(custom.clone())),
            Compressor::Library(options) => {
                let layer = CompressionLayer::new()
                    .gzip(options.gzip)
                    .br(options.br)
                    .deflate(options.deflate);
                Some(Stage::global(handler(move |request: Request, next: Next| {
                    let service = layer.layer(service_fn(move |request: Request| {
                        let next = next.clone();
                        async move { Ok::<_, Infallible>(next.run(request).await) }
                    }));
                    async move {
                        match service.oneshot(request).await {
                            Ok(response) => response.map(Body::new),
                            Err(never) => match never {},
                        }
                    }
                })))
            }
        }
    }
}

impl std::fmt::Debug for Compressor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Compressor::Disabled => f.write_str("Compressor::Disabled"),
            Compressor::Library(options) => f.debug_tuple("Compressor::Library").field(options).finish(),
            Compressor::Custom(_) => f.write_str("Compressor::Custom"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config() {
        assert!(matches!(
            Compressor::from_config(&CompressorConfig::Enabled(false)),
            Compressor::Disabled
        ));
        assert!(Compressor::from_config(&CompressorConfig::Enabled(true)).stage().is_some());

        let options = CompressionOptions {
            br: false,
            ..CompressionOptions::default()
        };
        match Compressor::from_config(&CompressorConfig::Options(options.clone())) {
            Compressor::Library(got) => assert_eq!(got, options),
            other => panic!("unexpected {:?}", other),
        }
        assert!(Compressor::Disabled.stage().is_none());
    }
}
