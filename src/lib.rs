//! IconForge Core - PWA Icon Renditions
//!
//! Turns declarative icon configuration into one resized image per
//! (icon, size) pair, with a web-manifest entry and an asset descriptor for
//! each. Writing the assets to disk is left to the caller.
//!
//! ```text
//! ConfigMap ─ resolve_icons ─> Vec<CanonicalIcon> ─ IconPipeline::render ─> RenderOutput
//! ```

pub mod config;
pub mod engine;
pub mod error;
pub mod hashing;
pub mod mime;
pub mod output;
pub mod pipeline;
pub mod sizes;
pub mod validation;

pub use config::{resolve_icons, ConfigMap, Fingerprint, RenderOptions, ResolvedConfig};
pub use engine::{ImageEngine, RasterEngine, RasterFormat};
pub use error::IconError;
pub use hashing::fingerprint;
pub use output::{join_uri, AssetDescriptor, IosLink, ManifestIconEntry, RenderOutput};
pub use pipeline::{IconPipeline, Rendition, RenditionQueue};
pub use sizes::{parse_size, Dimension, SizeToken};
pub use validation::{normalize_icon, CanonicalIcon, IosMode, RawIconSpec};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
