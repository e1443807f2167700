//! # lkml2cube
//!
//! Translates LookML semantic models into Cube semantic-layer definitions,
//! and Cube deployments back into LookML.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │                 LookML files (glob)                      │
//! │        (views, explores, includes, constants)            │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [lookml + loader]
//! ┌─────────────────────────────────────────────────────────┐
//! │                Namespace (Rust Types)                    │
//! └─────────────────────────────────────────────────────────┘
//!              │                            ▲
//!              ▼ [mapping::views            │ [mapping::reverse]
//!              │  mapping::explores]        │
//! ┌─────────────────────────────────────────────────────────┐
//! │          CubeModel (cubes + views, join paths)           │
//! │                            Cube meta API JSON [meta]     │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [output]
//! ┌─────────────────────────────────────────────────────────┐
//! │            YAML model files / LookML files               │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod convert;
pub mod loader;
pub mod logging;
pub mod lookml;
pub mod mapping;
pub mod meta;
pub mod model;
pub mod output;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::convert::{ConvertError, ConvertOptions, ConvertResult};
    pub use crate::loader::{load_namespace, load_namespace_from_str, LoadError};
    pub use crate::mapping::{
        attach_cube_joins, map_cube_model, map_explores, map_views, MapOptions, MappingError,
    };
    pub use crate::model::{Cube, CubeModel, CubeView, Explore, Namespace, View};
}
