//! Data model for both schema dialects.
//!
//! - [`namespace`]: LookML views, explores and constants as loaded from disk.
//! - [`cube`]: Cube cubes and composite views.
//! - [`types`]: the closed type enums and the tables between them.

pub mod cube;
pub mod namespace;
pub mod types;

pub use cube::{
    Cube, CubeDimension, CubeJoin, CubeMeasure, CubeModel, CubeView, CubeViewEntry, DimensionMeta,
};
pub use namespace::{
    Constant, DerivedTable, Dimension, DimensionGroup, Explore, FieldSet, Join, Measure, Namespace,
    View,
};
pub use types::{CubeDimensionType, CubeMeasureType, DimensionType, MeasureType, Relationship};
