//! Translation between the LookML namespace and the Cube model.
//!
//! - [`views`]: LookML views to cubes.
//! - [`explores`]: LookML explores to cube joins and composite views, with
//!   multi-hop paths resolved over a [`join_graph::JoinGraph`].
//! - [`reverse`]: Cube meta API documents back to LookML.
//!
//! All mapping functions are pure: they take their input by reference and
//! return new values. Errors abort the whole translation; there is no
//! partial result.

pub mod explores;
pub mod join_graph;
pub mod naming;
pub mod reverse;
pub mod views;

pub use explores::{attach_cube_joins, map_explores};
pub use join_graph::{JoinGraph, JoinPath};
pub use naming::{is_display_name, snake_case};
pub use reverse::map_cube_model;
pub use views::map_views;

use thiserror::Error;

/// Errors raised while translating between dialects.
#[derive(Debug, Error, PartialEq)]
pub enum MappingError {
    #[error("Missing '{attribute}' in {context}")]
    MissingAttribute { context: String, attribute: String },

    #[error("Unsupported {kind} type '{type_name}' in {context}")]
    UnsupportedType {
        kind: String,
        type_name: String,
        context: String,
    },

    #[error("Invalid value for '{attribute}' in {context}: {message}")]
    InvalidAttribute {
        context: String,
        attribute: String,
        message: String,
    },

    #[error("View '{view}' declares more than one primary key ('{first}' and '{second}')")]
    DuplicatePrimaryKey {
        view: String,
        first: String,
        second: String,
    },

    #[error("No LookML views found")]
    NoViews,

    #[error("No LookML explores found; explores are required to generate Cube views")]
    NoExplores,

    #[error("Explore '{explore}' references unknown view '{target}'")]
    UnknownJoinTarget { explore: String, target: String },

    #[error("No join path from '{from}' to '{to}'")]
    UnreachableJoinTarget { from: String, to: String },

    #[error("Join '{join}' in explore '{explore}' must reference exactly two views: {condition}")]
    InvalidJoinCondition {
        explore: String,
        join: String,
        condition: String,
    },

    #[error("Empty response from the Cube meta API")]
    NoResponse,

    #[error("Invalid Cube meta document: {0}")]
    InvalidMeta(String),
}

/// Result type for mapping operations.
pub type MappingResult<T> = Result<T, MappingError>;

/// Options shared by the forward mappers.
#[derive(Debug, Clone)]
pub struct MapOptions {
    /// Fail with [`MappingError::NoViews`] when the namespace has no views.
    pub require_views: bool,
    /// Name composite views after the explore instead of its label.
    pub use_explore_names: bool,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            require_views: true,
            use_explore_names: false,
        }
    }
}

impl MapOptions {
    pub fn with_require_views(mut self, require: bool) -> Self {
        self.require_views = require;
        self
    }

    pub fn with_explore_names(mut self, use_names: bool) -> Self {
        self.use_explore_names = use_names;
        self
    }
}

/// Rewrite LookML interpolation to Cube's: `${TABLE}` becomes `{CUBE}`,
/// every other `${` becomes `{`.
pub fn to_cube_sql(sql: &str) -> String {
    sql.replace("${TABLE}", "{CUBE}").replace("${", "{")
}

/// Rewrite Cube interpolation to LookML's: `{CUBE}` becomes `${TABLE}`,
/// every other `{` becomes `${`. Already-LookML input is left as it is.
pub fn to_lookml_sql(sql: &str) -> String {
    sql.replace("${", "{")
        .replace("{CUBE}", "{TABLE}")
        .replace('{', "${")
}
