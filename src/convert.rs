//! End-to-end conversion between LookML and Cube.
//!
//! ```text
//! LookML files → Load → Namespace → map_views → cubes ─┐
//!                                 → map_explores ──────┴→ CubeModel → YAML
//!
//! Cube meta JSON → map_cube_model → Namespace → LookML files
//! ```
//!
//! # Example
//!
//! ```ignore
//! use lkml2cube::convert::{self, ConvertOptions};
//!
//! let options = ConvertOptions::default().with_root_dir("lookml");
//! let model = convert::views("lookml/explores/*.explore.lkml", &options)?;
//! println!("{}", model.to_yaml()?);
//! ```

use std::path::PathBuf;

use tracing::info;

use crate::config::SettingsError;
use crate::loader::{self, LoadError};
use crate::mapping::{self, MapOptions, MappingError};
use crate::meta::FetchError;
use crate::model::{CubeModel, Namespace};
use crate::output::OutputError;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during conversion.
#[derive(Debug, thiserror::Error)]
pub enum ConvertError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Mapping(#[from] MappingError),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    #[error(transparent)]
    Output(#[from] OutputError),
}

pub type ConvertResult<T> = Result<T, ConvertError>;

// ============================================================================
// Options
// ============================================================================

/// Options shared by the conversion commands.
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Directory absolute include paths resolve against.
    pub root_dir: Option<PathBuf>,

    /// Name Cube views after explores instead of their labels.
    pub use_explore_names: bool,
}

impl ConvertOptions {
    pub fn with_root_dir(mut self, root_dir: impl Into<PathBuf>) -> Self {
        self.root_dir = Some(root_dir.into());
        self
    }

    pub fn with_explore_names(mut self, use_explore_names: bool) -> Self {
        self.use_explore_names = use_explore_names;
        self
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

/// Load every LookML file matching `pattern`, following includes.
pub fn load(pattern: &str, options: &ConvertOptions) -> ConvertResult<Namespace> {
    Ok(loader::load_namespace(pattern, options.root_dir.as_deref())?)
}

/// Cubes for every view of a loaded namespace, with explore joins attached.
pub fn cubes_from(namespace: &Namespace) -> ConvertResult<CubeModel> {
    let cubes = mapping::map_views(namespace, &MapOptions::default())?;
    let cubes = if namespace.explores.is_empty() {
        cubes
    } else {
        mapping::attach_cube_joins(namespace, cubes)?
    };
    info!(cubes = cubes.len(), "mapped views to cubes");
    Ok(CubeModel {
        cubes,
        views: Vec::new(),
    })
}

/// Cubes plus one Cube view per explore of a loaded namespace.
pub fn views_from(namespace: &Namespace, options: &ConvertOptions) -> ConvertResult<CubeModel> {
    let map_options = MapOptions::default()
        .with_require_views(false)
        .with_explore_names(options.use_explore_names);
    let cubes = mapping::map_views(namespace, &map_options)?;
    let (cubes, views) = mapping::map_explores(namespace, cubes, &map_options)?;
    info!(cubes = cubes.len(), views = views.len(), "mapped explores to views");
    Ok(CubeModel { cubes, views })
}

/// `lkml2cube cubes`: LookML views to Cube cubes.
pub fn cubes(pattern: &str, options: &ConvertOptions) -> ConvertResult<CubeModel> {
    let namespace = load(pattern, options)?;
    cubes_from(&namespace)
}

/// `lkml2cube views`: LookML explores to Cube cubes and views.
pub fn views(pattern: &str, options: &ConvertOptions) -> ConvertResult<CubeModel> {
    let namespace = load(pattern, options)?;
    views_from(&namespace, options)
}

/// `lkml2cube explores`: a Cube meta document to LookML.
pub fn explores(meta: &serde_json::Value) -> ConvertResult<Namespace> {
    let namespace = mapping::map_cube_model(meta)?;
    info!(
        views = namespace.views.len(),
        explores = namespace.explores.len(),
        "mapped Cube meta to LookML"
    );
    Ok(namespace)
}

/// Fetch the meta document from a Cube deployment and convert it.
pub fn explores_from_url(url: &str, token: &str) -> ConvertResult<Namespace> {
    let meta = crate::meta::fetch_meta(url, token)?;
    explores(&meta)
}
