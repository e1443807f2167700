//! Cube semantic-layer model.
//!
//! Field order and skipped empties follow the YAML layout Cube reads, so a
//! serialised [`CubeModel`] can be dropped straight into a Cube project.

use serde::{Deserialize, Serialize};

use super::types::{CubeDimensionType, CubeMeasureType, Relationship};

/// A full Cube document: `cubes` plus composite `views`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CubeModel {
    pub cubes: Vec<Cube>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<CubeView>,
}

impl CubeModel {
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    pub fn cube(&self, name: &str) -> Option<&Cube> {
        self.cubes.iter().find(|c| c.name == name)
    }

    pub fn view(&self, name: &str) -> Option<&CubeView> {
        self.views.iter().find(|v| v.name == name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Cube {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql_table: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extends: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shown: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub joins: Vec<CubeJoin>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dimensions: Vec<CubeDimension>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub measures: Vec<CubeMeasure>,
}

impl Cube {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn has_join(&self, target: &str) -> bool {
        self.joins.iter().any(|j| j.name == target)
    }

    pub fn primary_key(&self) -> Option<&CubeDimension> {
        self.dimensions.iter().find(|d| d.primary_key == Some(true))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CubeDimension {
    pub name: String,
    pub sql: String,
    #[serde(rename = "type")]
    pub dimension_type: CubeDimensionType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub primary_key: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<DimensionMeta>,
}

/// Extra metadata Cube carries through untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionMeta {
    pub tiers: Vec<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CubeMeasure {
    pub name: String,
    #[serde(rename = "type")]
    pub measure_type: CubeMeasureType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sql: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub drill_members: Vec<String>,
}

/// A direct join from the owning cube to `name`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CubeJoin {
    pub name: String,
    pub relationship: Relationship,
    pub sql: String,
    /// Dot-separated path from the explore's base cube. Cube derives this
    /// itself, so it is kept for callers but not written out.
    #[serde(skip)]
    pub join_path: String,
}

/// A composite model grouping cubes reachable from one base cube.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CubeView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub cubes: Vec<CubeViewEntry>,
}

impl CubeView {
    pub fn entry(&self, cube_name: &str) -> Option<&CubeViewEntry> {
        self.cubes.iter().find(|c| c.cube_name == cube_name)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CubeViewEntry {
    pub join_path: String,
    pub includes: String,
    #[serde(rename = "alias")]
    pub cube_name: String,
}

impl CubeViewEntry {
    /// Include every member of the cube reached through `join_path`.
    pub fn all_members(cube_name: impl Into<String>, join_path: impl Into<String>) -> Self {
        Self {
            join_path: join_path.into(),
            includes: "*".to_string(),
            cube_name: cube_name.into(),
        }
    }
}
