//! Writing generated models to disk.
//!
//! Cube output goes to one YAML file per cube and per view:
//!
//! ```text
//! <dir>/cubes/<name>.yml   cubes: [ <cube> ]
//! <dir>/views/<name>.yml   views: [ <view> ]
//! ```
//!
//! LookML output mirrors the usual project layout:
//!
//! ```text
//! <dir>/views/<name>.view.lkml
//! <dir>/explores/<name>.explore.lkml
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::lookml::writer::{explore_includes, render_explore, render_view};
use crate::model::{Cube, CubeModel, CubeView, Namespace};

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialise '{name}': {source}")]
    Yaml {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type OutputResult<T> = Result<T, OutputError>;

/// Files written by one command, grouped by section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub cubes: Vec<SummaryRow>,
    pub views: Vec<SummaryRow>,
    pub explores: Vec<SummaryRow>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub name: String,
    pub path: PathBuf,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.cubes.is_empty() && self.views.is_empty() && self.explores.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cubes.len() + self.views.len() + self.explores.len()
    }
}

impl std::fmt::Display for Summary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (title, rows) in [
            ("Cubes", &self.cubes),
            ("Views", &self.views),
            ("Explores", &self.explores),
        ] {
            if rows.is_empty() {
                continue;
            }
            writeln!(f, "{}:", title)?;
            for row in rows {
                writeln!(f, "  {:<30} {}", row.name, row.path.display())?;
            }
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct CubeFile<'a> {
    cubes: [&'a Cube; 1],
}

#[derive(Serialize)]
struct ViewFile<'a> {
    views: [&'a CubeView; 1],
}

fn write_file(path: &Path, contents: &str) -> OutputResult<()> {
    let io_err = |source| OutputError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(io_err)?;
    }
    fs::write(path, contents).map_err(io_err)?;
    debug!(path = %path.display(), "wrote file");
    Ok(())
}

fn to_yaml<T: Serialize>(name: &str, value: &T) -> OutputResult<String> {
    serde_yaml::to_string(value).map_err(|source| OutputError::Yaml {
        name: name.to_string(),
        source,
    })
}

/// Write one YAML file per cube and per view under `dir`.
pub fn write_cube_files(model: &CubeModel, dir: &Path) -> OutputResult<Summary> {
    let mut summary = Summary::default();

    for cube in &model.cubes {
        let path = dir.join("cubes").join(format!("{}.yml", cube.name));
        write_file(&path, &to_yaml(&cube.name, &CubeFile { cubes: [cube] })?)?;
        summary.cubes.push(SummaryRow {
            name: cube.name.clone(),
            path,
        });
    }

    for view in &model.views {
        let path = dir.join("views").join(format!("{}.yml", view.name));
        write_file(&path, &to_yaml(&view.name, &ViewFile { views: [view] })?)?;
        summary.views.push(SummaryRow {
            name: view.name.clone(),
            path,
        });
    }

    Ok(summary)
}

/// Write LookML view and explore files under `dir`.
pub fn write_lookml_files(namespace: &Namespace, dir: &Path) -> OutputResult<Summary> {
    let mut summary = Summary::default();

    for view in &namespace.views {
        let path = dir.join("views").join(format!("{}.view.lkml", view.name));
        write_file(&path, &render_view(view))?;
        summary.views.push(SummaryRow {
            name: view.name.clone(),
            path,
        });
    }

    for explore in &namespace.explores {
        let path = dir
            .join("explores")
            .join(format!("{}.explore.lkml", explore.name));
        let includes = explore_includes(explore, namespace);
        write_file(&path, &render_explore(explore, &includes))?;
        summary.explores.push(SummaryRow {
            name: explore.name.clone(),
            path,
        });
    }

    Ok(summary)
}

/// Render a whole namespace as one LookML text, views first.
pub fn render_lookml(namespace: &Namespace) -> String {
    let views = namespace.views.iter().map(render_view);
    let explores = namespace
        .explores
        .iter()
        .map(|e| render_explore(e, &explore_includes(e, namespace)));
    views.chain(explores).collect::<Vec<_>>().join("\n")
}
