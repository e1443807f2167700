//! LookML project loading.
//!
//! A load starts from a glob pattern, parses every matching file, follows
//! `include:` directives depth-first and merges everything into one
//! [`Namespace`]. Constants are substituted once the whole tree is merged,
//! since a constant may be declared in one file and used in another.
//!
//! # Example
//!
//! ```rust,ignore
//! use lkml2cube::loader::load_namespace;
//!
//! let namespace = load_namespace("models/*.model.lkml", Some(Path::new("project/")))?;
//! println!("{} views", namespace.views.len());
//! ```

pub mod constants;

pub use constants::{collect_constants, substitute_constants};

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::lookml::{self, Node};
use crate::model::Namespace;

/// Errors that can occur when loading LookML.
#[derive(Debug, Error)]
pub enum LoadError {
    /// The entry pattern matched no files
    #[error("No files match pattern: {pattern}")]
    Resolution { pattern: String },

    #[error("Invalid file pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// LookML syntax error
    #[error("Parse error in {file}: {message}")]
    Parse { file: String, message: String },

    /// The merged document does not have the expected shape
    #[error("Invalid LookML in {file}: {message}")]
    Schema { file: String, message: String },
}

/// Result type for loading operations.
pub type LoadResult<T> = Result<T, LoadError>;

/// State for one top-level load.
///
/// Owns the set of files already merged, so mutually including files are
/// each read exactly once. A new session starts empty; nothing is shared
/// between loads.
#[derive(Debug, Default)]
pub struct LoadSession {
    root_dir: Option<PathBuf>,
    visited: HashSet<PathBuf>,
}

impl LoadSession {
    /// Includes resolve against `root_dir` when given, otherwise against
    /// the directory of the including file.
    pub fn new(root_dir: Option<&Path>) -> Self {
        Self {
            root_dir: root_dir.map(Path::to_path_buf),
            visited: HashSet::new(),
        }
    }

    /// Number of distinct files merged so far.
    pub fn visited_count(&self) -> usize {
        self.visited.len()
    }

    /// Load every file matching `pattern` into `merged`.
    ///
    /// Returns how many files the pattern matched, including files skipped
    /// because they were already loaded.
    pub fn load_pattern(&mut self, pattern: &str, merged: &mut Node) -> LoadResult<usize> {
        let paths = glob::glob(pattern).map_err(|e| LoadError::InvalidPattern {
            pattern: pattern.to_string(),
            message: e.to_string(),
        })?;

        let mut matched = 0;
        for entry in paths {
            let path = entry.map_err(|e| LoadError::Io {
                path: e.path().display().to_string(),
                source: e.into_error(),
            })?;
            if !path.is_file() {
                continue;
            }
            matched += 1;
            self.load_file(&path, merged)?;
        }
        Ok(matched)
    }

    fn load_file(&mut self, path: &Path, merged: &mut Node) -> LoadResult<()> {
        let canonical = std::fs::canonicalize(path).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        if !self.visited.insert(canonical.clone()) {
            debug!(file = %path.display(), "already loaded; skipping");
            return Ok(());
        }
        debug!(file = %path.display(), "loading LookML file");

        let result = lookml::parse_file(&canonical).map_err(|source| LoadError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let document = match result.document {
            Some(doc) if result.diagnostics.is_empty() => doc,
            _ => {
                return Err(LoadError::Parse {
                    file: path.display().to_string(),
                    message: result.message(),
                })
            }
        };

        // Included files land before the including file's own entities
        let includes: Vec<String> = document
            .get("includes")
            .and_then(Node::as_sequence)
            .unwrap_or_default()
            .iter()
            .filter_map(|n| n.as_str().map(str::to_string))
            .collect();
        for include in includes {
            let pattern = self.include_pattern(&include, &canonical);
            let matched = self.load_pattern(&pattern, merged)?;
            if matched == 0 {
                warn!(
                    file = %path.display(),
                    include = %include,
                    "include matched no files; skipping"
                );
            }
        }

        merge_document(merged, document, &path.display().to_string());
        Ok(())
    }

    /// Turn an `include:` value into a glob pattern on disk.
    fn include_pattern(&self, include: &str, including_file: &Path) -> String {
        let mut relative = include.trim_start_matches('/').to_string();
        if [".view", ".explore", ".model"]
            .iter()
            .any(|suffix| relative.ends_with(suffix))
        {
            relative.push_str(".lkml");
        }

        let base = match &self.root_dir {
            Some(root) => root.clone(),
            None => including_file
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        };
        base.join(relative).to_string_lossy().into_owned()
    }
}

/// Merge one parsed file into the accumulated tree.
fn merge_document(merged: &mut Node, document: Node, file: &str) {
    let Node::Mapping(entries) = document else {
        return;
    };
    for (key, value) in entries {
        match key.as_str() {
            "views" | "explores" | "constants" => {
                if let Node::Sequence(items) = value {
                    merged.extend_sequence(&key, items);
                }
            }
            "includes" => {
                let existing: Vec<Node> = merged
                    .get("includes")
                    .and_then(Node::as_sequence)
                    .map(<[Node]>::to_vec)
                    .unwrap_or_default();
                let fresh: Vec<Node> = value
                    .as_sequence()
                    .unwrap_or_default()
                    .iter()
                    .filter(|n| !existing.contains(n))
                    .cloned()
                    .collect();
                merged.extend_sequence("includes", fresh);
            }
            "connection" => {}
            other => warn!(file, key = other, "LookML key not supported yet; skipping"),
        }
    }
}

/// Decode the merged tree after constant substitution.
fn finish(merged: &Node, source_name: &str) -> LoadResult<Namespace> {
    let substituted = substitute_constants(merged);
    let namespace = Namespace::from_node(&substituted).map_err(|e| LoadError::Schema {
        file: source_name.to_string(),
        message: e.to_string(),
    })?;
    debug!(
        views = namespace.views.len(),
        explores = namespace.explores.len(),
        constants = namespace.constants.len(),
        "namespace loaded"
    );
    Ok(namespace)
}

/// Load every file matching `pattern` and its transitive includes.
///
/// # Errors
///
/// [`LoadError::Resolution`] when the pattern matches no file; parse and IO
/// errors of any file reached are returned as-is.
pub fn load_namespace(pattern: &str, root_dir: Option<&Path>) -> LoadResult<Namespace> {
    let mut session = LoadSession::new(root_dir);
    let mut merged = Node::mapping();
    if session.load_pattern(pattern, &mut merged)? == 0 {
        return Err(LoadError::Resolution {
            pattern: pattern.to_string(),
        });
    }
    finish(&merged, pattern)
}

/// Load a single in-memory LookML document. Includes are not followed.
pub fn load_namespace_from_str(source: &str, name: &str) -> LoadResult<Namespace> {
    let result = lookml::parse(source);
    let document = match result.document {
        Some(doc) if result.diagnostics.is_empty() => doc,
        _ => {
            return Err(LoadError::Parse {
                file: name.to_string(),
                message: result.message(),
            })
        }
    };
    let mut merged = Node::mapping();
    merge_document(&mut merged, document, name);
    finish(&merged, name)
}
