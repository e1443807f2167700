//! Configuration for lkml2cube.
//!
//! Handles the settings file and environment variable expansion.

mod settings;

pub use settings::{
    expand_env_vars, LoaderSettings, MetaSettings, OutputSettings, Settings, SettingsError,
    ViewsSettings,
};
