//! Declarative description of a system, loaded from a single file.
//!
//! ```yaml
//! name: shop
//! config: config.yaml
//! components:
//!   - name: db
//!     value: { url: "pg://localhost" }
//!     depends_on: [config]
//!   - name: api
//!     depends_on: [db, { component: config, source: "", destination: settings }]
//! ```
//!
//! A component without `value` is a grouping node whose started value is its
//! dependency bag.
use std::path::{Path, PathBuf};

use serde::Deserialize;

use keel_core::config::load_config;
use keel_core::{
    DependencySpec, FileConfig, RegisterOptions, Result, Runnable, System, SystemOptions, Value,
};

#[derive(Debug, Clone, Deserialize)]
pub struct Manifest {
    /// System name; generated when absent
    #[serde(default)]
    pub name: Option<String>,
    /// Configuration file, relative to the manifest
    #[serde(default)]
    pub config: Option<PathBuf>,
    #[serde(default)]
    pub components: Vec<ComponentEntry>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ComponentEntry {
    pub name: String,
    #[serde(default)]
    pub value: Option<Value>,
    #[serde(default)]
    pub scoped: bool,
    #[serde(default)]
    pub depends_on: Vec<DependencySpec>,
}

impl Manifest {
    /// Read a manifest, picking the format from the file extension
    pub async fn load(path: &Path) -> Result<Self> {
        let document = load_config(path).await?;
        let mut manifest: Manifest = document.decode()?;
        if let Some(config) = manifest.config.take() {
            let base = path.parent().unwrap_or_else(|| Path::new(""));
            manifest.config = Some(base.join(config));
        }
        Ok(manifest)
    }

    /// Build a system holding every definition of the manifest
    pub fn build(&self) -> Result<System> {
        let options = match &self.name {
            Some(name) => SystemOptions::named(name.clone()),
            None => SystemOptions::default(),
        };
        let system = System::with_options(options);

        if let Some(path) = &self.config {
            log::debug!("Using configuration file {}", path.display());
            system.configure(Runnable::component(FileConfig::new(path)))?;
        }

        for entry in &self.components {
            let runnable = match &entry.value {
                Some(value) => Runnable::value(value.clone()),
                None => Runnable::Identity,
            };
            let options = RegisterOptions {
                scoped: entry.scoped,
            };
            system
                .register_with(&entry.name, runnable, options)?
                .depends_on(entry.depends_on.iter().cloned())?;
        }
        Ok(system)
    }
}
