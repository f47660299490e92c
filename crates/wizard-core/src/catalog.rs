//! Action catalog
//!
//! A read-only list of actions grouped into screens, loaded once at startup
//! from TOML:
//!
//! ```toml
//! [[screens]]
//! title = "Developer tools"
//!
//! [[screens.actions]]
//! id = "install-rust"
//! title = "Install Rust"
//! script = "curl https://sh.rustup.rs -sSf | sh"
//! ```

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use tracing::info;

/// A predefined maintenance action
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Optional longer explanation
    #[serde(default)]
    pub description: Option<String>,
    /// Shell source, possibly empty
    #[serde(default)]
    pub script: String,
}

impl Action {
    /// Whether there is anything to execute
    #[must_use]
    pub fn has_script(&self) -> bool {
        !self.script.trim().is_empty()
    }
}

/// A group of actions shown together
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Screen {
    /// Display title
    pub title: String,
    /// Optional longer explanation
    #[serde(default)]
    pub description: Option<String>,
    /// Actions on this screen
    #[serde(default)]
    pub actions: Vec<Action>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    screens: Vec<Screen>,
}

/// Immutable catalog of screens and their actions
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    screens: Vec<Screen>,
    /// action id -> (screen index, action index)
    index: HashMap<String, (usize, usize)>,
}

impl ActionCatalog {
    /// Build a catalog, rejecting empty or duplicate action IDs
    pub fn new(screens: Vec<Screen>) -> Result<Self> {
        let mut index = HashMap::new();
        for (s, screen) in screens.iter().enumerate() {
            for (a, action) in screen.actions.iter().enumerate() {
                if action.id.trim().is_empty() {
                    return Err(Error::Configuration(format!(
                        "action '{}' on screen '{}' has an empty id",
                        action.title, screen.title
                    )));
                }
                if index.insert(action.id.clone(), (s, a)).is_some() {
                    return Err(Error::Configuration(format!(
                        "duplicate action id '{}'",
                        action.id
                    )));
                }
            }
        }
        Ok(Self { screens, index })
    }

    /// Parse a catalog from TOML source
    pub fn from_toml_str(source: &str) -> Result<Self> {
        let file: CatalogFile = toml::from_str(source)
            .map_err(|e| Error::Configuration(format!("invalid action catalog: {}", e)))?;
        Self::new(file.screens)
    }

    /// Load a catalog from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            Error::Configuration(format!(
                "failed to read action catalog {}: {}",
                path.display(),
                e
            ))
        })?;
        let catalog = Self::from_toml_str(&source)?;
        info!(
            path = %path.display(),
            screens = catalog.screens.len(),
            actions = catalog.len(),
            "Action catalog loaded"
        );
        Ok(catalog)
    }

    /// All screens in declaration order
    #[must_use]
    pub fn screens(&self) -> &[Screen] {
        &self.screens
    }

    /// Screen by position
    #[must_use]
    pub fn screen(&self, idx: usize) -> Option<&Screen> {
        self.screens.get(idx)
    }

    /// Find an action by ID
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<&Action> {
        let &(s, a) = self.index.get(id)?;
        self.screens.get(s)?.actions.get(a)
    }

    /// Every action across all screens
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.screens.iter().flat_map(|screen| screen.actions.iter())
    }

    /// Number of actions
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Whether the catalog has no actions
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}
