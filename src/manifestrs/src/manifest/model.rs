// manifestrs/src/manifest/model.rs

use crate::manifest::component::{Component, ComponentId};
use crate::manifest::logic::LogicContext;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Complete declarative description of a project's component tree
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Component id -> definition
    #[serde(default)]
    pub components: BTreeMap<ComponentId, Component>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logic: Option<LogicContext>,
}

impl Manifest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a component keyed by its own id
    pub fn with_component(mut self, component: Component) -> Self {
        self.insert(component);
        self
    }

    pub fn with_logic(mut self, logic: LogicContext) -> Self {
        self.logic = Some(logic);
        self
    }

    pub fn insert(&mut self, component: Component) {
        self.components.insert(component.id.clone(), component);
    }

    pub fn component(&self, id: &str) -> Option<&Component> {
        self.components.get(id)
    }

    /// Logic context, only when it actually carries state or flows
    pub fn logic_context(&self) -> Option<&LogicContext> {
        self.logic.as_ref().filter(|logic| !logic.is_empty())
    }

    /// Make every component's `id` agree with its map key, which is what
    /// change detection uses
    fn normalize_ids(&mut self, path: &Path) {
        for (key, component) in self.components.iter_mut() {
            if key != &component.id {
                log::warn!(
                    "{}: component keyed '{}' declares id '{}'; using the key",
                    path.display(),
                    key,
                    component.id
                );
                component.id = key.clone();
            }
        }
    }
}

impl TryFrom<&Path> for Manifest {
    type Error = anyhow::Error;

    fn try_from(path: &Path) -> anyhow::Result<Self> {
        let content = fs_err::read_to_string(path)
            .context(format!("Error reading {} to string.", path.display()))?;

        let is_yaml = matches!(
            path.extension().and_then(|ext| ext.to_str()),
            Some("yml") | Some("yaml")
        );

        let mut manifest = if is_yaml {
            serde_saphyr::from_str::<Manifest>(&content)
                .context(format!("Error parsing YAML manifest: {}", path.display()))?
        } else {
            serde_json::from_str::<Manifest>(&content)
                .context(format!("Error parsing JSON manifest: {}", path.display()))?
        };

        manifest.normalize_ids(path);
        Ok(manifest)
    }
}

impl TryFrom<&PathBuf> for Manifest {
    type Error = anyhow::Error;

    fn try_from(path: &PathBuf) -> anyhow::Result<Self> {
        Self::try_from(path.as_path())
    }
}
