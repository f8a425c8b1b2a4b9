// manifestrs/src/sync/roots.rs

use crate::manifest::{Component, ComponentId, Manifest};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashSet};

/// A root component as seen by the entry point generator
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RootComponent {
    pub id: ComponentId,
    pub display_name: String,

    /// Handler wired to the component's click event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_click_handler: Option<String>,
}

/// Ids of components that no other component lists as a child
pub fn find_root_component_ids(
    components: &BTreeMap<ComponentId, Component>,
) -> BTreeSet<ComponentId> {
    let child_ids: HashSet<&str> = components
        .values()
        .flat_map(|component| component.children.iter().map(String::as_str))
        .collect();

    components
        .keys()
        .filter(|id| !child_ids.contains(id.as_str()))
        .cloned()
        .collect()
}

/// Root components of a manifest, ordered by id.
///
/// A root whose `onClick` event is bound to a flow in the manifest's logic
/// context gets that flow's handler name.
pub fn root_components(manifest: &Manifest) -> Vec<RootComponent> {
    let logic = manifest.logic_context();

    find_root_component_ids(&manifest.components)
        .into_iter()
        .filter_map(|id| manifest.components.get(&id))
        .map(|component| {
            let on_click_handler = component
                .flow_for_event("onClick")
                .and_then(|flow_id| logic.and_then(|logic| logic.flow(flow_id)))
                .map(|flow| flow.handler_name());

            RootComponent {
                id: component.id.clone(),
                display_name: component.display_name.clone(),
                on_click_handler,
            }
        })
        .collect()
}
