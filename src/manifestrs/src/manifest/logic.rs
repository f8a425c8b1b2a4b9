// manifestrs/src/manifest/logic.rs

use crate::manifest::component::DataType;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Page-level state and logic flows consumed by the entry point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicContext {
    #[serde(default)]
    pub page_state: Vec<StateVariable>,

    #[serde(default)]
    pub flows: Vec<LogicFlow>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateVariable {
    pub name: String,
    pub data_type: DataType,
    #[serde(default)]
    pub initial_value: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogicFlow {
    pub id: String,
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trigger: Option<FlowTrigger>,

    /// Opaque node list; interpreted by the generator only
    #[serde(default)]
    pub nodes: Vec<Value>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlowTrigger {
    pub component_id: String,
    pub event: String,
}

impl LogicContext {
    pub fn is_empty(&self) -> bool {
        self.page_state.is_empty() && self.flows.is_empty()
    }

    pub fn flow(&self, id: &str) -> Option<&LogicFlow> {
        self.flows.iter().find(|flow| flow.id == id)
    }
}

impl LogicFlow {
    /// Name of the handler function the entry point declares for this flow
    pub fn handler_name(&self) -> String {
        let mut name = String::from("handle");
        let mut upper = true;
        for c in self.name.chars() {
            if c.is_ascii_alphanumeric() {
                if upper {
                    name.push(c.to_ascii_uppercase());
                    upper = false;
                } else {
                    name.push(c);
                }
            } else {
                upper = true;
            }
        }
        if name.len() == "handle".len() {
            name.push_str("Flow");
        }
        name
    }
}
