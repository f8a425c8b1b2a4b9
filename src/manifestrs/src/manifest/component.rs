// manifestrs/src/manifest/component.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Stable identifier of a component inside a manifest
pub type ComponentId = String;

/// A node in the UI tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Component {
    pub id: ComponentId,

    pub display_name: String,

    /// Element or type tag (e.g. "div", "button", "Card")
    #[serde(rename = "type")]
    pub element_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default)]
    pub properties: BTreeMap<String, PropertyDefinition>,

    #[serde(default)]
    pub styling: Styling,

    /// Ordered child component ids. Ids that do not resolve are skipped.
    #[serde(default)]
    pub children: Vec<ComponentId>,

    /// Event name -> bound logic flow
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub events: Option<BTreeMap<String, EventBinding>>,

    pub metadata: ComponentMetadata,
}

/// Primitive data types a property value can declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    String,
    Number,
    Boolean,
    Object,
    Array,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum PropertyDefinition {
    /// A fixed value baked into the generated component
    #[serde(rename_all = "camelCase")]
    Static { value: Value, data_type: DataType },

    /// A prop exposed on the generated component's interface
    #[serde(rename_all = "camelCase")]
    Prop {
        data_type: DataType,
        #[serde(default)]
        required: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        default: Option<Value>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        options: Option<Vec<Value>>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Styling {
    /// Utility class names, in order
    #[serde(default)]
    pub base_classes: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inline_styles: Option<BTreeMap<String, String>>,

    /// Condition expression -> classes applied when it holds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conditional_classes: Option<BTreeMap<String, Vec<String>>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventBinding {
    pub flow_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComponentMetadata {
    pub created_at: DateTime<Utc>,

    /// Bumped on every save; ignored by change detection
    pub updated_at: DateTime<Utc>,

    #[serde(default = "default_author")]
    pub author: String,

    #[serde(default = "default_version")]
    pub version: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

fn default_author() -> String {
    "user".to_string()
}

fn default_version() -> String {
    "1.0.0".to_string()
}

impl Component {
    /// Create a bare component with fresh metadata
    pub fn new(
        id: impl Into<String>,
        display_name: impl Into<String>,
        element_type: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: id.into(),
            display_name: display_name.into(),
            element_type: element_type.into(),
            category: None,
            properties: BTreeMap::new(),
            styling: Styling::default(),
            children: Vec::new(),
            events: None,
            metadata: ComponentMetadata {
                created_at: now,
                updated_at: now,
                author: default_author(),
                version: default_version(),
                description: None,
            },
        }
    }

    /// Stamp both metadata timestamps with `at`.
    ///
    /// `createdAt` is hashed, so two components built by `new` at different
    /// instants differ even when everything else matches.
    pub fn with_timestamps(mut self, at: DateTime<Utc>) -> Self {
        self.metadata.created_at = at;
        self.metadata.updated_at = at;
        self
    }

    pub fn with_children<I, S>(mut self, children: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.children = children.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_property(
        mut self,
        name: impl Into<String>,
        definition: PropertyDefinition,
    ) -> Self {
        self.properties.insert(name.into(), definition);
        self
    }

    pub fn with_event(mut self, event: impl Into<String>, flow_id: impl Into<String>) -> Self {
        let binding = EventBinding {
            flow_id: flow_id.into(),
        };
        self.events
            .get_or_insert_with(BTreeMap::new)
            .insert(event.into(), binding);
        self
    }

    /// Flow bound to `event`, if any
    pub fn flow_for_event(&self, event: &str) -> Option<&str> {
        self.events
            .as_ref()
            .and_then(|events| events.get(event))
            .map(|binding| binding.flow_id.as_str())
    }
}

impl PropertyDefinition {
    /// Shorthand for a static string value
    pub fn text(value: impl Into<String>) -> Self {
        PropertyDefinition::Static {
            value: Value::String(value.into()),
            data_type: DataType::String,
        }
    }

    pub fn data_type(&self) -> DataType {
        match self {
            PropertyDefinition::Static { data_type, .. } => *data_type,
            PropertyDefinition::Prop { data_type, .. } => *data_type,
        }
    }
}
