// manifestrs/src/codegen/react.rs

use crate::codegen::CodeGenerator;
use crate::config::settings::{component_file_stem, PathsConfig};
use crate::error::{ManifestrsError, Result};
use crate::manifest::{Component, DataType, LogicContext, Manifest, PropertyDefinition};
use crate::sync::RootComponent;
use serde_json::Value;
use std::collections::BTreeSet;
use std::fmt::Write;
use std::path::Path;

/// Static property rendered as element content instead of an attribute
const TEXT_PROPERTY: &str = "text";

/// Minimal React/TSX templates
#[derive(Debug, Clone)]
pub struct ReactGenerator {
    /// Import prefix of component files as seen from the entry point
    components_import: String,
    /// Import path of the entry point as seen from the bootstrap file
    entry_import: String,
}

impl ReactGenerator {
    pub fn new(paths: &PathsConfig) -> Self {
        let entry_dir = paths.entry_point.parent().unwrap_or(Path::new(""));
        let components_import = match paths.components_dir.strip_prefix(entry_dir) {
            Ok(rel) if !rel.as_os_str().is_empty() => format!("./{}", to_import_path(rel)),
            _ => "./components".to_string(),
        };

        let entry_stem = paths
            .entry_point
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("App");

        Self {
            components_import,
            entry_import: format!("./{}", entry_stem),
        }
    }
}

impl Default for ReactGenerator {
    fn default() -> Self {
        Self::new(&PathsConfig::default())
    }
}

impl CodeGenerator for ReactGenerator {
    fn generate_component(&self, component: &Component, manifest: &Manifest) -> Result<String> {
        if component.display_name.trim().is_empty() {
            return Err(ManifestrsError::generator(&component.id, "component has no display name"));
        }
        if !is_element_tag(&component.element_type) {
            return Err(ManifestrsError::generator(
                &component.id,
                format!("invalid element type {:?}", component.element_type),
            ));
        }

        let name = component_file_stem(&component.display_name);

        // Children that resolve, in order; dangling ids are dropped
        let children: Vec<&Component> = component
            .children
            .iter()
            .filter(|id| **id != component.id)
            .filter_map(|id| {
                let child = manifest.component(id);
                if child.is_none() {
                    log::debug!("{}: skipping missing child {}", component.id, id);
                }
                child
            })
            .collect();

        let mut out = String::new();
        out.push_str("import React from 'react';\n");
        let imports: BTreeSet<String> = children
            .iter()
            .map(|child| component_file_stem(&child.display_name))
            .collect();
        for stem in &imports {
            let _ = writeln!(out, "import {} from './{}';", stem, stem);
        }
        out.push('\n');

        // Props interface
        let events: Vec<&String> = component
            .events
            .as_ref()
            .map(|events| events.keys().collect())
            .unwrap_or_default();
        let _ = writeln!(out, "export interface {}Props {{", name);
        for (prop, definition) in &component.properties {
            if let PropertyDefinition::Prop { data_type, required, .. } = definition {
                let optional = if *required { "" } else { "?" };
                let _ = writeln!(out, "  {}{}: {};", prop, optional, ts_type(*data_type));
            }
        }
        for event in &events {
            let _ = writeln!(out, "  {}?: () => void;", event);
        }
        out.push_str("}\n\n");

        // Signature with destructured props and defaults
        let mut params: Vec<String> = Vec::new();
        for (prop, definition) in &component.properties {
            if let PropertyDefinition::Prop { default, .. } = definition {
                match default {
                    Some(value) => params.push(format!("{} = {}", prop, value)),
                    None => params.push(prop.clone()),
                }
            }
        }
        params.extend(events.iter().map(|event| event.to_string()));
        let _ = writeln!(
            out,
            "export default function {}({{ {} }}: {}Props) {{",
            name,
            params.join(", "),
            name
        );

        // Opening tag
        let mut attributes: Vec<String> = Vec::new();
        if let Some(class_name) = class_name_attribute(component) {
            attributes.push(class_name);
        }
        if let Some(styles) = &component.styling.inline_styles {
            if !styles.is_empty() {
                let style = serde_json::to_string(styles)?;
                attributes.push(format!("style={{{}}}", style));
            }
        }
        let mut text = None;
        for (prop, definition) in &component.properties {
            match definition {
                PropertyDefinition::Static { value, .. } if prop == TEXT_PROPERTY => {
                    text = Some(value);
                }
                PropertyDefinition::Static { value, .. } => {
                    attributes.push(format!("{}={{{}}}", prop, value));
                }
                PropertyDefinition::Prop { .. } => {
                    attributes.push(format!("{}={{{}}}", prop, prop));
                }
            }
        }
        for event in &events {
            attributes.push(format!("{}={{{}}}", event, event));
        }

        let tag = &component.element_type;
        let open = if attributes.is_empty() {
            format!("<{}", tag)
        } else {
            format!("<{} {}", tag, attributes.join(" "))
        };

        out.push_str("  return (\n");
        if text.is_none() && children.is_empty() {
            let _ = writeln!(out, "    {} />", open);
        } else {
            let _ = writeln!(out, "    {}>", open);
            if let Some(value) = text {
                let _ = writeln!(out, "      {{{}}}", value);
            }
            for child in &children {
                let _ = writeln!(
                    out,
                    "      <{} />",
                    component_file_stem(&child.display_name)
                );
            }
            let _ = writeln!(out, "    </{}>", tag);
        }
        out.push_str("  );\n}\n");

        Ok(out)
    }

    fn generate_entry_point(
        &self,
        roots: &[RootComponent],
        logic: Option<&LogicContext>,
    ) -> Result<String> {
        let has_state = logic.map_or(false, |logic| !logic.page_state.is_empty());

        let mut out = String::new();
        if has_state {
            out.push_str("import React, { useState } from 'react';\n");
        } else {
            out.push_str("import React from 'react';\n");
        }

        let imports: BTreeSet<String> = roots
            .iter()
            .map(|root| component_file_stem(&root.display_name))
            .collect();
        for stem in &imports {
            let _ = writeln!(
                out,
                "import {} from '{}/{}';",
                stem, self.components_import, stem
            );
        }
        out.push_str("\nexport default function App() {\n");

        if let Some(logic) = logic {
            for variable in &logic.page_state {
                let name = identifier(&variable.name);
                let _ = writeln!(
                    out,
                    "  const [{}, set{}] = useState<{}>({});",
                    name,
                    capitalize(&name),
                    ts_type(variable.data_type),
                    js_literal(&variable.initial_value)
                );
            }
            if has_state {
                out.push('\n');
            }
            for flow in &logic.flows {
                let _ = writeln!(out, "  const {} = () => {{", flow.handler_name());
                let _ = writeln!(out, "    // flow {} ({} nodes)", flow.id, flow.nodes.len());
                out.push_str("  };\n\n");
            }
        }

        out.push_str("  return (\n    <>\n");
        for root in roots {
            let stem = component_file_stem(&root.display_name);
            match &root.on_click_handler {
                Some(handler) => {
                    let _ = writeln!(out, "      <{} onClick={{{}}} />", stem, handler);
                }
                None => {
                    let _ = writeln!(out, "      <{} />", stem);
                }
            }
        }
        out.push_str("    </>\n  );\n}\n");

        Ok(out)
    }

    fn generate_bootstrap(&self) -> Result<String> {
        let mut out = String::new();
        out.push_str("import React from 'react';\n");
        out.push_str("import ReactDOM from 'react-dom/client';\n");
        let _ = writeln!(out, "import App from '{}';", self.entry_import);
        out.push('\n');
        out.push_str("ReactDOM.createRoot(document.getElementById('root')!).render(\n");
        out.push_str("  <React.StrictMode>\n    <App />\n  </React.StrictMode>\n);\n");
        Ok(out)
    }
}

fn class_name_attribute(component: &Component) -> Option<String> {
    let base = component.styling.base_classes.join(" ");
    let conditional: Vec<String> = component
        .styling
        .conditional_classes
        .iter()
        .flatten()
        .map(|(condition, classes)| format!("${{({}) ? '{}' : ''}}", condition, classes.join(" ")))
        .collect();

    if conditional.is_empty() {
        if base.is_empty() {
            None
        } else {
            Some(format!("className=\"{}\"", base))
        }
    } else {
        let mut parts = Vec::new();
        if !base.is_empty() {
            parts.push(base);
        }
        parts.extend(conditional);
        Some(format!("className={{`{}`}}", parts.join(" ")))
    }
}

fn ts_type(data_type: DataType) -> &'static str {
    match data_type {
        DataType::String => "string",
        DataType::Number => "number",
        DataType::Boolean => "boolean",
        DataType::Object => "Record<string, unknown>",
        DataType::Array => "unknown[]",
    }
}

fn js_literal(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

fn is_element_tag(tag: &str) -> bool {
    let mut chars = tag.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
}

fn identifier(name: &str) -> String {
    let ident: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
    match ident.chars().next() {
        None => "value".to_string(),
        Some(first) if first.is_ascii_digit() => format!("_{}", ident),
        Some(_) => ident,
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
        None => String::new(),
    }
}

fn to_import_path(path: &Path) -> String {
    path.components()
        .filter_map(|part| part.as_os_str().to_str())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::manifest::logic::{LogicFlow, StateVariable};
    use serde_json::json;
    use std::collections::BTreeMap;
    use std::path::PathBuf;

    fn manifest() -> Manifest {
        let mut card = Component::new("card", "Card", "div")
            .with_children(["title", "missing"])
            .with_property("text", PropertyDefinition::text("Welcome"))
            .with_property(
                "elevated",
                PropertyDefinition::Prop {
                    data_type: DataType::Boolean,
                    required: false,
                    default: Some(json!(false)),
                    options: None,
                },
            );
        card.styling.base_classes = vec!["p-4".to_string(), "rounded".to_string()];

        Manifest::new()
            .with_component(card)
            .with_component(Component::new("title", "Card Title", "h2"))
    }

    #[test]
    fn test_component_imports_resolved_children_only() {
        let generator = ReactGenerator::default();
        let manifest = manifest();

        let code = generator
            .generate_component(manifest.component("card").unwrap(), &manifest)
            .unwrap();

        assert!(code.contains("import CardTitle from './CardTitle';"));
        assert!(!code.contains("missing"));
        assert!(code.contains("export default function Card({ elevated = false }: CardProps)"));
        assert!(code.contains("elevated?: boolean;"));
        assert!(code.contains("<div className=\"p-4 rounded\" elevated={elevated}>"));
        assert!(code.contains("{\"Welcome\"}"));
        assert!(code.contains("<CardTitle />"));
    }

    #[test]
    fn test_component_output_is_deterministic() {
        let generator = ReactGenerator::default();
        let manifest = manifest();
        let card = manifest.component("card").unwrap();

        assert_eq!(
            generator.generate_component(card, &manifest).unwrap(),
            generator.generate_component(card, &manifest).unwrap()
        );
    }

    #[test]
    fn test_leaf_is_self_closing() {
        let generator = ReactGenerator::default();
        let manifest = manifest();

        let code = generator
            .generate_component(manifest.component("title").unwrap(), &manifest)
            .unwrap();

        assert!(code.contains("    <h2 />"));
    }

    #[test]
    fn test_conditional_classes() {
        let generator = ReactGenerator::default();
        let mut button = Component::new("b", "Button", "button").with_event("onClick", "f1");
        button.styling.base_classes = vec!["btn".to_string()];
        let mut conditional = BTreeMap::new();
        conditional.insert("active".to_string(), vec!["ring".to_string()]);
        button.styling.conditional_classes = Some(conditional);
        let manifest = Manifest::new().with_component(button);

        let code = generator
            .generate_component(manifest.component("b").unwrap(), &manifest)
            .unwrap();

        assert!(code.contains("className={`btn ${(active) ? 'ring' : ''}`}"));
        assert!(code.contains("onClick?: () => void;"));
        assert!(code.contains("onClick={onClick}"));
    }

    #[test]
    fn test_invalid_component_fails() {
        let generator = ReactGenerator::default();
        let broken = Component::new("x", "   ", "div");
        let manifest = Manifest::new().with_component(broken.clone());

        let result = generator.generate_component(&broken, &manifest);
        assert!(matches!(result, Err(ManifestrsError::GeneratorFailed { .. })));

        let bad_tag = Component::new("y", "Thing", "<script>");
        assert!(generator.generate_component(&bad_tag, &manifest).is_err());
    }

    #[test]
    fn test_entry_point_wires_roots_and_logic() {
        let generator = ReactGenerator::default();
        let roots = vec![
            RootComponent {
                id: "h".to_string(),
                display_name: "Header".to_string(),
                on_click_handler: None,
            },
            RootComponent {
                id: "s".to_string(),
                display_name: "Submit".to_string(),
                on_click_handler: Some("handleSend".to_string()),
            },
        ];
        let logic = LogicContext {
            page_state: vec![StateVariable {
                name: "count".to_string(),
                data_type: DataType::Number,
                initial_value: json!(0),
            }],
            flows: vec![LogicFlow {
                id: "f1".to_string(),
                name: "send".to_string(),
                trigger: None,
                nodes: Vec::new(),
            }],
        };

        let code = generator
            .generate_entry_point(&roots, Some(&logic))
            .unwrap();

        assert!(code.contains("import React, { useState } from 'react';"));
        assert!(code.contains("import Header from './components/Header';"));
        assert!(code.contains("const [count, setCount] = useState<number>(0);"));
        assert!(code.contains("const handleSend = () => {"));
        assert!(code.contains("<Submit onClick={handleSend} />"));
        assert!(code.contains("<Header />"));
    }

    #[test]
    fn test_entry_point_without_logic() {
        let generator = ReactGenerator::default();
        let code = generator.generate_entry_point(&[], None).unwrap();

        assert!(code.starts_with("import React from 'react';\n"));
        assert!(!code.contains("useState"));
    }

    #[test]
    fn test_custom_paths() {
        let paths = PathsConfig {
            components_dir: PathBuf::from("web/ui/parts"),
            entry_point: PathBuf::from("web/Root.jsx"),
            bootstrap: PathBuf::from("web/index.jsx"),
            component_extension: "jsx".to_string(),
        };
        let generator = ReactGenerator::new(&paths);
        let roots = vec![RootComponent {
            id: "a".to_string(),
            display_name: "A".to_string(),
            on_click_handler: None,
        }];

        let entry = generator.generate_entry_point(&roots, None).unwrap();
        assert!(entry.contains("import A from './ui/parts/A';"));

        let bootstrap = generator.generate_bootstrap().unwrap();
        assert!(bootstrap.contains("import App from './Root';"));
    }
}
