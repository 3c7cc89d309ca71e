use crate::context::CodeWriter;
use crate::extract::ComponentParts;
use std::path::Path;
use sveltedts_common::{CommonError, CommonResult, Transformer};
use tracing::trace;

/// `.svelte` -> TypeScript transformer
#[derive(Debug, Clone, Copy, Default)]
pub struct SvelteTransformer;

impl SvelteTransformer {
    pub fn new() -> Self {
        Self
    }
}

impl Transformer for SvelteTransformer {
    fn transform(&self, source: &str, path: &Path) -> CommonResult<String> {
        let parts = ComponentParts::parse(source).map_err(|message| CommonError::Transform {
            path: path.to_path_buf(),
            message,
        })?;
        let name = component_name(path);
        trace!(component = %name, props = parts.props.len(), "transforming component");

        Ok(render_component(&name, &parts))
    }
}

/// PascalCase class name for a component file (`button-group.svelte` -> `ButtonGroup`)
pub fn component_name(path: &Path) -> String {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("");
    let stem = file_name.split('.').next().unwrap_or("");

    let mut name: String = stem
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect();

    if name.is_empty() {
        name = "Component".to_string();
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        name.insert(0, '_');
    }
    name
}

fn render_component(name: &str, parts: &ComponentParts) -> String {
    let mut out = CodeWriter::new();

    out.add_line("import { SvelteComponentTyped } from \"svelte\";");
    for import in &parts.imports {
        out.add_line(import);
    }
    if let Some(module) = &parts.module_script {
        out.add_block(module.trim_matches('\n'));
    }
    out.add_line("");

    out.add_line("function render() {");
    out.indent();
    out.add_block(parts.body.trim_matches('\n'));
    let bindings: Vec<String> = parts.props.iter().map(|prop| prop.name.clone()).collect();
    out.add_line(&format!("return {{ props: {{ {} }} }};", bindings.join(", ")));
    out.dedent();
    out.add_line("}");
    out.add_line("");

    out.add_line(&format!("export interface {}Props {{", name));
    out.indent();
    for prop in &parts.props {
        let marker = if prop.optional { "?" } else { "" };
        out.add_line(&format!("{}{}: {};", prop.name, marker, prop.type_text));
    }
    out.dedent();
    out.add_line("}");
    out.add_line("");

    out.add_line(&format!("export interface {}Events {{", name));
    out.indent();
    match &parts.events {
        Some(events) => {
            for (event, payload) in events {
                out.add_line(&format!("{}: CustomEvent<{}>;", event, payload));
            }
        }
        None => out.add_line("[evt: string]: CustomEvent<any>;"),
    }
    out.dedent();
    out.add_line("}");
    out.add_line("");

    out.add_line(&format!("export interface {}Slots {{", name));
    out.indent();
    for (slot, props) in &parts.slots {
        let slot_props: Vec<String> = props.iter().map(|prop| format!("{}: any", prop)).collect();
        if slot_props.is_empty() {
            out.add_line(&format!("{}: {{}};", slot_key(slot)));
        } else {
            out.add_line(&format!("{}: {{ {} }};", slot_key(slot), slot_props.join("; ")));
        }
    }
    out.dedent();
    out.add_line("}");
    out.add_line("");

    out.add_line(&format!(
        "export default class {name} extends SvelteComponentTyped<{name}Props, {name}Events, {name}Slots> {{"
    ));
    out.add_line("}");

    out.into_output()
}

fn slot_key(slot: &str) -> String {
    let is_identifier = slot
        .chars()
        .enumerate()
        .all(|(i, c)| c == '_' || c == '$' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit()));
    if is_identifier {
        slot.to_string()
    } else {
        format!("\"{}\"", slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_component_name() {
        assert_eq!(component_name(Path::new("/src/Button.svelte")), "Button");
        assert_eq!(component_name(Path::new("/src/button-group.svelte")), "ButtonGroup");
        assert_eq!(component_name(Path::new("/src/404.svelte")), "_404");
        assert_eq!(component_name(Path::new("/src/.svelte")), "Component");
    }

    #[test]
    fn test_transform_card() {
        let source = r#"<script lang="ts">
  import Icon from './Icon.svelte';
  export let title: string;
  export let elevated = false;
</script>

<div class="card">
  <Icon />
  <h2>{title}</h2>
  <slot />
  <slot name="actions" />
</div>
"#;

        let output = SvelteTransformer::new()
            .transform(source, &PathBuf::from("/proj/src/ui/Card.svelte"))
            .expect("Failed to transform");

        println!("Generated intermediate:\n{}", output);

        assert!(output.starts_with("import { SvelteComponentTyped } from \"svelte\";\n"));
        assert!(output.contains("import Icon from './Icon.svelte';"));
        assert!(output.contains("function render() {\n  let title: string;"));
        assert!(output.contains("return { props: { title, elevated } };"));
        assert!(output.contains("export interface CardProps {\n  title: string;\n  elevated?: boolean;\n}"));
        assert!(output.contains("[evt: string]: CustomEvent<any>;"));
        assert!(output.contains("export interface CardSlots {\n  actions: {};\n  default: {};\n}"));
        assert!(output.contains(
            "export default class Card extends SvelteComponentTyped<CardProps, CardEvents, CardSlots> {\n}"
        ));
    }

    #[test]
    fn test_transform_typed_events_and_module_script() {
        let source = r#"<script context="module" lang="ts">
  export type Tone = 'info' | 'warn';
</script>
<script lang="ts">
  import { createEventDispatcher } from 'svelte';
  export let tone: Tone = 'info';
  const dispatch = createEventDispatcher<{ dismiss: void }>();
</script>
<p>{tone}</p>
"#;

        let output = SvelteTransformer::new()
            .transform(source, &PathBuf::from("/proj/src/alert-box.svelte"))
            .expect("Failed to transform");

        assert!(output.contains("export type Tone = 'info' | 'warn';"));
        assert!(output.contains("tone?: Tone;"));
        assert!(output.contains("export interface AlertBoxEvents {\n  dismiss: CustomEvent<void>;\n}"));
        assert!(output.contains("export interface AlertBoxSlots {\n}"));
    }

    #[test]
    fn test_transform_error_names_component() {
        let err = SvelteTransformer::new()
            .transform("<script>let a;", &PathBuf::from("/proj/src/Broken.svelte"))
            .unwrap_err();

        assert!(matches!(err, CommonError::Transform { .. }));
        assert!(err.to_string().contains("Broken.svelte"));
    }
}
