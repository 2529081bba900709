use crate::bundle::Bundle;
use anyhow::{Context, Result};
use std::path::PathBuf;
use tracing::{debug, info};
use trellis_dom::Document;
use trellis_render::{DomRenderer, Renderer, RendererConfig};

pub struct RenderOptions {
    pub file: PathBuf,
    pub selector: String,
    pub config: Option<PathBuf>,
    pub hydrate: bool,
}

pub fn run_render(options: RenderOptions) -> Result<()> {
    let bundle = Bundle::from_path(&options.file)?;
    let config = match &options.config {
        Some(path) => RendererConfig::from_path(path)
            .with_context(|| format!("Failed to load renderer config: {}", path.display()))?,
        None => RendererConfig::default(),
    };
    let html = render_bundle(&bundle, config, &options.selector, options.hydrate)?;
    println!("{html}");
    Ok(())
}

/// Builds the bundle's page, renders the host view over `selector` and
/// returns the serialised document once every pending animation has finished.
pub fn render_bundle(
    bundle: &Bundle,
    config: RendererConfig,
    selector: &str,
    hydrate: bool,
) -> Result<String> {
    let document = Document::shared();
    let renderer = DomRenderer::with_config(document.clone(), config);

    for component in &bundle.components {
        renderer
            .register_component_template(
                component.id,
                component.commands.clone(),
                component.styles.clone(),
            )
            .with_context(|| format!("Failed to register component template {}", component.id))?;
    }

    if !bundle.document.body.is_empty() {
        let page = renderer
            .create_view(&renderer.create_proto_view(bundle.document.body.clone()), 1)
            .context("Failed to build document body")?;
        if let Some(fragment) = page.fragment_refs.first() {
            for node in renderer.get_root_nodes(fragment)?.iter() {
                document.append_child(document.body(), *node)?;
            }
        }
    }

    let proto = renderer.create_proto_view(bundle.host.clone());
    let view = renderer
        .create_root_host_view(&proto, 1, selector)
        .context("Failed to create root host view")?;
    if hydrate {
        renderer
            .hydrate_view(&view.view_ref)
            .context("Failed to hydrate root host view")?;
    }

    let finished = renderer.scheduler().finish_all();
    debug!(finished, "flushed pending animations");
    info!(renderer = %renderer.id(), selector, "rendered bundle");
    Ok(document.to_html())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn bundle() -> Bundle {
        serde_json::from_value(json!({
            "components": [{
                "id": 1,
                "commands": [
                    { "kind": "begin_element", "name": "h1" },
                    { "kind": "text", "value": "Hello" },
                    { "kind": "end_element" }
                ],
                "styles": ["h1 { color: red }"]
            }],
            "host": [
                { "kind": "begin_component", "name": "app-root", "template_id": 1, "is_bound": true,
                  "event_bindings": [{ "target": "window", "name": "resize" }] },
                { "kind": "end_component" }
            ],
            "document": {
                "body": [
                    { "kind": "begin_element", "name": "app-root",
                      "attr_name_and_values": ["id", "root"] },
                    { "kind": "text", "value": "Loading..." },
                    { "kind": "end_element" }
                ]
            }
        }))
        .unwrap()
    }

    #[test]
    fn test_render_bundle_over_page_element() {
        let html = render_bundle(&bundle(), RendererConfig::default(), "app-root", true).unwrap();
        assert_eq!(
            html,
            "<!DOCTYPE html><html><head><style>h1 { color: red }</style></head>\
             <body><app-root id=\"root\"><h1>Hello</h1></app-root></body></html>"
        );
    }

    #[test]
    fn test_missing_host_element_is_reported() {
        let err = render_bundle(&bundle(), RendererConfig::default(), "#nope", false).unwrap_err();
        let message = format!("{err:#}");
        assert!(message.contains("Failed to create root host view"));
        assert!(message.contains("The selector \"#nope\" did not match any elements"));
    }

    #[test]
    fn test_config_file_changes_anchor_tag() {
        let mut config_file = tempfile::NamedTempFile::new().unwrap();
        write!(config_file, r#"{{ "template_anchor_tag": "template" }}"#).unwrap();
        let config = RendererConfig::from_path(config_file.path()).unwrap();

        let bundle: Bundle = serde_json::from_value(json!({
            "host": [
                { "kind": "begin_element", "name": "main" },
                { "kind": "embedded_template", "attr_name_and_values": ["ng-if", "ready"] },
                { "kind": "end_element" }
            ],
            "document": {
                "body": [{ "kind": "begin_element", "name": "main" }, { "kind": "end_element" }]
            }
        }))
        .unwrap();

        let html = render_bundle(&bundle, config, "main", false).unwrap();
        assert!(html.contains("<main><template ng-if=\"ready\"></template></main>"));
    }
}
