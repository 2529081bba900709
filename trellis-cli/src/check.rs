use crate::bundle::Bundle;
use anyhow::Result;
use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use trellis_render::{attr_pairs, ElementCmd, RenderTemplateCmd, TemplateId};

pub struct CheckOptions {
    pub file: PathBuf,
    pub format: OutputFormat,
}

pub enum OutputFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Issue {
    pub severity: Severity,
    /// Command stream and position, e.g. `component 3, command 2`.
    pub location: String,
    pub message: String,
}

const GLOBAL_TARGETS: &[&str] = &["window", "document", "body"];

pub fn run_check(options: CheckOptions) -> Result<()> {
    let bundle = Bundle::from_path(&options.file)?;
    let issues = check_bundle(&bundle);

    match options.format {
        OutputFormat::Json => display_json(&issues, &options.file)?,
        OutputFormat::Pretty => display_pretty(&issues, &options.file),
    }

    if issues.iter().any(|issue| issue.severity == Severity::Error) {
        std::process::exit(1);
    }
    Ok(())
}

/// Validates every command stream in the bundle.
pub fn check_bundle(bundle: &Bundle) -> Vec<Issue> {
    let mut issues = Vec::new();
    let mut registered = HashSet::new();
    for component in &bundle.components {
        if !registered.insert(component.id) {
            issues.push(Issue {
                severity: Severity::Warning,
                location: format!("component {}", component.id),
                message: "template is defined more than once, the last definition wins".to_string(),
            });
        }
    }

    let mut checker = Checker {
        registered: &registered,
        issues: &mut issues,
    };
    for component in &bundle.components {
        checker.check_stream(&format!("component {}", component.id), &component.commands);
    }
    checker.check_stream("host", &bundle.host);
    checker.check_stream("document.body", &bundle.document.body);
    check_component_cycles(bundle, &mut issues);
    issues
}

/// Reports component templates that reach themselves through their own
/// commands; rendering any of them cannot terminate.
fn check_component_cycles(bundle: &Bundle, issues: &mut Vec<Issue>) {
    let mut uses: HashMap<TemplateId, Vec<TemplateId>> = HashMap::new();
    for component in &bundle.components {
        let mut used = Vec::new();
        collect_component_uses(&component.commands, &mut used);
        uses.insert(component.id, used);
    }

    let mut done = HashSet::new();
    for component in &bundle.components {
        let mut path = Vec::new();
        find_cycles(component.id, &uses, &mut path, &mut done, issues);
    }
}

fn collect_component_uses(commands: &[RenderTemplateCmd], used: &mut Vec<TemplateId>) {
    for cmd in commands {
        match cmd {
            RenderTemplateCmd::BeginComponent(component) => {
                if !used.contains(&component.template_id) {
                    used.push(component.template_id);
                }
            }
            RenderTemplateCmd::EmbeddedTemplate(template) => {
                collect_component_uses(&template.children, used);
            }
            _ => {}
        }
    }
}

fn find_cycles(
    template_id: TemplateId,
    uses: &HashMap<TemplateId, Vec<TemplateId>>,
    path: &mut Vec<TemplateId>,
    done: &mut HashSet<TemplateId>,
    issues: &mut Vec<Issue>,
) {
    if let Some(start) = path.iter().position(|id| *id == template_id) {
        let chain = path[start..]
            .iter()
            .chain(std::iter::once(&template_id))
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" -> ");
        issues.push(Issue {
            severity: Severity::Error,
            location: format!("component {template_id}"),
            message: format!("component template {template_id} contains itself ({chain})"),
        });
        return;
    }
    if done.contains(&template_id) {
        return;
    }
    path.push(template_id);
    for used in uses.get(&template_id).into_iter().flatten() {
        find_cycles(*used, uses, path, done, issues);
    }
    path.pop();
    done.insert(template_id);
}

enum Open<'a> {
    Element(&'a str),
    Component(&'a str),
}

struct Checker<'a> {
    registered: &'a HashSet<TemplateId>,
    issues: &'a mut Vec<Issue>,
}

impl Checker<'_> {
    fn report(&mut self, severity: Severity, location: String, message: String) {
        self.issues.push(Issue {
            severity,
            location,
            message,
        });
    }

    fn check_stream(&mut self, stream: &str, commands: &[RenderTemplateCmd]) {
        let mut open: Vec<Open<'_>> = Vec::new();
        for (index, cmd) in commands.iter().enumerate() {
            let location = format!("{stream}, command {index}");
            match cmd {
                RenderTemplateCmd::BeginElement(element) => {
                    self.check_attributes(&location, &element.name, &element.attr_name_and_values);
                    self.check_event_bindings(&location, element);
                    open.push(Open::Element(&element.name));
                }
                RenderTemplateCmd::BeginComponent(component) => {
                    let element = &component.element;
                    self.check_attributes(&location, &element.name, &element.attr_name_and_values);
                    self.check_event_bindings(&location, element);
                    if !self.registered.contains(&component.template_id) {
                        self.report(
                            Severity::Error,
                            location.clone(),
                            format!(
                                "<{}> uses component template {} which is not in the bundle",
                                element.name, component.template_id
                            ),
                        );
                    }
                    open.push(Open::Component(&element.name));
                }
                RenderTemplateCmd::EndElement => match open.pop() {
                    Some(Open::Element(_)) => {}
                    Some(Open::Component(name)) => self.report(
                        Severity::Error,
                        location,
                        format!("end_element closes component <{name}>"),
                    ),
                    None => self.report(
                        Severity::Error,
                        location,
                        "end_element without a matching begin_element".to_string(),
                    ),
                },
                RenderTemplateCmd::EndComponent => match open.pop() {
                    Some(Open::Component(_)) => {}
                    Some(Open::Element(name)) => self.report(
                        Severity::Error,
                        location,
                        format!("end_component closes element <{name}>"),
                    ),
                    None => self.report(
                        Severity::Error,
                        location,
                        "end_component without a matching begin_component".to_string(),
                    ),
                },
                RenderTemplateCmd::EmbeddedTemplate(template) => {
                    self.check_attributes(
                        &location,
                        "template anchor",
                        &template.attr_name_and_values,
                    );
                    if !template.is_merged && !template.children.is_empty() {
                        self.report(
                            Severity::Warning,
                            location.clone(),
                            "children of an unmerged embedded template are never built".to_string(),
                        );
                    }
                    self.check_stream(&format!("{location} > template"), &template.children);
                }
                RenderTemplateCmd::Text { .. } | RenderTemplateCmd::NgContent { .. } => {}
            }
        }

        for unclosed in open.iter().rev() {
            let message = match unclosed {
                Open::Element(name) => format!("<{name}> is never closed"),
                Open::Component(name) => format!("component <{name}> is never closed"),
            };
            self.report(Severity::Error, stream.to_string(), message);
        }
    }

    fn check_attributes(&mut self, location: &str, owner: &str, attr_name_and_values: &[String]) {
        if let Err(err) = attr_pairs(attr_name_and_values) {
            self.report(Severity::Error, location.to_string(), format!("{owner}: {err}"));
        }
    }

    fn check_event_bindings(&mut self, location: &str, element: &ElementCmd) {
        if !element.is_bound && !element.event_bindings.is_empty() {
            self.report(
                Severity::Warning,
                location.to_string(),
                format!("<{}> declares events but is not bound, they are ignored", element.name),
            );
        }
        for binding in &element.event_bindings {
            if let Some(target) = &binding.target {
                if !GLOBAL_TARGETS.contains(&target.as_str()) {
                    self.report(
                        Severity::Error,
                        location.to_string(),
                        format!(
                            "unknown global event target \"{target}\" in {}",
                            binding.full_name()
                        ),
                    );
                }
            }
        }
    }
}

fn display_json(issues: &[Issue], file: &Path) -> Result<()> {
    let (errors, warnings): (Vec<&Issue>, Vec<&Issue>) =
        issues.iter().partition(|issue| issue.severity == Severity::Error);
    let output = json!({
        "file": file.display().to_string(),
        "errors": errors,
        "warnings": warnings,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn display_pretty(issues: &[Issue], file: &Path) {
    println!("\n{}", "Checking template bundle...".bold().cyan());
    println!("{}", "=".repeat(60).cyan());

    if issues.is_empty() {
        println!("\n{}", "✓ No errors found!".green().bold());
        return;
    }

    let file_display = file.display().to_string();
    for issue in issues {
        let marker = match issue.severity {
            Severity::Error => "error:".red().bold(),
            Severity::Warning => "warning:".yellow().bold(),
        };
        println!("{} {} ({})", marker, file_display.bright_white(), issue.location.yellow());
        println!("  {}", issue.message.white());
        println!();
    }

    let errors = issues
        .iter()
        .filter(|issue| issue.severity == Severity::Error)
        .count();
    let warnings = issues.len() - errors;
    println!(
        "{} {}, {}",
        "Summary:".bold(),
        format!("{errors} error(s)").red(),
        format!("{warnings} warning(s)").yellow()
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bundle(value: serde_json::Value) -> Bundle {
        serde_json::from_value(value).unwrap()
    }

    fn messages(issues: &[Issue], severity: Severity) -> Vec<&str> {
        issues
            .iter()
            .filter(|issue| issue.severity == severity)
            .map(|issue| issue.message.as_str())
            .collect()
    }

    #[test]
    fn test_valid_bundle_has_no_issues() {
        let issues = check_bundle(&bundle(json!({
            "components": [{ "id": 1, "commands": [{ "kind": "text", "value": "hi" }] }],
            "host": [
                { "kind": "begin_component", "name": "app-root", "template_id": 1 },
                { "kind": "end_component" }
            ]
        })));
        assert!(issues.is_empty(), "{issues:?}");
    }

    #[test]
    fn test_unbalanced_commands() {
        let issues = check_bundle(&bundle(json!({
            "host": [
                { "kind": "end_element" },
                { "kind": "begin_element", "name": "div" },
                { "kind": "end_component" },
                { "kind": "begin_element", "name": "p" }
            ]
        })));
        assert_eq!(
            messages(&issues, Severity::Error),
            vec![
                "end_element without a matching begin_element",
                "end_component closes element <div>",
                "<p> is never closed",
            ]
        );
        assert_eq!(issues[0].location, "host, command 0");
    }

    #[test]
    fn test_odd_attributes_and_missing_templates() {
        let issues = check_bundle(&bundle(json!({
            "document": { "body": [
                { "kind": "begin_component", "name": "x-card", "template_id": 4,
                  "attr_name_and_values": ["title"] },
                { "kind": "end_component" }
            ]}
        })));
        let errors = messages(&issues, Severity::Error);
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("x-card: "));
        assert_eq!(errors[1], "<x-card> uses component template 4 which is not in the bundle");
        assert!(issues.iter().all(|issue| issue.location == "document.body, command 0"));
    }

    #[test]
    fn test_component_cycles_are_errors() {
        let issues = check_bundle(&bundle(json!({
            "components": [
                { "id": 1, "commands": [
                    { "kind": "begin_component", "name": "x-a", "template_id": 1 },
                    { "kind": "end_component" }
                ]},
                { "id": 2, "commands": [
                    { "kind": "embedded_template", "is_merged": true, "children": [
                        { "kind": "begin_component", "name": "x-c", "template_id": 3 },
                        { "kind": "end_component" }
                    ]}
                ]},
                { "id": 3, "commands": [
                    { "kind": "begin_component", "name": "x-b", "template_id": 2 },
                    { "kind": "end_component" }
                ]},
                { "id": 4, "commands": [
                    { "kind": "begin_component", "name": "x-b", "template_id": 2 },
                    { "kind": "end_component" }
                ]}
            ]
        })));

        assert_eq!(
            messages(&issues, Severity::Error),
            vec![
                "component template 1 contains itself (1 -> 1)",
                "component template 2 contains itself (2 -> 3 -> 2)",
            ]
        );
        assert_eq!(issues[1].location, "component 2");
    }

    #[test]
    fn test_nested_templates_and_warnings() {
        let issues = check_bundle(&bundle(json!({
            "components": [
                { "id": 2, "commands": [] },
                { "id": 2, "commands": [] }
            ],
            "host": [
                { "kind": "begin_element", "name": "button",
                  "event_bindings": [{ "target": "screen", "name": "resize" }] },
                { "kind": "embedded_template", "is_merged": true,
                  "children": [{ "kind": "begin_element", "name": "li" }] },
                { "kind": "end_element" }
            ]
        })));

        assert_eq!(
            messages(&issues, Severity::Warning),
            vec![
                "template is defined more than once, the last definition wins",
                "<button> declares events but is not bound, they are ignored",
            ]
        );
        assert_eq!(
            messages(&issues, Severity::Error),
            vec![
                "unknown global event target \"screen\" in screen:resize",
                "<li> is never closed",
            ]
        );
        assert_eq!(
            issues.last().map(|issue| issue.location.as_str()),
            Some("host, command 1 > template")
        );
    }
}
