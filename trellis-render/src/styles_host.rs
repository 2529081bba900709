//! Stylesheets shared between the document head and native shadow roots.

use crate::error::Result;
use indexmap::IndexSet;
use trellis_dom::{NodeId, SharedDocument};

/// Insertion-ordered, de-duplicated set of stylesheet sources.
#[derive(Debug, Default)]
pub struct SharedStylesHost {
    styles: IndexSet<String>,
}

impl SharedStylesHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `styles`, returning only the ones not seen before.
    pub fn add_styles<S: AsRef<str>>(&mut self, styles: &[S]) -> Vec<String> {
        let mut additions = Vec::new();
        for style in styles {
            let style = style.as_ref();
            if self.styles.insert(style.to_string()) {
                additions.push(style.to_string());
            }
        }
        additions
    }

    pub fn styles(&self) -> impl Iterator<Item = &str> {
        self.styles.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }
}

/// Writes each shared style as a `<style>` element into every host:
/// `document.head` plus any shadow roots added later.
pub struct DomSharedStylesHost {
    document: SharedDocument,
    shared: SharedStylesHost,
    hosts: IndexSet<NodeId>,
}

impl DomSharedStylesHost {
    pub fn new(document: SharedDocument) -> Self {
        let mut hosts = IndexSet::new();
        hosts.insert(document.head());
        Self {
            document,
            shared: SharedStylesHost::new(),
            hosts,
        }
    }

    pub fn add_styles<S: AsRef<str>>(&mut self, styles: &[S]) -> Result<()> {
        let additions = self.shared.add_styles(styles);
        if additions.is_empty() {
            return Ok(());
        }
        tracing::debug!(count = additions.len(), hosts = self.hosts.len(), "sharing new styles");
        for host in &self.hosts {
            self.write_styles(&additions, *host)?;
        }
        Ok(())
    }

    /// Registers `host` and writes every known style into it. Adding an
    /// existing host does nothing.
    pub fn add_host(&mut self, host: NodeId) -> Result<()> {
        if !self.hosts.insert(host) {
            return Ok(());
        }
        let styles: Vec<&str> = self.shared.styles().collect();
        self.write_styles(&styles, host)
    }

    /// Stops sharing with `host`. Styles already written stay in place.
    pub fn remove_host(&mut self, host: NodeId) -> bool {
        self.hosts.shift_remove(&host)
    }

    pub fn hosts(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.hosts.iter().copied()
    }

    pub fn styles(&self) -> impl Iterator<Item = &str> {
        self.shared.styles()
    }

    fn write_styles<S: AsRef<str>>(&self, styles: &[S], host: NodeId) -> Result<()> {
        for style in styles {
            let element = self.document.create_style_element(style.as_ref());
            self.document.append_child(host, element)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use trellis_dom::Document;

    #[test]
    fn test_shared_styles_are_deduplicated_in_order() {
        let mut host = SharedStylesHost::new();
        assert_eq!(host.add_styles(&["a", "b"]), vec!["a", "b"]);
        assert_eq!(host.add_styles(&["b", "c", "a"]), vec!["c"]);
        assert_eq!(host.styles().collect::<Vec<_>>(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_head_receives_styles() {
        let document = Document::shared();
        let mut host = DomSharedStylesHost::new(document.clone());
        host.add_styles(&["p { color: red }"]).unwrap();
        host.add_styles(&["p { color: red }"]).unwrap();

        assert_eq!(
            document.inner_html(document.head()).unwrap(),
            "<style>p { color: red }</style>"
        );
    }

    #[test]
    fn test_new_host_gets_existing_styles_and_later_additions() {
        let document = Document::shared();
        let mut host = DomSharedStylesHost::new(document.clone());
        host.add_styles(&["a {}"]).unwrap();

        let element = document.create_element("x-card");
        let shadow = document.create_shadow_root(element).unwrap();
        host.add_host(shadow).unwrap();
        host.add_host(shadow).unwrap();
        assert_eq!(document.inner_html(shadow).unwrap(), "<style>a {}</style>");

        host.add_styles(&["b {}"]).unwrap();
        assert_eq!(
            document.inner_html(shadow).unwrap(),
            "<style>a {}</style><style>b {}</style>"
        );

        assert!(host.remove_host(shadow));
        host.add_styles(&["c {}"]).unwrap();
        assert_eq!(
            document.inner_html(shadow).unwrap(),
            "<style>a {}</style><style>b {}</style>"
        );
        assert_eq!(document.child_nodes(document.head()).len(), 3);
    }
}
