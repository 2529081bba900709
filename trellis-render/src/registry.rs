use crate::template::{RenderTemplateCmd, TemplateId};
use std::collections::HashMap;
use std::rc::Rc;

/// Component templates known to a renderer, keyed by template id.
#[derive(Debug, Default)]
pub struct ComponentTemplateRegistry {
    templates: HashMap<TemplateId, Rc<[RenderTemplateCmd]>>,
}

impl ComponentTemplateRegistry {
    pub fn new() -> Self {
        Self {
            templates: HashMap::new(),
        }
    }

    /// Store the commands for `id`, replacing any earlier registration.
    /// Returns the replaced commands.
    pub fn register(
        &mut self,
        id: TemplateId,
        commands: Vec<RenderTemplateCmd>,
    ) -> Option<Rc<[RenderTemplateCmd]>> {
        self.templates.insert(id, commands.into())
    }

    pub fn resolve(&self, id: TemplateId) -> Option<Rc<[RenderTemplateCmd]>> {
        self.templates.get(&id).cloned()
    }

    pub fn contains(&self, id: TemplateId) -> bool {
        self.templates.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_and_resolve() {
        let mut registry = ComponentTemplateRegistry::new();
        assert!(registry.resolve(7).is_none());

        registry.register(7, vec![RenderTemplateCmd::text("a")]);
        let cmds = registry.resolve(7).unwrap();
        assert_eq!(&*cmds, &[RenderTemplateCmd::text("a")]);
        assert!(registry.contains(7));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_register_overwrites() {
        let mut registry = ComponentTemplateRegistry::new();
        registry.register(1, vec![RenderTemplateCmd::text("old")]);
        let previous = registry.register(1, vec![RenderTemplateCmd::text("new")]);

        assert_eq!(previous.as_deref(), Some(&[RenderTemplateCmd::text("old")][..]));
        assert_eq!(
            registry.resolve(1).as_deref(),
            Some(&[RenderTemplateCmd::text("new")][..])
        );
        assert_eq!(registry.len(), 1);
    }
}
