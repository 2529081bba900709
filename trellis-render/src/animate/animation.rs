use crate::error::Result;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use trellis_dom::{NodeId, SharedDocument};

type Callback = Box<dyn FnOnce()>;

struct AnimationInner {
    document: SharedDocument,
    element: NodeId,
    animation_classes: Vec<String>,
    callbacks: RefCell<Vec<Callback>>,
    completed: Cell<bool>,
}

/// Handle to a running CSS animation.
///
/// Completion removes the animation classes and runs every registered
/// callback exactly once.
#[derive(Clone)]
pub struct Animation {
    inner: Rc<AnimationInner>,
}

impl Animation {
    pub(crate) fn new(
        document: SharedDocument,
        element: NodeId,
        animation_classes: Vec<String>,
    ) -> Self {
        Self {
            inner: Rc::new(AnimationInner {
                document,
                element,
                animation_classes,
                callbacks: RefCell::new(Vec::new()),
                completed: Cell::new(false),
            }),
        }
    }

    pub fn element(&self) -> NodeId {
        self.inner.element
    }

    pub fn is_completed(&self) -> bool {
        self.inner.completed.get()
    }

    /// Register a completion callback. Runs immediately if already complete.
    pub fn on_complete(&self, callback: impl FnOnce() + 'static) -> &Self {
        if self.is_completed() {
            callback();
        } else {
            self.inner.callbacks.borrow_mut().push(Box::new(callback));
        }
        self
    }

    pub(crate) fn complete(&self) {
        if self.inner.completed.replace(true) {
            return;
        }
        if let Err(err) = self.remove_animation_classes() {
            tracing::warn!(
                element = %self.inner.element,
                error = %err,
                "failed to clear animation classes"
            );
        }
        let callbacks = std::mem::take(&mut *self.inner.callbacks.borrow_mut());
        for callback in callbacks {
            callback();
        }
    }

    fn remove_animation_classes(&self) -> Result<()> {
        let document = &self.inner.document;
        if !document.contains(self.inner.element) {
            return Ok(());
        }
        for class_name in &self.inner.animation_classes {
            document.remove_class(self.inner.element, class_name)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Animation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animation")
            .field("element", &self.inner.element)
            .field("animation_classes", &self.inner.animation_classes)
            .field("completed", &self.inner.completed.get())
            .finish()
    }
}
