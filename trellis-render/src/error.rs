use crate::template::TemplateId;
use thiserror::Error;
use trellis_dom::DomError;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RenderError {
    #[error("The selector \"{selector}\" did not match any elements")]
    SelectorNoMatch { selector: String },

    #[error("no component template registered under id {0}")]
    ComponentTemplateNotFound(TemplateId),

    #[error("component template {0} contains itself")]
    RecursiveComponent(TemplateId),

    #[error("reference was produced by a different renderer")]
    ForeignReference,

    #[error("bound element index {index} out of range (view has {len})")]
    ElementIndexOutOfRange { index: usize, len: usize },

    #[error("bound text index {index} out of range (view has {len})")]
    TextIndexOutOfRange { index: usize, len: usize },

    #[error("attribute list must hold name/value pairs, got {0} entries")]
    OddAttributeList(usize),

    #[error("The view is already hydrated.")]
    AlreadyHydrated,

    #[error("The view is already dehydrated.")]
    AlreadyDehydrated,

    #[error("The view has been destroyed.")]
    ViewDestroyed,

    #[error("unknown element method \"{0}\"")]
    UnknownElementMethod(String),

    #[error("invalid arguments for element method \"{method}\": {reason}")]
    InvalidMethodArguments { method: String, reason: String },

    #[error("No event manager plugin found for event {0}")]
    NoEventPlugin(String),

    #[error("unknown global event target \"{0}\"")]
    UnknownEventTarget(String),

    #[error("{0} is not implemented")]
    NotImplemented(&'static str),

    #[error("invalid renderer config: {0}")]
    Config(String),

    #[error(transparent)]
    Dom(#[from] DomError),
}

pub type Result<T> = std::result::Result<T, RenderError>;
