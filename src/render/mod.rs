//! Rendering port: the small slice of a document API the overlay needs.
//!
//! Implementations own the actual tree. The session only holds [`NodeId`]s
//! and [`ListenerId`]s handed out by the port.

/// An in-memory document implementing [`RenderPort`].
pub mod memory;
/// The "up next" card.
pub mod overlay;

use std::fmt;
use std::sync::Arc;

use crate::error::RelatedVideoResult;

/// Handle to an element created through a [`RenderPort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub u64);

/// Handle to a click listener attached through a [`RenderPort`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(pub u64);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node#{}", self.0)
    }
}

/// Invoked by the port whenever the listened element is clicked.
pub type ClickCallback = Arc<dyn Fn() + Send + Sync>;

/// Description of an element to create.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementSpec {
    pub tag: String,
    pub id: Option<String>,
    pub class: Option<String>,
    pub attributes: Vec<(String, String)>,
    pub text: Option<String>,
}

impl ElementSpec {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.push((name.into(), value.into()));
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Capability interface over the document hosting the player.
pub trait RenderPort: Send + Sync {
    /// The element the overlay is layered into, if the player is mounted.
    fn player_container(&self) -> Option<NodeId>;

    /// Create a detached element.
    fn create_element(&self, spec: ElementSpec) -> RelatedVideoResult<NodeId>;

    fn append(&self, parent: NodeId, child: NodeId) -> RelatedVideoResult<()>;

    /// Remove `node` and its subtree. Removing an unknown node is a no-op.
    fn remove(&self, node: NodeId);

    /// Whether `node` still exists and is connected to the document.
    fn is_attached(&self, node: NodeId) -> bool;

    fn set_text(&self, node: NodeId, text: &str) -> RelatedVideoResult<()>;

    fn listen_click(&self, node: NodeId, on_click: ClickCallback) -> RelatedVideoResult<ListenerId>;

    /// Detach a listener. Unknown listeners are ignored.
    fn unlisten(&self, listener: ListenerId);
}
