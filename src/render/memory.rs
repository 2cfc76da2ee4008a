use dashmap::DashMap;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::debug;

use super::{ClickCallback, ElementSpec, ListenerId, NodeId, RenderPort};
use crate::error::{RelatedVideoError, RelatedVideoResult};

/// Id given to the player element, matching the page markup.
pub const PLAYER_ELEMENT_ID: &str = "san-player";

struct Node {
    spec: ElementSpec,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Default)]
struct Tree {
    nodes: HashMap<NodeId, Node>,
    root: Option<NodeId>,
}

impl Tree {
    fn is_attached(&self, node: NodeId) -> bool {
        let mut current = node;
        loop {
            if Some(current) == self.root {
                return true;
            }
            match self.nodes.get(&current).and_then(|n| n.parent) {
                Some(parent) => current = parent,
                None => return false,
            }
        }
    }

    fn unlink(&mut self, node: NodeId) {
        let parent = self.nodes.get_mut(&node).and_then(|n| n.parent.take());
        if let Some(parent) = parent.and_then(|p| self.nodes.get_mut(&p)) {
            parent.children.retain(|c| *c != node);
        }
    }

    /// Drops `node` and its descendants, returning every removed id.
    fn drop_subtree(&mut self, node: NodeId) -> Vec<NodeId> {
        let mut removed = Vec::new();
        let mut stack = vec![node];
        while let Some(id) = stack.pop() {
            if let Some(n) = self.nodes.remove(&id) {
                stack.extend(n.children);
                removed.push(id);
            }
        }
        removed
    }
}

/// A headless document: a tree of elements rooted at the player element.
///
/// Listeners are kept apart from the tree so a click can be dispatched
/// without holding the tree lock.
pub struct MemoryDom {
    tree: Mutex<Tree>,
    listeners: DashMap<ListenerId, (NodeId, ClickCallback)>,
    next_id: AtomicU64,
}

impl Default for MemoryDom {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryDom {
    /// A document with the player element mounted.
    pub fn new() -> Self {
        let dom = Self::without_player();
        let root = dom.next_node_id();
        {
            let mut tree = dom.tree();
            tree.nodes.insert(
                root,
                Node {
                    spec: ElementSpec::new("div")
                        .id(PLAYER_ELEMENT_ID)
                        .class("video-js"),
                    parent: None,
                    children: Vec::new(),
                },
            );
            tree.root = Some(root);
        }
        dom
    }

    /// An empty document, as seen before the player is mounted.
    pub fn without_player() -> Self {
        Self {
            tree: Mutex::new(Tree::default()),
            listeners: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn tree(&self) -> MutexGuard<'_, Tree> {
        self.tree.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn next_node_id(&self) -> NodeId {
        NodeId(self.next_id.fetch_add(1, Ordering::Relaxed))
    }

    /// First attached element carrying `id`.
    pub fn find_by_id(&self, id: &str) -> Option<NodeId> {
        let tree = self.tree();
        let mut matches: Vec<NodeId> = tree
            .nodes
            .iter()
            .filter(|(node, n)| n.spec.id.as_deref() == Some(id) && tree.is_attached(**node))
            .map(|(node, _)| *node)
            .collect();
        matches.sort_by_key(|n| n.0);
        matches.into_iter().next()
    }

    /// Number of attached elements carrying `id`.
    pub fn count_by_id(&self, id: &str) -> usize {
        let tree = self.tree();
        tree.nodes
            .iter()
            .filter(|(node, n)| n.spec.id.as_deref() == Some(id) && tree.is_attached(**node))
            .count()
    }

    pub fn text(&self, node: NodeId) -> Option<String> {
        self.tree().nodes.get(&node).and_then(|n| n.spec.text.clone())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.tree().nodes.get(&node).and_then(|n| {
            n.spec
                .attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        })
    }

    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        self.tree()
            .nodes
            .get(&node)
            .map(|n| n.children.clone())
            .unwrap_or_default()
    }

    /// Disconnect `node` from its parent without destroying it, the way an
    /// outside script would.
    pub fn detach(&self, node: NodeId) {
        self.tree().unlink(node);
    }

    /// Dispatch a click on `node`, returning how many listeners ran.
    pub fn click(&self, node: NodeId) -> usize {
        let callbacks: Vec<ClickCallback> = self
            .listeners
            .iter()
            .filter(|entry| entry.value().0 == node)
            .map(|entry| entry.value().1.clone())
            .collect();

        for callback in &callbacks {
            callback();
        }
        callbacks.len()
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl RenderPort for MemoryDom {
    fn player_container(&self) -> Option<NodeId> {
        self.tree().root
    }

    fn create_element(&self, spec: ElementSpec) -> RelatedVideoResult<NodeId> {
        if spec.tag.is_empty() {
            return Err(RelatedVideoError::Render("element tag is empty".to_string()));
        }
        let node = self.next_node_id();
        self.tree().nodes.insert(
            node,
            Node {
                spec,
                parent: None,
                children: Vec::new(),
            },
        );
        Ok(node)
    }

    fn append(&self, parent: NodeId, child: NodeId) -> RelatedVideoResult<()> {
        let mut tree = self.tree();
        if parent == child {
            return Err(RelatedVideoError::Render(format!(
                "cannot append {} to itself",
                child
            )));
        }
        if !tree.nodes.contains_key(&child) {
            return Err(RelatedVideoError::MissingElement(child.to_string()));
        }
        if !tree.nodes.contains_key(&parent) {
            return Err(RelatedVideoError::MissingElement(parent.to_string()));
        }

        tree.unlink(child);
        if let Some(n) = tree.nodes.get_mut(&child) {
            n.parent = Some(parent);
        }
        if let Some(p) = tree.nodes.get_mut(&parent) {
            p.children.push(child);
        }
        Ok(())
    }

    fn remove(&self, node: NodeId) {
        let removed = {
            let mut tree = self.tree();
            tree.unlink(node);
            tree.drop_subtree(node)
        };
        if !removed.is_empty() {
            self.listeners.retain(|_, (target, _)| !removed.contains(target));
            debug!("Removed {} and {} descendant(s)", node, removed.len() - 1);
        }
    }

    fn is_attached(&self, node: NodeId) -> bool {
        self.tree().is_attached(node)
    }

    fn set_text(&self, node: NodeId, text: &str) -> RelatedVideoResult<()> {
        let mut tree = self.tree();
        let n = tree
            .nodes
            .get_mut(&node)
            .ok_or_else(|| RelatedVideoError::MissingElement(node.to_string()))?;
        n.spec.text = Some(text.to_string());
        Ok(())
    }

    fn listen_click(&self, node: NodeId, on_click: ClickCallback) -> RelatedVideoResult<ListenerId> {
        if !self.tree().nodes.contains_key(&node) {
            return Err(RelatedVideoError::MissingElement(node.to_string()));
        }
        let listener = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.listeners.insert(listener, (node, on_click));
        Ok(listener)
    }

    fn unlisten(&self, listener: ListenerId) {
        self.listeners.remove(&listener);
    }
}
