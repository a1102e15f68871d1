//! Host collaborator contract
//!
//! The conversion engines never touch a concrete tree type. They read and
//! edit the document through the narrow `TableHost` trait, which an editor
//! implements on top of its own node model and transaction mechanism.
//!
//! Implementations:
//! - `Document`: the in-memory arena tree shipped with this crate (CLI, tests, WASM)

use super::document::{Document, NodeId};
use crate::utils::error::TableResult;

/// Tree access and mutation needed by the grid model engines
pub trait TableHost {
    /// Namespace URI of an element, `None` for non-elements or no namespace
    fn namespace_uri(&self, node: NodeId) -> Option<&str>;

    /// Local name of an element, `None` for non-elements
    fn local_name(&self, node: NodeId) -> Option<&str>;

    fn parent(&self, node: NodeId) -> Option<NodeId>;

    /// All child nodes in document order
    fn children(&self, node: NodeId) -> Vec<NodeId>;

    fn attribute(&self, node: NodeId, name: &str) -> Option<String>;

    /// Set an attribute, removing it when `value` is `None`
    fn set_attribute(&mut self, node: NodeId, name: &str, value: Option<&str>);

    /// Create a detached element
    fn create_element(&mut self, namespace: Option<&str>, local_name: &str) -> NodeId;

    /// Insert `node` before `reference` (or last when `None`). Attached nodes
    /// are moved, never copied.
    fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> TableResult<()>;

    /// Detach a node from the tree
    fn remove(&mut self, node: NodeId);

    fn begin_batch(&mut self);

    fn commit_batch(&mut self);

    fn discard_batch(&mut self);

    /// Host-side structural completion; `false` rejects the pending edits
    fn complete_structure(&mut self, root: NodeId) -> bool;

    /// Whether `node` is an element with the given name
    fn is_element(&self, node: NodeId, namespace: Option<&str>, local_name: &str) -> bool {
        self.local_name(node) == Some(local_name) && self.namespace_uri(node) == namespace
    }

    /// Child elements only
    fn element_children(&self, node: NodeId) -> Vec<NodeId> {
        self.children(node)
            .into_iter()
            .filter(|&c| self.local_name(c).is_some())
            .collect()
    }

    /// Child elements with the given name
    fn children_named(
        &self,
        node: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Vec<NodeId> {
        self.children(node)
            .into_iter()
            .filter(|&c| self.is_element(c, namespace, local_name))
            .collect()
    }

    fn first_child_named(
        &self,
        node: NodeId,
        namespace: Option<&str>,
        local_name: &str,
    ) -> Option<NodeId> {
        self.children(node)
            .into_iter()
            .find(|&c| self.is_element(c, namespace, local_name))
    }
}

impl TableHost for Document {
    fn namespace_uri(&self, node: NodeId) -> Option<&str> {
        self.element(node).and_then(|el| el.namespace.as_deref())
    }

    fn local_name(&self, node: NodeId) -> Option<&str> {
        self.element(node).map(|el| el.local_name.as_str())
    }

    fn parent(&self, node: NodeId) -> Option<NodeId> {
        Document::parent(self, node)
    }

    fn children(&self, node: NodeId) -> Vec<NodeId> {
        Document::children(self, node).to_vec()
    }

    fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        Document::attribute(self, node, name).map(str::to_string)
    }

    fn set_attribute(&mut self, node: NodeId, name: &str, value: Option<&str>) {
        Document::set_attribute(self, node, name, value)
    }

    fn create_element(&mut self, namespace: Option<&str>, local_name: &str) -> NodeId {
        Document::create_element(self, namespace, local_name)
    }

    fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> TableResult<()> {
        Document::insert_before(self, parent, node, reference)
    }

    fn remove(&mut self, node: NodeId) {
        self.detach(node)
    }

    fn begin_batch(&mut self) {
        Document::begin_batch(self)
    }

    fn commit_batch(&mut self) {
        Document::commit_batch(self)
    }

    fn discard_batch(&mut self) {
        Document::discard_batch(self)
    }

    fn complete_structure(&mut self, root: NodeId) -> bool {
        self.check_structure(root)
    }
}
