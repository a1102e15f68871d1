//! Arena-backed XML document with batched, reversible edits

use std::fmt;

use indexmap::IndexMap;

use crate::utils::error::{TableError, TableResult};

/// Identity of a node inside a [`Document`].
///
/// Ids stay valid while a node is detached or moved, so callers can hold on
/// to them across edits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "config", derive(serde::Serialize))]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Element payload
#[derive(Debug, Clone, PartialEq)]
pub struct ElementData {
    /// Resolved namespace URI
    pub namespace: Option<String>,
    /// Prefix the element was written with, if any
    pub prefix: Option<String>,
    pub local_name: String,
    /// Attributes in document order, keyed by qualified name
    pub attributes: IndexMap<String, String>,
}

impl ElementData {
    pub fn new(namespace: Option<&str>, local_name: &str) -> Self {
        ElementData {
            namespace: namespace.map(str::to_string),
            prefix: None,
            local_name: local_name.to_string(),
            attributes: IndexMap::new(),
        }
    }
}

/// Kinds of nodes a document holds
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Document,
    Element(ElementData),
    Text(String),
    CData(String),
    Comment(String),
    ProcessingInstruction(String),
    DocType(String),
}

#[derive(Debug, Clone)]
struct NodeData {
    kind: NodeKind,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        NodeData {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }
}

/// The `<?xml ...?>` declaration
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// Host callback deciding whether an edited table is acceptable
pub type StructureCheck = Box<dyn Fn(&Document, NodeId) -> bool>;

/// In-memory XML document.
///
/// Nodes live in an arena and are never freed; removing a node only detaches
/// it. Edits can be grouped into batches which are committed or discarded as
/// a unit.
pub struct Document {
    nodes: Vec<NodeData>,
    pub(crate) declaration: Option<XmlDeclaration>,
    /// Arena snapshots, one per open batch
    batches: Vec<Vec<NodeData>>,
    structure_check: Option<StructureCheck>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("nodes", &self.nodes.len())
            .field("open_batches", &self.batches.len())
            .field("has_structure_check", &self.structure_check.is_some())
            .finish()
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create an empty document holding only the document node
    pub fn new() -> Self {
        Document {
            nodes: vec![NodeData::new(NodeKind::Document)],
            declaration: None,
            batches: Vec::new(),
            structure_check: None,
        }
    }

    /// The document node
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// The outermost element, if any
    pub fn document_element(&self) -> Option<NodeId> {
        self.children(self.root())
            .iter()
            .copied()
            .find(|&id| self.element(id).is_some())
    }

    /// Whether the id refers to a node of this document
    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn kind(&self, id: NodeId) -> Option<&NodeKind> {
        self.nodes.get(id.0).map(|n| &n.kind)
    }

    pub fn element(&self, id: NodeId) -> Option<&ElementData> {
        match self.kind(id) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn element_mut(&mut self, id: NodeId) -> Option<&mut ElementData> {
        match self.nodes.get_mut(id.0).map(|n| &mut n.kind) {
            Some(NodeKind::Element(el)) => Some(el),
            _ => None,
        }
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(id.0).and_then(|n| n.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes
            .get(id.0)
            .map(|n| n.children.as_slice())
            .unwrap_or(&[])
    }

    /// Child elements of a node, skipping text and other node kinds
    pub fn element_children(&self, id: NodeId) -> Vec<NodeId> {
        self.children(id)
            .iter()
            .copied()
            .filter(|&c| self.element(c).is_some())
            .collect()
    }

    /// All nodes below `id` in document order, excluding `id` itself
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.children(id).iter().rev().copied().collect();
        while let Some(next) = stack.pop() {
            out.push(next);
            stack.extend(self.children(next).iter().rev().copied());
        }
        out
    }

    /// Whether the node is reachable from the document node
    pub fn is_attached(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == self.root() {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|el| el.attributes.get(name))
            .map(String::as_str)
    }

    /// Set an attribute, or remove it when `value` is `None`
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: Option<&str>) {
        if let Some(el) = self.element_mut(id) {
            match value {
                Some(value) => {
                    if el.attributes.get(name).map(String::as_str) != Some(value) {
                        el.attributes.insert(name.to_string(), value.to_string());
                    }
                }
                None => {
                    el.attributes.shift_remove(name);
                }
            }
        }
    }

    /// Concatenated text of all descendant text nodes
    pub fn text_content(&self, id: NodeId) -> String {
        let mut text = String::new();
        for node in self.descendants(id) {
            if let Some(NodeKind::Text(t) | NodeKind::CData(t)) = self.kind(node) {
                text.push_str(t);
            }
        }
        text
    }

    fn push_node(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    /// Create a detached element
    pub fn create_element(&mut self, namespace: Option<&str>, local_name: &str) -> NodeId {
        self.push_node(NodeKind::Element(ElementData::new(namespace, local_name)))
    }

    pub(crate) fn create_node(&mut self, kind: NodeKind) -> NodeId {
        self.push_node(kind)
    }

    /// Create a detached text node
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeKind::Text(text.to_string()))
    }

    /// Detach a node from its parent. The node keeps its subtree.
    pub fn detach(&mut self, id: NodeId) {
        if let Some(parent) = self.parent(id) {
            self.nodes[parent.0].children.retain(|&c| c != id);
            self.nodes[id.0].parent = None;
        }
    }

    /// Insert `node` into `parent` before `reference`, or at the end when
    /// `reference` is `None`. An attached node is moved, keeping its identity.
    pub fn insert_before(
        &mut self,
        parent: NodeId,
        node: NodeId,
        reference: Option<NodeId>,
    ) -> TableResult<()> {
        if !self.contains(parent) || !self.contains(node) {
            return Err(TableError::Host(format!(
                "cannot insert {} into {}: unknown node",
                node, parent
            )));
        }
        match self.kind(parent) {
            Some(NodeKind::Element(_) | NodeKind::Document) => {}
            _ => {
                return Err(TableError::Host(format!(
                    "{} cannot hold child nodes",
                    parent
                )))
            }
        }
        if node == self.root() {
            return Err(TableError::Host("cannot move the document node".to_string()));
        }
        // Refuse to create a cycle
        let mut ancestor = Some(parent);
        while let Some(a) = ancestor {
            if a == node {
                return Err(TableError::Host(format!(
                    "cannot insert {} inside itself",
                    node
                )));
            }
            ancestor = self.parent(a);
        }
        if reference == Some(node) {
            return Ok(());
        }
        if let Some(reference) = reference {
            if self.parent(reference) != Some(parent) {
                return Err(TableError::Host(format!(
                    "{} is not a child of {}",
                    reference, parent
                )));
            }
        }

        self.detach(node);
        let index = match reference {
            Some(reference) => self.nodes[parent.0]
                .children
                .iter()
                .position(|&c| c == reference)
                .unwrap_or(self.nodes[parent.0].children.len()),
            None => self.nodes[parent.0].children.len(),
        };
        self.nodes[parent.0].children.insert(index, node);
        self.nodes[node.0].parent = Some(parent);
        Ok(())
    }

    /// Append `node` as the last child of `parent`
    pub fn append_child(&mut self, parent: NodeId, node: NodeId) -> TableResult<()> {
        self.insert_before(parent, node, None)
    }

    /// Open a batch. Every edit until the matching commit or discard is
    /// undone by [`Document::discard_batch`].
    pub fn begin_batch(&mut self) {
        self.batches.push(self.nodes.clone());
    }

    /// Keep the edits of the innermost batch
    pub fn commit_batch(&mut self) {
        self.batches.pop();
    }

    /// Roll back to the state at the innermost `begin_batch`
    pub fn discard_batch(&mut self) {
        if let Some(snapshot) = self.batches.pop() {
            self.nodes = snapshot;
        }
    }

    /// Number of open batches
    pub fn batch_depth(&self) -> usize {
        self.batches.len()
    }

    /// Install the structural completion callback consulted before a table
    /// edit is committed
    pub fn set_structure_check<F>(&mut self, check: F)
    where
        F: Fn(&Document, NodeId) -> bool + 'static,
    {
        self.structure_check = Some(Box::new(check));
    }

    pub fn clear_structure_check(&mut self) {
        self.structure_check = None;
    }

    /// Run the structural completion callback; accepts everything when none
    /// is installed
    pub fn check_structure(&self, root: NodeId) -> bool {
        match &self.structure_check {
            Some(check) => check(self, root),
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let root = doc.create_element(None, "row");
        doc.append_child(doc.root(), root).unwrap();
        let a = doc.create_element(None, "entry");
        let b = doc.create_element(None, "entry");
        doc.append_child(root, a).unwrap();
        doc.append_child(root, b).unwrap();
        (doc, root, a, b)
    }

    #[test]
    fn test_insert_before_moves_node() {
        let (mut doc, root, a, b) = sample();
        doc.insert_before(root, b, Some(a)).unwrap();
        assert_eq!(doc.children(root), &[b, a]);
        assert_eq!(doc.parent(b), Some(root));
    }

    #[test]
    fn test_insert_rejects_cycle() {
        let (mut doc, root, a, _) = sample();
        assert!(doc.append_child(a, root).is_err());
    }

    #[test]
    fn test_discard_batch_restores_tree() {
        let (mut doc, root, a, b) = sample();
        doc.begin_batch();
        doc.detach(a);
        doc.set_attribute(b, "colname", Some("c1"));
        let fresh = doc.create_element(None, "entry");
        doc.append_child(root, fresh).unwrap();
        doc.discard_batch();

        assert_eq!(doc.children(root), &[a, b]);
        assert_eq!(doc.attribute(b, "colname"), None);
        assert!(!doc.contains(fresh));
    }

    #[test]
    fn test_commit_batch_keeps_edits() {
        let (mut doc, root, a, b) = sample();
        doc.begin_batch();
        doc.detach(a);
        doc.commit_batch();
        assert_eq!(doc.children(root), &[b]);
        assert!(!doc.is_attached(a));
        assert_eq!(doc.batch_depth(), 0);
    }

    #[test]
    fn test_set_attribute_none_removes() {
        let (mut doc, _, a, _) = sample();
        doc.set_attribute(a, "morerows", Some("1"));
        assert_eq!(doc.attribute(a, "morerows"), Some("1"));
        doc.set_attribute(a, "morerows", None);
        assert_eq!(doc.attribute(a, "morerows"), None);
    }
}
