//! Generic syntax tree contract consumed by the traversal engine.
//!
//! Upstream parsers are adapted either by implementing [`SyntaxNode`] on
//! their own node type, or by converting their output into the owned
//! [`Node`] tree provided here.

use serde::Serialize;

use crate::kind::{CanonicalKind, NativeKind};

/// A node of an already-parsed SQL syntax tree.
///
/// Children are ordered; the engine walks them left to right.
pub trait SyntaxNode: Sized {
    /// Parser-native node type
    type Kind: NativeKind;

    /// Native node type of this node
    fn kind(&self) -> &Self::Kind;

    /// Leaf payload, e.g. an identifier fragment
    fn text(&self) -> Option<&str>;

    /// Ordered children
    fn children(&self) -> &[Self];

    /// Canonical kind of this node
    fn canonical_kind(&self) -> CanonicalKind {
        self.kind().canonical()
    }

    fn is_leaf(&self) -> bool {
        self.children().is_empty()
    }

    /// First direct child whose canonical kind is `kind`
    fn child_of_kind(&self, kind: CanonicalKind) -> Option<&Self> {
        self.children()
            .iter()
            .find(|child| child.canonical_kind() == kind)
    }
}

/// Owned syntax tree node, generic over the native kind.
///
/// `Node<CanonicalKind>` is a tree already expressed in canonical terms.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node<K> {
    kind: K,
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    children: Vec<Node<K>>,
}

impl<K> Node<K> {
    /// Create a node with no text and no children
    pub fn new(kind: K) -> Self {
        Self {
            kind,
            text: None,
            children: Vec::new(),
        }
    }

    /// Create a childless node carrying `text`
    pub fn leaf(kind: K, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: Some(text.into()),
            children: Vec::new(),
        }
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_child(mut self, child: Node<K>) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = Node<K>>) -> Self {
        self.children.extend(children);
        self
    }

    /// Append a child in last position
    pub fn push(&mut self, child: Node<K>) {
        self.children.push(child);
    }
}

impl<K: NativeKind> SyntaxNode for Node<K> {
    type Kind = K;

    fn kind(&self) -> &K {
        &self.kind
    }

    fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    fn children(&self) -> &[Self] {
        &self.children
    }
}

// Trees coming from pathological input can be far deeper than the native
// stack allows for a recursive drop.
impl<K> Drop for Node<K> {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(mut node) = pending.pop() {
            pending.append(&mut node.children);
        }
    }
}
