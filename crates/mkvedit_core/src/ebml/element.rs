//! Element tree node types.
//!
//! A node is either a leaf holding a scalar value or a master owning an
//! ordered list of children. Masters exclusively own their children, so
//! removing a child drops its whole subtree.

use super::ids::ElementId;
use super::schema;

/// Scalar payload of a leaf element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Unsigned integer.
    Unsigned(u64),
    /// Signed integer.
    Signed(i64),
    /// UTF-8 string.
    Utf8(String),
    /// Raw bytes.
    Binary(Vec<u8>),
}

impl Value {
    /// Value as unsigned integer (signed values are reinterpreted when non-negative).
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            Value::Unsigned(v) => Some(*v),
            Value::Signed(v) => u64::try_from(*v).ok(),
            _ => None,
        }
    }

    /// Value as signed integer.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Unsigned(v) => i64::try_from(*v).ok(),
            Value::Signed(v) => Some(*v),
            _ => None,
        }
    }

    /// Value as string slice.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Utf8(s) => Some(s),
            _ => None,
        }
    }
}

/// Leaf value or owned children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Content {
    Leaf(Value),
    Master(Vec<Element>),
}

/// A typed node of an EBML document tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Element type identifier.
    pub id: ElementId,
    /// Payload.
    pub content: Content,
}

impl Element {
    /// Create an empty master element.
    pub fn master(id: ElementId) -> Self {
        Self {
            id,
            content: Content::Master(Vec::new()),
        }
    }

    /// Create a master element with the given children.
    pub fn master_with(id: ElementId, children: Vec<Element>) -> Self {
        Self {
            id,
            content: Content::Master(children),
        }
    }

    /// Create a leaf element.
    pub fn leaf(id: ElementId, value: Value) -> Self {
        Self {
            id,
            content: Content::Leaf(value),
        }
    }

    pub fn unsigned(id: ElementId, value: u64) -> Self {
        Self::leaf(id, Value::Unsigned(value))
    }

    pub fn signed(id: ElementId, value: i64) -> Self {
        Self::leaf(id, Value::Signed(value))
    }

    pub fn utf8(id: ElementId, value: impl Into<String>) -> Self {
        Self::leaf(id, Value::Utf8(value.into()))
    }

    pub fn binary(id: ElementId, value: Vec<u8>) -> Self {
        Self::leaf(id, Value::Binary(value))
    }

    /// Create a default-valued instance of the element type `id`.
    ///
    /// Masters come back empty; leaves carry the schema default, or the
    /// zero value of their kind when the schema defines none.
    pub fn with_default(id: ElementId) -> Self {
        schema::default_element(id)
    }

    /// Check the element type.
    pub fn is(&self, id: ElementId) -> bool {
        self.id == id
    }

    pub fn is_master(&self) -> bool {
        matches!(self.content, Content::Master(_))
    }

    /// Leaf value, `None` for masters.
    pub fn value(&self) -> Option<&Value> {
        match &self.content {
            Content::Leaf(v) => Some(v),
            Content::Master(_) => None,
        }
    }

    pub fn as_u64(&self) -> Option<u64> {
        self.value().and_then(Value::as_u64)
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.value().and_then(Value::as_i64)
    }

    pub fn as_str(&self) -> Option<&str> {
        self.value().and_then(Value::as_str)
    }

    /// Replace the leaf value. Has no effect on masters.
    pub fn set_value(&mut self, value: Value) {
        if let Content::Leaf(v) = &mut self.content {
            *v = value;
        }
    }

    /// Children of a master; empty for leaves.
    pub fn children(&self) -> &[Element] {
        match &self.content {
            Content::Master(children) => children,
            Content::Leaf(_) => &[],
        }
    }

    /// Mutable children list of a master.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Element>> {
        match &mut self.content {
            Content::Master(children) => Some(children),
            Content::Leaf(_) => None,
        }
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children().len()
    }

    pub fn is_empty(&self) -> bool {
        self.children().is_empty()
    }

    /// Append a child. Leaves silently ignore the call.
    pub fn push(&mut self, child: Element) {
        debug_assert!(self.is_master(), "push on leaf element {:#x}", self.id);
        if let Some(children) = self.children_mut() {
            children.push(child);
        }
    }

    /// Take ownership of all children, leaving the master empty.
    pub fn take_children(&mut self) -> Vec<Element> {
        self.children_mut().map(std::mem::take).unwrap_or_default()
    }

    /// Keep only the children for which `keep` returns true.
    pub fn retain_children(&mut self, keep: impl FnMut(&Element) -> bool) {
        if let Some(children) = self.children_mut() {
            children.retain(keep);
        }
    }

    /// Remove and return all direct children of type `id`, preserving order.
    pub fn remove_children(&mut self, id: ElementId) -> Vec<Element> {
        let Some(children) = self.children_mut() else {
            return Vec::new();
        };
        let (removed, kept): (Vec<_>, Vec<_>) =
            std::mem::take(children).into_iter().partition(|c| c.is(id));
        *children = kept;
        removed
    }

    /// First direct child of type `id`.
    pub fn find_child(&self, id: ElementId) -> Option<&Element> {
        self.children().iter().find(|c| c.is(id))
    }

    pub fn find_child_mut(&mut self, id: ElementId) -> Option<&mut Element> {
        self.children_mut()?.iter_mut().find(|c| c.is(id))
    }

    /// Direct children of type `id`.
    pub fn children_of(&self, id: ElementId) -> impl Iterator<Item = &Element> {
        self.children().iter().filter(move |c| c.is(id))
    }

    /// Value of the first child of type `id` as unsigned integer.
    pub fn child_u64(&self, id: ElementId) -> Option<u64> {
        self.find_child(id).and_then(Element::as_u64)
    }

    pub fn child_i64(&self, id: ElementId) -> Option<i64> {
        self.find_child(id).and_then(Element::as_i64)
    }

    pub fn child_str(&self, id: ElementId) -> Option<&str> {
        self.find_child(id).and_then(Element::as_str)
    }

    /// First child of type `id`, appending a default-valued one if missing.
    /// `None` for leaves.
    pub fn child_or_insert(&mut self, id: ElementId) -> Option<&mut Element> {
        let children = self.children_mut()?;
        let idx = match children.iter().position(|c| c.is(id)) {
            Some(idx) => idx,
            None => {
                children.push(Element::with_default(id));
                children.len() - 1
            }
        };
        children.get_mut(idx)
    }

    /// Set (creating if necessary) the first child of type `id` to `value`.
    /// Does nothing on a leaf.
    pub fn set_child(&mut self, id: ElementId, value: Value) {
        if let Some(child) = self.child_or_insert(id) {
            child.set_value(value);
        }
    }

    pub fn set_child_u64(&mut self, id: ElementId, value: u64) {
        self.set_child(id, Value::Unsigned(value));
    }

    pub fn set_child_str(&mut self, id: ElementId, value: impl Into<String>) {
        self.set_child(id, Value::Utf8(value.into()));
    }

    /// Depth-first visit of every element below (not including) `self`.
    pub fn walk(&self, visit: &mut impl FnMut(&Element)) {
        for child in self.children() {
            visit(child);
            child.walk(visit);
        }
    }

    /// Mutable depth-first visit of every element below `self`.
    pub fn walk_mut(&mut self, visit: &mut impl FnMut(&mut Element)) {
        if let Some(children) = self.children_mut() {
            for child in children.iter_mut() {
                visit(child);
                child.walk_mut(visit);
            }
        }
    }

    /// Human readable element name from the schema table.
    pub fn name(&self) -> &'static str {
        schema::name_of(self.id)
    }
}
