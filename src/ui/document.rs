//! Accessibility tree for the terminal page
//!
//! The terminal has no DOM, so the page keeps its own tree of nodes with
//! roles, `aria-*` attributes, tab indices and a single active element.
//! Focus handling and assistive-tech semantics operate on this tree; the
//! ratatui renderer reads it to draw focus indicators.
//!
//! Removing a node frees its slot for reuse. Each slot carries a generation
//! that is bumped on free, so a stale id is still detected with
//! [`Document::is_attached`] after its slot has been handed out again.

use std::collections::BTreeMap;

use tracing::debug;

/// Attribute names used by the widgets
pub mod aria {
    pub const HIDDEN: &str = "aria-hidden";
    pub const MODAL: &str = "aria-modal";
    pub const LABELLEDBY: &str = "aria-labelledby";
    pub const DESCRIBEDBY: &str = "aria-describedby";
    pub const INVALID: &str = "aria-invalid";
    pub const REQUIRED: &str = "aria-required";
    pub const LABEL: &str = "aria-label";
}

/// Handle to a node in a [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId {
    index: usize,
    generation: u32,
}

/// Node role, mirroring the ARIA roles the widgets need
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Body,
    Main,
    Dialog,
    Heading,
    Paragraph,
    Form,
    Group,
    Button,
    Link,
    TextInput,
    Select,
    Alert,
    Text,
}

impl Role {
    /// ARIA role string
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Body => "document",
            Role::Main => "main",
            Role::Dialog => "dialog",
            Role::Heading => "heading",
            Role::Paragraph => "paragraph",
            Role::Form => "form",
            Role::Group => "group",
            Role::Button => "button",
            Role::Link => "link",
            Role::TextInput => "textbox",
            Role::Select => "combobox",
            Role::Alert => "alert",
            Role::Text => "text",
        }
    }

    /// Roles that take part in the Tab order without an explicit tab index
    pub fn is_natively_focusable(&self) -> bool {
        matches!(
            self,
            Role::Button | Role::Link | Role::TextInput | Role::Select
        )
    }
}

/// Description of a node to insert
#[derive(Debug, Clone)]
pub struct Node {
    role: Role,
    element_id: Option<String>,
    text: String,
    attributes: BTreeMap<String, String>,
    tab_index: Option<i32>,
    disabled: bool,
}

impl Node {
    pub fn new(role: Role) -> Self {
        Self {
            role,
            element_id: None,
            text: String::new(),
            attributes: BTreeMap::new(),
            tab_index: None,
            disabled: false,
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.element_id = Some(id.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_attribute(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_tab_index(mut self, tab_index: i32) -> Self {
        self.tab_index = Some(tab_index);
        self
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn element_id(&self) -> Option<&str> {
        self.element_id.as_deref()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }
}

#[derive(Debug, Clone)]
struct Entry {
    node: Node,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// The page's accessibility tree
#[derive(Debug, Clone)]
pub struct Document {
    slots: Vec<Slot>,
    free: Vec<usize>,
    body: NodeId,
    active: Option<NodeId>,
    scroll_locked: bool,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    /// Create a document holding only a body node
    pub fn new() -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                entry: Some(Entry {
                    node: Node::new(Role::Body),
                    parent: None,
                    children: Vec::new(),
                }),
            }],
            free: Vec::new(),
            body: NodeId {
                index: 0,
                generation: 0,
            },
            active: None,
            scroll_locked: false,
        }
    }

    pub fn body(&self) -> NodeId {
        self.body
    }

    fn entry(&self, id: NodeId) -> Option<&Entry> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
    }

    fn entry_mut(&mut self, id: NodeId) -> Option<&mut Entry> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
    }

    fn allocate(&mut self, entry: Entry) -> NodeId {
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.entry = Some(entry);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        }
    }

    fn release(&mut self, id: NodeId) {
        if let Some(slot) = self.slots.get_mut(id.index) {
            if slot.generation == id.generation && slot.entry.take().is_some() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(id.index);
            }
        }
    }

    /// Append a node as the last child of `parent`
    ///
    /// Appending under a removed parent returns an id that is already stale.
    pub fn append(&mut self, parent: NodeId, node: Node) -> NodeId {
        let attached = self.is_attached(parent);
        let id = self.allocate(Entry {
            node,
            parent: Some(parent),
            children: Vec::new(),
        });

        if attached {
            if let Some(entry) = self.entry_mut(parent) {
                entry.children.push(id);
                return id;
            }
        }

        debug!("Parent {:?} is gone, dropping appended node", parent);
        self.release(id);
        id
    }

    /// Remove `id` and its subtree, freeing their slots
    ///
    /// If the active element was inside the subtree, focus falls back to body.
    pub fn remove(&mut self, id: NodeId) {
        if id == self.body || !self.is_attached(id) {
            return;
        }

        if let Some(parent) = self.parent(id) {
            if let Some(entry) = self.entry_mut(parent) {
                entry.children.retain(|&child| child != id);
            }
        }

        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(entry) = self.entry(current) {
                stack.extend(entry.children.iter().copied());
            }
            self.release(current);
        }

        if let Some(active) = self.active {
            if !self.is_attached(active) {
                debug!("Active element {:?} removed, focus returns to body", active);
                self.active = None;
            }
        }
    }

    pub fn is_attached(&self, id: NodeId) -> bool {
        self.entry(id).is_some()
    }

    /// Number of live nodes, body included
    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Slots allocated so far, live or free
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.entry(id).map(|e| &e.node)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).and_then(|e| e.parent)
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.entry(id)
            .map(|e| e.children.as_slice())
            .unwrap_or(&[])
    }

    pub fn set_text(&mut self, id: NodeId, text: impl Into<String>) {
        if let Some(entry) = self.entry_mut(id) {
            entry.node.text = text.into();
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.node(id)
            .and_then(|n| n.attributes.get(name))
            .map(String::as_str)
    }

    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: impl Into<String>) {
        if let Some(entry) = self.entry_mut(id) {
            entry.node.attributes.insert(name.to_string(), value.into());
        }
    }

    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        self.entry_mut(id)
            .and_then(|entry| entry.node.attributes.remove(name))
    }

    /// Enable or disable a control; a disabled control loses focus
    pub fn set_disabled(&mut self, id: NodeId, disabled: bool) {
        if let Some(entry) = self.entry_mut(id) {
            entry.node.disabled = disabled;
        }
        if disabled && self.active == Some(id) {
            self.active = None;
        }
    }

    /// Whether `id` can receive focus programmatically
    pub fn is_focusable(&self, id: NodeId) -> bool {
        match self.node(id) {
            Some(node) if !node.disabled => {
                node.role.is_natively_focusable() || node.tab_index.is_some()
            }
            _ => false,
        }
    }

    /// Whether `id` takes part in sequential (Tab) navigation
    pub fn is_tabbable(&self, id: NodeId) -> bool {
        if !self.is_focusable(id) {
            return false;
        }
        match self.node(id).and_then(|n| n.tab_index) {
            Some(index) => index >= 0,
            None => true,
        }
    }

    /// Move focus to `id`; returns false if the node cannot take focus
    pub fn focus(&mut self, id: NodeId) -> bool {
        if !self.is_focusable(id) {
            return false;
        }
        self.active = Some(id);
        true
    }

    /// Drop focus back to the body
    pub fn blur(&mut self) {
        self.active = None;
    }

    /// The focused node, or `None` when focus rests on the body
    pub fn active_element(&self) -> Option<NodeId> {
        self.active.filter(|&id| self.is_attached(id))
    }

    pub fn is_focused(&self, id: NodeId) -> bool {
        self.active_element() == Some(id)
    }

    /// Attached descendants of `root` in tree order, excluding `root`
    pub fn descendants(&self, root: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        if !self.is_attached(root) {
            return out;
        }
        let mut stack: Vec<NodeId> = self.children(root).iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            stack.extend(self.children(id).iter().rev().copied());
        }
        out
    }

    /// Tabbable descendants of `container` in tree order
    pub fn focusable_descendants(&self, container: NodeId) -> Vec<NodeId> {
        self.descendants(container)
            .into_iter()
            .filter(|&id| self.is_tabbable(id))
            .collect()
    }

    /// Whether `node` is `ancestor` or lies inside it
    pub fn contains(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.parent(id);
        }
        false
    }

    /// First attached node with `role`, in tree order
    pub fn find_by_role(&self, role: Role) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .find(|&id| self.node(id).map(|n| n.role) == Some(role))
    }

    /// Attached node whose element id equals `element_id`
    pub fn find_by_element_id(&self, element_id: &str) -> Option<NodeId> {
        self.descendants(self.body)
            .into_iter()
            .find(|&id| self.node(id).and_then(|n| n.element_id()) == Some(element_id))
    }

    pub fn set_scroll_locked(&mut self, locked: bool) {
        self.scroll_locked = locked;
    }

    pub fn is_scroll_locked(&self) -> bool {
        self.scroll_locked
    }

    /// Whether assistive tech can reach `id` (no `aria-hidden` ancestor)
    pub fn is_exposed(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.attribute(node, aria::HIDDEN) == Some("true") {
                return false;
            }
            current = self.parent(node);
        }
        self.is_attached(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new();
        let main = doc.append(doc.body(), Node::new(Role::Main));
        let button = doc.append(main, Node::new(Role::Button).with_id("open"));
        let heading = doc.append(main, Node::new(Role::Heading).with_tab_index(-1));
        (doc, main, button, heading)
    }

    #[test]
    fn test_focus_rules() {
        let (mut doc, main, button, heading) = sample();

        assert!(!doc.focus(main));
        assert!(doc.focus(button));
        assert_eq!(doc.active_element(), Some(button));

        // Programmatically focusable, but not in the Tab order
        assert!(doc.focus(heading));
        assert!(!doc.is_tabbable(heading));
        assert_eq!(doc.focusable_descendants(main), vec![button]);
    }

    #[test]
    fn test_remove_detaches_subtree_and_clears_focus() {
        let (mut doc, main, button, _) = sample();
        doc.focus(button);

        doc.remove(main);

        assert!(!doc.is_attached(main));
        assert!(!doc.is_attached(button));
        assert_eq!(doc.active_element(), None);
        assert!(!doc.focus(button));
        assert!(doc.find_by_role(Role::Main).is_none());
    }

    #[test]
    fn test_disabled_nodes_leave_tab_order() {
        let (mut doc, main, button, _) = sample();
        doc.focus(button);
        doc.set_disabled(button, true);

        assert_eq!(doc.active_element(), None);
        assert!(doc.focusable_descendants(main).is_empty());
    }

    #[test]
    fn test_tree_order_and_lookup() {
        let mut doc = Document::new();
        let main = doc.append(doc.body(), Node::new(Role::Main));
        let group = doc.append(main, Node::new(Role::Group));
        let a = doc.append(group, Node::new(Role::TextInput).with_id("a"));
        let b = doc.append(main, Node::new(Role::Button).with_id("b"));
        let c = doc.append(group, Node::new(Role::Select).with_id("c"));

        assert_eq!(doc.focusable_descendants(main), vec![a, c, b]);
        assert_eq!(doc.find_by_element_id("c"), Some(c));
        assert!(doc.contains(main, c));
        assert!(!doc.contains(group, b));
    }

    #[test]
    fn test_removed_slots_are_reused_without_reviving_stale_ids() {
        let (mut doc, main, button, _) = sample();
        doc.remove(main);
        assert_eq!(doc.len(), 1);

        let fresh = doc.append(doc.body(), Node::new(Role::Button).with_id("fresh"));
        assert!(doc.is_attached(fresh));
        assert!(!doc.is_attached(button));
        assert!(!doc.is_attached(main));
        assert_ne!(fresh, button);
        assert_ne!(fresh, main);
        assert!(!doc.focus(button));
        assert!(doc.node(main).is_none());
        assert_eq!(doc.capacity(), 4);
    }

    #[test]
    fn test_append_under_removed_parent_is_stale() {
        let (mut doc, main, _, _) = sample();
        doc.remove(main);

        let orphan = doc.append(main, Node::new(Role::Button));
        assert!(!doc.is_attached(orphan));
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_repeated_mount_cycles_keep_arena_bounded() {
        let mut doc = Document::new();
        for _ in 0..1000 {
            let dialog = doc.append(doc.body(), Node::new(Role::Dialog));
            for _ in 0..10 {
                let group = doc.append(dialog, Node::new(Role::Group));
                doc.append(group, Node::new(Role::TextInput));
            }
            doc.remove(dialog);
        }
        assert_eq!(doc.len(), 1);
        assert!(doc.capacity() <= 22);
    }

    #[test]
    fn test_hidden_ancestor_hides_descendants() {
        let (mut doc, main, button, _) = sample();
        assert!(doc.is_exposed(button));

        doc.set_attribute(main, aria::HIDDEN, "true");
        assert!(!doc.is_exposed(button));

        doc.remove_attribute(main, aria::HIDDEN);
        assert!(doc.is_exposed(button));
    }
}
