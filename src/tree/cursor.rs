//! Stateful tree walking

use super::Node;

/// Cursor over a subtree, starting at the node it was created from.
/// Whitespace is skipped, as in [`Node::children`].
#[derive(Debug, Clone)]
pub struct TreeCursor<'tree> {
    node: Node<'tree>,
    /// Child index taken at each level below the start
    path: Vec<usize>,
}

impl<'tree> TreeCursor<'tree> {
    pub fn new(node: Node<'tree>) -> Self {
        Self { node, path: Vec::new() }
    }

    pub fn node(&self) -> Node<'tree> {
        self.node.clone()
    }

    pub fn depth(&self) -> usize {
        self.path.len()
    }

    /// Field of the current node within its parent
    pub fn field_name(&self) -> Option<&'tree str> {
        let index = *self.path.last()?;
        self.node.parent()?.field_name_for_child(index)
    }

    pub fn goto_first_child(&mut self) -> bool {
        match self.node.child(0) {
            Some(child) => {
                self.node = child;
                self.path.push(0);
                true
            }
            None => false,
        }
    }

    pub fn goto_next_sibling(&mut self) -> bool {
        let Some(index) = self.path.last_mut() else {
            return false;
        };
        match self.node.next_sibling() {
            Some(sibling) => {
                self.node = sibling;
                *index += 1;
                true
            }
            None => false,
        }
    }

    pub fn goto_parent(&mut self) -> bool {
        if self.path.pop().is_none() {
            return false;
        }
        match self.node.parent() {
            Some(parent) => {
                self.node = parent;
                true
            }
            None => false,
        }
    }

    /// Visit every node of the subtree in document order
    pub fn preorder(mut self) -> impl Iterator<Item = Node<'tree>> {
        let mut done = false;
        std::iter::from_fn(move || {
            if done {
                return None;
            }
            let current = self.node();
            if !self.goto_first_child() {
                while !self.goto_next_sibling() {
                    if !self.goto_parent() {
                        done = true;
                        break;
                    }
                }
            }
            Some(current)
        })
    }
}
