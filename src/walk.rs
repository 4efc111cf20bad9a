//! Depth-first traversal of tree-sitter trees.
//!
//! [`walk_tree`] visits every node (named and anonymous) once. Each node is
//! entered before its children and left after all of them have been entered
//! and left, and siblings are visited left to right in source order.

use tree_sitter::Node;

/// Callbacks driven by [`walk_tree`].
pub trait Visitor {
    /// Called before any child of `node` is visited.
    ///
    /// Returning `false` skips the children of `node`. The node itself is
    /// still left.
    fn on_enter_node(&mut self, node: Node<'_>) -> bool;

    /// Called once all children of `node` have been visited.
    fn on_leave_node(&mut self, node: Node<'_>);
}

/// Walk the subtree rooted at `root`, driving `visitor`.
///
/// Uses a tree cursor rather than recursion, so deeply nested sources
/// cannot overflow the stack.
pub fn walk_tree<V: Visitor + ?Sized>(root: Node<'_>, visitor: &mut V) {
    let mut cursor = root.walk();
    let mut depth = 0usize;

    loop {
        let node = cursor.node();
        if visitor.on_enter_node(node) && cursor.goto_first_child() {
            depth += 1;
            continue;
        }
        visitor.on_leave_node(node);

        // Climb until a sibling is found or we are back at the root.
        loop {
            if depth == 0 {
                return;
            }
            if cursor.goto_next_sibling() {
                break;
            }
            cursor.goto_parent();
            depth -= 1;
            visitor.on_leave_node(cursor.node());
        }
    }
}
