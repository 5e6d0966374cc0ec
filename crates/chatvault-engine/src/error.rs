use std::fmt;

/// Structural violation in a flat node list.
///
/// Raised by [`build_tree`](crate::build_tree). A sync run that hits this
/// on fetched data aborts before any store write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MalformedTree {
    /// Input node list was empty
    Empty,
    /// More than one node has no parent
    MultipleRoots { first: String, second: String },
    /// No node has a null parent
    MissingRoot,
    /// Two nodes share one id
    DuplicateNode(String),
    /// A parent id does not resolve within the node set
    DanglingParent { node: String, parent: String },
    /// A node is reachable from itself via parent links
    Cycle { node: String },
}

impl fmt::Display for MalformedTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MalformedTree::Empty => write!(f, "node list is empty"),
            MalformedTree::MultipleRoots { first, second } => {
                write!(f, "multiple roots: {} and {}", first, second)
            }
            MalformedTree::MissingRoot => write!(f, "no root node (every node has a parent)"),
            MalformedTree::DuplicateNode(id) => write!(f, "duplicate node id: {}", id),
            MalformedTree::DanglingParent { node, parent } => {
                write!(f, "node {} references missing parent {}", node, parent)
            }
            MalformedTree::Cycle { node } => {
                write!(f, "node {} is part of a parent-link cycle", node)
            }
        }
    }
}

impl std::error::Error for MalformedTree {}

/// Invalid input to a branch-selection update.
///
/// Selections describe a tree the caller already holds, so a miss here is
/// a caller contract violation rather than a recoverable state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    /// The branch-point node does not exist in the tree
    UnknownParent(String),
    /// The chosen node is not a child of the branch point
    NotAChild { parent: String, child: String },
}

impl fmt::Display for SelectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionError::UnknownParent(id) => write!(f, "unknown branch point: {}", id),
            SelectionError::NotAChild { parent, child } => {
                write!(f, "{} is not a child of {}", child, parent)
            }
        }
    }
}

impl std::error::Error for SelectionError {}
