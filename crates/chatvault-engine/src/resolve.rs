use std::collections::HashSet;

use chatvault_types::{BranchSelections, MessageNode};

use crate::error::SelectionError;
use crate::tree::ConversationTree;

/// Resolve the display path: the single root-to-leaf sequence rendered at
/// a given moment.
///
/// At a branch point the winner is, in priority order: the explicit
/// selection for that parent, the child on the pinned leaf's ancestor
/// chain, then the newest sibling (greatest `order_index`). Selections
/// and pins that reference ids missing from the tree are ignored.
///
/// Pure and deterministic, so callers can recompute it on every render
/// instead of caching.
pub fn resolve_path<'a>(
    tree: &'a ConversationTree,
    selections: &BranchSelections,
    pinned_leaf: Option<&str>,
) -> Vec<&'a MessageNode> {
    let pinned_chain = pinned_leaf
        .and_then(|leaf| ancestor_chain(tree, leaf))
        .unwrap_or_default();

    let mut path = Vec::new();
    let mut current = tree.root_id.as_str();
    loop {
        path.push(&tree.by_id[current]);

        current = match tree.children(current) {
            [] => break,
            [only] => only.as_str(),
            children => selections
                .get(current)
                .and_then(|chosen| children.iter().find(|c| *c == chosen))
                .or_else(|| children.iter().find(|c| pinned_chain.contains(c.as_str())))
                // siblings are sorted ascending, so the last one is newest
                .unwrap_or_else(|| &children[children.len() - 1])
                .as_str(),
        };
    }
    path
}

/// Re-point a branch choice and discard overrides stranded in the
/// abandoned subtree.
///
/// An entry survives only while its key is still governable under the new
/// choice: on the root-to-`parent_id` ancestor chain, or inside
/// `new_child_id`'s subtree. Anything else belonged to a sibling subtree
/// the new choice just abandoned; keeping it would let a later branch
/// point pick up a stale id when similar subtrees recur. Returns a new
/// map; the input is never mutated. The live set is re-derived from the
/// current tree on every call, never cached.
pub fn update_branch_selection(
    selections: &BranchSelections,
    parent_id: &str,
    new_child_id: &str,
    tree: &ConversationTree,
) -> Result<BranchSelections, SelectionError> {
    if !tree.by_id.contains_key(parent_id) {
        return Err(SelectionError::UnknownParent(parent_id.to_string()));
    }
    if !tree.children(parent_id).iter().any(|c| c == new_child_id) {
        return Err(SelectionError::NotAChild {
            parent: parent_id.to_string(),
            child: new_child_id.to_string(),
        });
    }

    let mut live = ancestor_chain(tree, parent_id).unwrap_or_default();
    let mut stack = vec![new_child_id];
    while let Some(id) = stack.pop() {
        live.insert(id);
        stack.extend(tree.children(id).iter().map(String::as_str));
    }

    let mut next: BranchSelections = selections
        .iter()
        .filter(|(key, _)| live.contains(key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    next.insert(parent_id.to_string(), new_child_id.to_string());
    Ok(next)
}

/// Ids on the parent chain from `id` up to the root, inclusive. `None`
/// when `id` is not in the tree.
fn ancestor_chain<'a>(tree: &'a ConversationTree, id: &'a str) -> Option<HashSet<&'a str>> {
    let mut chain = HashSet::new();
    let mut current = tree.by_id.get(id)?;
    loop {
        chain.insert(current.id.as_str());
        match current.parent_id.as_deref() {
            Some(parent) => current = tree.by_id.get(parent)?,
            None => break,
        }
    }
    Some(chain)
}
