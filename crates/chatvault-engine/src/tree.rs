use std::collections::HashMap;

use chatvault_types::MessageNode;

use crate::error::MalformedTree;

/// Linked view of one conversation's nodes.
///
/// An arena of nodes indexed by id plus an explicit children index.
/// The index is rebuilt on every [`build_tree`] call; conversations are
/// small and reconstruction is easier to keep correct than incremental
/// maintenance.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationTree {
    pub root_id: String,
    pub by_id: HashMap<String, MessageNode>,
    pub children_of: HashMap<String, Vec<String>>,
}

impl ConversationTree {
    pub fn node(&self, id: &str) -> Option<&MessageNode> {
        self.by_id.get(id)
    }

    /// Children of `id`, ascending by `order_index`. Empty for leaves and
    /// unknown ids.
    pub fn children(&self, id: &str) -> &[String] {
        self.children_of.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn parent_of(&self, id: &str) -> Option<&str> {
        self.by_id.get(id)?.parent_id.as_deref()
    }

    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

/// Build the linked tree from a flat node list. No input ordering assumed.
///
/// Pure validation plus indexing: used by the sync path to vet fetched
/// data before it touches the store, and by the read path to serve
/// traversals. Sibling lists come out sorted ascending by `order_index`,
/// so the output is deterministic for a given input set.
pub fn build_tree(nodes: &[MessageNode]) -> Result<ConversationTree, MalformedTree> {
    if nodes.is_empty() {
        return Err(MalformedTree::Empty);
    }

    let mut by_id: HashMap<String, MessageNode> = HashMap::with_capacity(nodes.len());
    let mut root_id: Option<String> = None;

    for node in nodes {
        if node.parent_id.is_none() {
            match &root_id {
                Some(first) => {
                    return Err(MalformedTree::MultipleRoots {
                        first: first.clone(),
                        second: node.id.clone(),
                    });
                }
                None => root_id = Some(node.id.clone()),
            }
        }
        if by_id.insert(node.id.clone(), node.clone()).is_some() {
            return Err(MalformedTree::DuplicateNode(node.id.clone()));
        }
    }

    let root_id = root_id.ok_or(MalformedTree::MissingRoot)?;

    let mut children_of: HashMap<String, Vec<String>> = HashMap::new();
    for node in by_id.values() {
        if let Some(parent) = &node.parent_id {
            if !by_id.contains_key(parent) {
                return Err(MalformedTree::DanglingParent {
                    node: node.id.clone(),
                    parent: parent.clone(),
                });
            }
            children_of
                .entry(parent.clone())
                .or_default()
                .push(node.id.clone());
        }
    }

    for siblings in children_of.values_mut() {
        siblings.sort_by_key(|id| by_id[id.as_str()].order_index);
    }

    detect_cycle(&by_id)?;

    Ok(ConversationTree {
        root_id,
        by_id,
        children_of,
    })
}

// Walk states: absent = unvisited, false = on the current walk, true = cleared.
fn detect_cycle(by_id: &HashMap<String, MessageNode>) -> Result<(), MalformedTree> {
    let mut cleared: HashMap<&str, bool> = HashMap::with_capacity(by_id.len());

    for start in by_id.keys() {
        if cleared.get(start.as_str()) == Some(&true) {
            continue;
        }

        let mut walk: Vec<&str> = Vec::new();
        let mut current = start.as_str();
        loop {
            match cleared.get(current) {
                Some(true) => break,
                Some(false) => {
                    return Err(MalformedTree::Cycle {
                        node: current.to_string(),
                    });
                }
                None => {}
            }
            cleared.insert(current, false);
            walk.push(current);

            match by_id[current].parent_id.as_deref() {
                Some(parent) => current = parent,
                None => break,
            }
        }

        for id in walk {
            cleared.insert(id, true);
        }
    }

    Ok(())
}
