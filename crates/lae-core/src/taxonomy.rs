//! Tree shaping over adjacency-list taxonomies.
//!
//! Nodes only know their parent. Everything here works on the flat node set
//! of one kind, as loaded from its table, and is purely in-memory.
//!
//! Both walks are iterative and keep a visited set, so they terminate on any
//! input. Nodes whose parent does not exist (orphans) and nodes caught in a
//! parent cycle are never reachable from a root and are left out.

use crate::models::TaxonomyNode;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use uuid::Uuid;

/// One node of a built forest with its direct children, recursively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TaxonomyTree {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub parent_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub children: Vec<TaxonomyTree>,
}

impl TaxonomyTree {
    fn leaf(node: &TaxonomyNode) -> Self {
        Self {
            id: node.id,
            name: node.name.clone(),
            description: node.description.clone(),
            parent_id: node.parent_id,
            created_at: node.created_at,
            children: Vec::new(),
        }
    }

    /// Number of nodes in this subtree, itself included.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(TaxonomyTree::len).sum::<usize>()
    }

    /// Pre-order flattening with depth, handy for indented listings.
    pub fn flatten(&self) -> Vec<(usize, &TaxonomyTree)> {
        let mut out = Vec::new();
        let mut stack = vec![(0usize, self)];
        while let Some((depth, node)) = stack.pop() {
            out.push((depth, node));
            for child in node.children.iter().rev() {
                stack.push((depth + 1, child));
            }
        }
        out
    }
}

/// Index from parent id to child positions, in input order.
fn children_index(nodes: &[TaxonomyNode]) -> HashMap<Uuid, Vec<usize>> {
    let mut index: HashMap<Uuid, Vec<usize>> = HashMap::new();
    for (pos, node) in nodes.iter().enumerate() {
        if let Some(parent_id) = node.parent_id {
            index.entry(parent_id).or_default().push(pos);
        }
    }
    index
}

/// Builds the forest rooted at every node with no parent.
///
/// Sibling order follows the order of `nodes`.
pub fn build_forest(nodes: &[TaxonomyNode]) -> Vec<TaxonomyTree> {
    let children = children_index(nodes);
    let roots: Vec<usize> = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| node.parent_id.is_none())
        .map(|(pos, _)| pos)
        .collect();

    let mut visited: HashSet<Uuid> = HashSet::new();
    let mut built: HashMap<usize, TaxonomyTree> = HashMap::new();
    // (position, children already pushed)
    let mut stack: Vec<(usize, bool)> = roots.iter().rev().map(|&pos| (pos, false)).collect();

    while let Some((pos, expanded)) = stack.pop() {
        let node = &nodes[pos];
        if expanded {
            let mut tree = TaxonomyTree::leaf(node);
            if let Some(kids) = children.get(&node.id) {
                tree.children = kids.iter().filter_map(|kid| built.remove(kid)).collect();
            }
            built.insert(pos, tree);
            continue;
        }
        if !visited.insert(node.id) {
            continue;
        }
        stack.push((pos, true));
        if let Some(kids) = children.get(&node.id) {
            for &kid in kids.iter().rev() {
                stack.push((kid, false));
            }
        }
    }

    roots.iter().filter_map(|pos| built.remove(pos)).collect()
}

/// Returns `root_id` followed by every descendant, depth-first in sibling
/// order. Empty when `root_id` is not in `nodes`.
pub fn descendant_closure(nodes: &[TaxonomyNode], root_id: Uuid) -> Vec<Uuid> {
    if !nodes.iter().any(|node| node.id == root_id) {
        return Vec::new();
    }
    let children = children_index(nodes);
    let mut visited: HashSet<Uuid> = HashSet::new();
    let mut closure = Vec::new();
    let mut stack = vec![root_id];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        closure.push(id);
        if let Some(kids) = children.get(&id) {
            for &kid in kids.iter().rev() {
                stack.push(nodes[kid].id);
            }
        }
    }
    closure
}

/// True when `candidate` is `node_id` itself or one of its descendants,
/// i.e. re-parenting `node_id` under `candidate` would close a cycle.
pub fn would_create_cycle(nodes: &[TaxonomyNode], node_id: Uuid, candidate: Uuid) -> bool {
    node_id == candidate || descendant_closure(nodes, node_id).contains(&candidate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn node(name: &str, parent_id: Option<Uuid>) -> TaxonomyNode {
        TaxonomyNode {
            id: Uuid::now_v7(),
            name: name.to_string(),
            description: None,
            parent_id,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_build_forest_nests_children_in_input_order() {
        let work = node("Work", None);
        let health = node("Health", None);
        let backend = node("Backend", Some(work.id));
        let frontend = node("Frontend", Some(work.id));
        let api = node("API", Some(backend.id));
        let nodes = vec![work.clone(), backend.clone(), health.clone(), api.clone(), frontend.clone()];

        let forest = build_forest(&nodes);

        assert_eq!(forest.len(), 2);
        assert_eq!(forest[0].name, "Work");
        assert_eq!(forest[1].name, "Health");
        let names: Vec<&str> = forest[0].children.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Backend", "Frontend"]);
        assert_eq!(forest[0].children[0].children[0].id, api.id);
        assert_eq!(forest[0].len(), 4);
    }

    #[test]
    fn test_build_forest_excludes_orphans() {
        let root = node("Root", None);
        let orphan = node("Orphan", Some(Uuid::now_v7()));
        let orphan_child = node("Orphan child", Some(orphan.id));
        let forest = build_forest(&[root.clone(), orphan, orphan_child]);

        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, root.id);
        assert!(forest[0].children.is_empty());
    }

    #[test]
    fn test_build_forest_terminates_on_cycles() {
        let mut a = node("A", None);
        let b = node("B", Some(a.id));
        a.parent_id = Some(b.id);
        let mut selfish = node("Self", None);
        selfish.parent_id = Some(selfish.id);
        let root = node("Root", None);

        let forest = build_forest(&[a, b, selfish, root.clone()]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].id, root.id);
    }

    #[test]
    fn test_build_forest_ignores_duplicate_rows() {
        let root = node("Root", None);
        let child = node("Child", Some(root.id));
        let forest = build_forest(&[root.clone(), child.clone(), child.clone()]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].children.len(), 1);
    }

    #[test]
    fn test_descendant_closure() {
        let root = node("Root", None);
        let a = node("A", Some(root.id));
        let b = node("B", Some(root.id));
        let a1 = node("A1", Some(a.id));
        let other = node("Other", None);
        let nodes = vec![root.clone(), a.clone(), b.clone(), a1.clone(), other];

        assert_eq!(descendant_closure(&nodes, root.id), vec![root.id, a.id, a1.id, b.id]);
        assert_eq!(descendant_closure(&nodes, a.id), vec![a.id, a1.id]);
        assert!(descendant_closure(&nodes, Uuid::now_v7()).is_empty());
    }

    #[test]
    fn test_descendant_closure_is_cycle_safe() {
        let mut a = node("A", None);
        let b = node("B", Some(a.id));
        a.parent_id = Some(b.id);
        let closure = descendant_closure(&[a.clone(), b.clone()], a.id);
        assert_eq!(closure, vec![a.id, b.id]);
    }

    #[test]
    fn test_would_create_cycle() {
        let root = node("Root", None);
        let child = node("Child", Some(root.id));
        let grandchild = node("Grandchild", Some(child.id));
        let nodes = vec![root.clone(), child.clone(), grandchild.clone()];

        assert!(would_create_cycle(&nodes, root.id, grandchild.id));
        assert!(would_create_cycle(&nodes, child.id, child.id));
        assert!(!would_create_cycle(&nodes, grandchild.id, root.id));
    }

    #[test]
    fn test_flatten_reports_depth() {
        let root = node("Root", None);
        let child = node("Child", Some(root.id));
        let forest = build_forest(&[root, child]);
        let flat: Vec<(usize, &str)> = forest[0]
            .flatten()
            .into_iter()
            .map(|(depth, n)| (depth, n.name.as_str()))
            .collect();
        assert_eq!(flat, vec![(0, "Root"), (1, "Child")]);
    }

    // Random forests: parent of node i is None, an earlier node, or a
    // dangling id.
    fn arb_nodes() -> impl Strategy<Value = Vec<TaxonomyNode>> {
        prop::collection::vec(prop::option::of(0usize..64), 0..40).prop_map(|parents| {
            let mut nodes: Vec<TaxonomyNode> = Vec::with_capacity(parents.len());
            for (i, parent) in parents.into_iter().enumerate() {
                let parent_id = match parent {
                    Some(p) if p < i => Some(nodes[p].id),
                    Some(_) => Some(Uuid::now_v7()),
                    None => None,
                };
                nodes.push(node(&format!("n{i}"), parent_id));
            }
            nodes
        })
    }

    fn reachable_from_root(nodes: &[TaxonomyNode], target: &TaxonomyNode) -> bool {
        let by_id: HashMap<Uuid, &TaxonomyNode> = nodes.iter().map(|n| (n.id, n)).collect();
        let mut current = target;
        loop {
            match current.parent_id {
                None => return true,
                Some(parent_id) => match by_id.get(&parent_id) {
                    Some(parent) => current = parent,
                    None => return false,
                },
            }
        }
    }

    proptest! {
        #[test]
        fn prop_forest_holds_exactly_the_reachable_nodes(nodes in arb_nodes()) {
            let forest = build_forest(&nodes);
            let in_forest: HashSet<Uuid> = forest
                .iter()
                .flat_map(|tree| tree.flatten().into_iter().map(|(_, n)| n.id))
                .collect();
            for n in &nodes {
                prop_assert_eq!(in_forest.contains(&n.id), reachable_from_root(&nodes, n));
            }
            let total: usize = forest.iter().map(TaxonomyTree::len).sum();
            prop_assert_eq!(total, in_forest.len());
        }
    }
}
