//! Grouping Engine
//!
//! Pure functions over node lists. Nodes reference their container by
//! `parent_id` and store their position relative to it, so every absolute
//! coordinate is computed by walking the ancestor chain.
//!
//! The graph store applies the returned node lists with one `replace_all`, which
//! makes each grouping operation a single undo step.

use crate::error::ValidationError;
use crate::models::{BoundingBox, Node, NodePayload, Position};
use std::collections::HashSet;
use uuid::Uuid;

/// Label given to containers created by `group`
pub const DEFAULT_GROUP_LABEL: &str = "Group";

#[derive(Debug, Clone, PartialEq)]
pub struct GroupOutcome {
    pub nodes: Vec<Node>,
    pub group_id: String,
}

/// Absolute position of `id`, resolving parents through `lookup`.
///
/// Returns `None` if `id` is unknown. A parent that is missing ends the walk,
/// so orphaned children are treated as top-level. A corrupt chain that loops
/// is cut at the first repeated id.
pub fn absolute_position_with<'a, F>(lookup: F, id: &str) -> Option<Position>
where
    F: Fn(&str) -> Option<&'a Node>,
{
    let node = lookup(id)?;
    let mut position = node.position;
    let mut visited: HashSet<&str> = HashSet::from([node.id.as_str()]);
    let mut parent_id = node.parent_id.as_deref();

    while let Some(current) = parent_id {
        if !visited.insert(current) {
            tracing::warn!("Parent chain of {} loops at {}", id, current);
            break;
        }
        let Some(parent) = lookup(current) else {
            break;
        };
        position = position + parent.position;
        parent_id = parent.parent_id.as_deref();
    }

    Some(position)
}

pub fn absolute_position(nodes: &[Node], id: &str) -> Option<Position> {
    absolute_position_with(|key| find(nodes, key), id)
}

/// Ids of the direct children of `group_id`, in node order
pub fn children_of<'a>(nodes: &'a [Node], group_id: &str) -> Vec<&'a str> {
    nodes
        .iter()
        .filter(|node| node.parent_id.as_deref() == Some(group_id))
        .map(|node| node.id.as_str())
        .collect()
}

/// Wrap the selected nodes in a new group container.
///
/// The container sits at `bbox.min - padding` and spans `bbox + 2 * padding`;
/// members are reparented and their positions become relative to it. If every
/// member shares the same parent the container is nested under that parent.
/// Selected nodes whose ancestor is also selected move with that ancestor.
pub fn group(nodes: &[Node], ids: &[String], padding: f64) -> Result<GroupOutcome, ValidationError> {
    let requested: HashSet<&str> = ids.iter().map(String::as_str).collect();
    let members: Vec<&Node> = nodes
        .iter()
        .filter(|node| requested.contains(node.id.as_str()))
        .filter(|node| !has_selected_ancestor(nodes, node, &requested))
        .collect();

    if members.is_empty() {
        return Err(ValidationError::EmptySelection);
    }

    let absolute: Vec<(String, Position)> = members
        .iter()
        .map(|node| {
            let position = absolute_position(nodes, &node.id).unwrap_or(node.position);
            (node.id.clone(), position)
        })
        .collect();

    let bbox = BoundingBox::enclosing(
        members
            .iter()
            .zip(&absolute)
            .map(|(node, (_, position))| (*position, node.effective_size())),
    )
    .ok_or(ValidationError::EmptySelection)?;

    let shared_parent = members[0].parent_id.clone().filter(|parent| {
        members
            .iter()
            .all(|node| node.parent_id.as_deref() == Some(parent.as_str()))
    });

    let group_origin = Position::new(bbox.min.x - padding, bbox.min.y - padding);
    let group_size = crate::models::Size::new(
        bbox.width() + 2.0 * padding,
        bbox.height() + 2.0 * padding,
    );

    let local_origin = match &shared_parent {
        Some(parent) => {
            let parent_position = absolute_position(nodes, parent).unwrap_or(Position::ORIGIN);
            group_origin - parent_position
        }
        None => group_origin,
    };

    let group_id = format!("group-{}", Uuid::new_v4());
    let mut container = Node::new_with_id(
        group_id.clone(),
        NodePayload::group(DEFAULT_GROUP_LABEL),
        local_origin,
    )
    .with_size(group_size);
    container.parent_id = shared_parent;

    let first_member_index = nodes
        .iter()
        .position(|node| node.id == members[0].id)
        .unwrap_or(nodes.len());

    let mut result = Vec::with_capacity(nodes.len() + 1);
    for (index, node) in nodes.iter().enumerate() {
        if index == first_member_index {
            result.push(container.clone());
        }
        let mut node = node.clone();
        if let Some((_, position)) = absolute.iter().find(|(id, _)| *id == node.id) {
            node.position = *position - group_origin;
            node.parent_id = Some(group_id.clone());
        }
        result.push(node);
    }

    tracing::debug!("Grouped {} nodes into {}", members.len(), group_id);

    Ok(GroupOutcome {
        nodes: result,
        group_id,
    })
}

/// Detach nodes from their containers.
///
/// Each id may name a member (detached from its container) or a group (all of
/// its children are detached). Detached nodes move up one level keeping their
/// on-canvas position. Containers left with no children are removed.
pub fn ungroup(nodes: &[Node], ids: &[String]) -> Result<Vec<Node>, ValidationError> {
    let mut detach: Vec<String> = Vec::new();
    let mut queued: HashSet<&str> = HashSet::new();
    for id in ids {
        let node = find(nodes, id).ok_or_else(|| ValidationError::unknown_node(id))?;
        let members = if node.is_group() {
            children_of(nodes, id)
        } else if node.parent_id.is_some() {
            vec![node.id.as_str()]
        } else {
            Vec::new()
        };
        // A node named twice, or named alongside its group, moves once
        for member in members {
            if queued.insert(member) {
                detach.push(member.to_string());
            }
        }
    }

    if detach.is_empty() {
        return Err(ValidationError::EmptySelection);
    }

    let mut result: Vec<Node> = nodes.to_vec();
    let mut touched_groups: HashSet<String> = HashSet::new();

    for id in &detach {
        let Some(parent_id) = find(nodes, id).and_then(|node| node.parent_id.clone()) else {
            continue;
        };
        let Some(parent) = find(nodes, &parent_id) else {
            continue;
        };
        let (parent_position, grandparent) = (parent.position, parent.parent_id.clone());

        if let Some(node) = result.iter_mut().find(|node| node.id == *id) {
            node.position = node.position + parent_position;
            node.parent_id = grandparent;
        }
        touched_groups.insert(parent_id);
    }

    let empty_groups: HashSet<String> = touched_groups
        .into_iter()
        .filter(|group_id| children_of(&result, group_id).is_empty())
        .filter(|group_id| find(&result, group_id).is_some_and(Node::is_group))
        .collect();

    result.retain(|node| !empty_groups.contains(&node.id));

    tracing::debug!(
        "Ungrouped {} nodes, removed {} empty containers",
        detach.len(),
        empty_groups.len()
    );

    Ok(result)
}

/// Move `id` under `new_parent` (or to the top level), keeping its on-canvas position.
///
/// Rejects the change with `CyclicReparent` if `new_parent` is `id` itself or
/// one of its descendants.
pub fn reparent(
    nodes: &[Node],
    id: &str,
    new_parent: Option<&str>,
) -> Result<Vec<Node>, ValidationError> {
    let node = find(nodes, id).ok_or_else(|| ValidationError::unknown_node(id))?;

    let parent_origin = match new_parent {
        Some(parent_id) => {
            find(nodes, parent_id).ok_or_else(|| ValidationError::unknown_node(parent_id))?;
            if is_ancestor_or_self(nodes, id, parent_id) {
                return Err(ValidationError::cyclic_reparent(id, parent_id));
            }
            absolute_position(nodes, parent_id).unwrap_or(Position::ORIGIN)
        }
        None => Position::ORIGIN,
    };

    let absolute = absolute_position(nodes, id).unwrap_or(node.position);

    Ok(nodes
        .iter()
        .map(|candidate| {
            let mut candidate = candidate.clone();
            if candidate.id == id {
                candidate.position = absolute - parent_origin;
                candidate.parent_id = new_parent.map(str::to_string);
            }
            candidate
        })
        .collect())
}

/// Whether `ancestor` appears in the parent chain starting at `start` (inclusive)
fn is_ancestor_or_self(nodes: &[Node], ancestor: &str, start: &str) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = Some(start);
    while let Some(id) = current {
        if id == ancestor {
            return true;
        }
        if !visited.insert(id) {
            return false;
        }
        current = find(nodes, id).and_then(|node| node.parent_id.as_deref());
    }
    false
}

fn has_selected_ancestor(nodes: &[Node], node: &Node, selected: &HashSet<&str>) -> bool {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut current = node.parent_id.as_deref();
    while let Some(id) = current {
        if selected.contains(id) {
            return true;
        }
        if !visited.insert(id) {
            return false;
        }
        current = find(nodes, id).and_then(|parent| parent.parent_id.as_deref());
    }
    false
}

fn find<'a>(nodes: &'a [Node], id: &str) -> Option<&'a Node> {
    nodes.iter().find(|node| node.id == id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Size;

    fn text(id: &str, x: f64, y: f64) -> Node {
        Node::new_with_id(id, NodePayload::text(id), Position::new(x, y))
    }

    fn ids(values: &[&str]) -> Vec<String> {
        values.iter().map(|value| value.to_string()).collect()
    }

    #[test]
    fn test_group_places_container_with_padding() {
        let nodes = vec![text("a", 0.0, 0.0), text("b", 300.0, 0.0)];
        let outcome = group(&nodes, &ids(&["a", "b"]), 24.0).unwrap();

        let container = find(&outcome.nodes, &outcome.group_id).unwrap();
        assert!(container.is_group());
        assert_eq!(container.position, Position::new(-24.0, -24.0));
        assert_eq!(container.size, Some(Size::new(548.0, 148.0)));

        let a = find(&outcome.nodes, "a").unwrap();
        assert_eq!(a.parent_id.as_deref(), Some(outcome.group_id.as_str()));
        assert_eq!(a.position, Position::new(24.0, 24.0));
        assert_eq!(
            absolute_position(&outcome.nodes, "b"),
            Some(Position::new(300.0, 0.0))
        );
    }

    #[test]
    fn test_group_then_ungroup_restores_positions() {
        let nodes = vec![text("a", 10.0, 20.0), text("b", 400.0, 80.0), text("c", 0.0, 500.0)];
        let outcome = group(&nodes, &ids(&["a", "b"]), 24.0).unwrap();
        let restored = ungroup(&outcome.nodes, &[outcome.group_id.clone()]).unwrap();

        assert_eq!(restored, nodes);
    }

    #[test]
    fn test_group_empty_selection_is_rejected() {
        let nodes = vec![text("a", 0.0, 0.0)];
        assert_eq!(
            group(&nodes, &ids(&["missing"]), 24.0),
            Err(ValidationError::EmptySelection)
        );
    }

    #[test]
    fn test_ungroup_group_and_member_moves_member_once() {
        let nodes = vec![text("a", 0.0, 0.0), text("b", 100.0, 0.0)];
        let outcome = group(&nodes, &ids(&["a", "b"]), 24.0).unwrap();
        let group_id = outcome.group_id.clone();

        let restored = ungroup(&outcome.nodes, &[group_id.clone(), "a".to_string(), "a".to_string()]).unwrap();
        assert_eq!(restored, nodes);

        let restored = ungroup(&outcome.nodes, &[group_id, "a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(find(&restored, "a").unwrap().position, Position::new(0.0, 0.0));
        assert_eq!(find(&restored, "b").unwrap().position, Position::new(100.0, 0.0));
    }

    #[test]
    fn test_ungroup_single_member_keeps_non_empty_group() {
        let nodes = vec![text("a", 0.0, 0.0), text("b", 300.0, 0.0)];
        let outcome = group(&nodes, &ids(&["a", "b"]), 10.0).unwrap();
        let result = ungroup(&outcome.nodes, &ids(&["a"])).unwrap();

        assert!(find(&result, &outcome.group_id).is_some());
        let a = find(&result, "a").unwrap();
        assert!(a.parent_id.is_none());
        assert_eq!(a.position, Position::new(0.0, 0.0));
    }

    #[test]
    fn test_nested_absolute_position_walks_chain() {
        let nodes = vec![
            Node::new_with_id("outer", NodePayload::group("outer"), Position::new(100.0, 100.0)),
            Node::new_with_id("inner", NodePayload::group("inner"), Position::new(10.0, 10.0))
                .with_parent("outer"),
            text("leaf", 1.0, 2.0).with_parent("inner"),
        ];

        assert_eq!(
            absolute_position(&nodes, "leaf"),
            Some(Position::new(111.0, 112.0))
        );
    }

    #[test]
    fn test_reparent_rejects_cycle() {
        let nodes = vec![
            Node::new_with_id("outer", NodePayload::group("outer"), Position::ORIGIN),
            Node::new_with_id("inner", NodePayload::group("inner"), Position::ORIGIN)
                .with_parent("outer"),
        ];

        assert_eq!(
            reparent(&nodes, "outer", Some("inner")),
            Err(ValidationError::cyclic_reparent("outer", "inner"))
        );
        assert!(matches!(
            reparent(&nodes, "outer", Some("outer")),
            Err(ValidationError::CyclicReparent { .. })
        ));
    }

    #[test]
    fn test_reparent_keeps_canvas_position() {
        let nodes = vec![
            Node::new_with_id("g", NodePayload::group("g"), Position::new(50.0, 50.0)),
            text("a", 80.0, 90.0),
        ];
        let result = reparent(&nodes, "a", Some("g")).unwrap();

        let a = find(&result, "a").unwrap();
        assert_eq!(a.position, Position::new(30.0, 40.0));
        assert_eq!(absolute_position(&result, "a"), Some(Position::new(80.0, 90.0)));
    }
}
