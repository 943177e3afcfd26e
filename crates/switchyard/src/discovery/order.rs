//! Mount ordering using topological sort.
//!
//! Parents must be instantiated before their children so that children can be
//! attached as they are built. Uses Kahn's algorithm with cycle detection.

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use super::manifest::ControllerManifest;
use crate::error::{ControllerError, ControllerResult};

/// Order manifests so that every parent comes before its children.
///
/// Siblings keep name order, so the result is deterministic.
///
/// # Errors
/// - `MissingParent` when a manifest names a parent that is not in the list
/// - `MountCycle` when the parent links form a loop
pub fn mount_order(manifests: &[ControllerManifest]) -> ControllerResult<Vec<String>> {
    let mut waiting: BTreeMap<&str, usize> = BTreeMap::new();
    let mut children: BTreeMap<&str, Vec<&str>> = BTreeMap::new();

    for manifest in manifests {
        waiting.insert(&manifest.name, 0);
        children.entry(&manifest.name).or_default();
    }

    for manifest in manifests {
        let Some(parent) = manifest.parent.as_deref() else {
            continue;
        };
        if !waiting.contains_key(parent) {
            return Err(ControllerError::MissingParent {
                controller: manifest.name.clone(),
                parent: parent.to_string(),
            });
        }
        if let Some(count) = waiting.get_mut(manifest.name.as_str()) {
            *count += 1;
        }
        children.entry(parent).or_default().push(&manifest.name);
    }

    let mut queue: VecDeque<&str> = waiting
        .iter()
        .filter(|(_, count)| **count == 0)
        .map(|(name, _)| *name)
        .collect();
    let mut order = Vec::with_capacity(waiting.len());

    while let Some(name) = queue.pop_front() {
        order.push(name.to_string());

        let Some(kids) = children.get_mut(name) else {
            continue;
        };
        kids.sort_unstable();
        for kid in kids.iter() {
            if let Some(count) = waiting.get_mut(kid) {
                *count -= 1;
                if *count == 0 {
                    queue.push_back(*kid);
                }
            }
        }
    }

    if order.len() != waiting.len() {
        let placed: BTreeSet<&str> = order.iter().map(String::as_str).collect();
        let stuck: Vec<&str> = waiting
            .keys()
            .copied()
            .filter(|name| !placed.contains(name))
            .collect();
        return Err(ControllerError::MountCycle {
            cycle: stuck.join(", "),
        });
    }

    Ok(order)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use std::path::Path;

    fn manifest(name: &str, parent: Option<&str>) -> ControllerManifest {
        let mut toml = format!("name = \"{name}\"\n");
        if let Some(parent) = parent {
            toml.push_str(&format!("parent = \"{parent}\"\n"));
        }
        ControllerManifest::parse_str(&toml, Path::new("test.controller.toml")).unwrap()
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|x| x == name).unwrap()
    }

    #[test]
    fn roots_in_name_order() {
        let order = mount_order(&[manifest("c", None), manifest("a", None), manifest("b", None)]).unwrap();
        assert_eq!(order, vec!["a", "b", "c"]);
    }

    #[test]
    fn parents_before_children() {
        let manifests = [
            manifest("users", Some("admin")),
            manifest("roles", Some("users")),
            manifest("admin", Some("site")),
            manifest("site", None),
        ];
        let order = mount_order(&manifests).unwrap();
        assert!(position(&order, "site") < position(&order, "admin"));
        assert!(position(&order, "admin") < position(&order, "users"));
        assert!(position(&order, "users") < position(&order, "roles"));
    }

    #[test]
    fn siblings_are_sorted() {
        let manifests = [
            manifest("admin", None),
            manifest("zeta", Some("admin")),
            manifest("alpha", Some("admin")),
        ];
        assert_eq!(mount_order(&manifests).unwrap(), vec!["admin", "alpha", "zeta"]);
    }

    #[test]
    fn missing_parent() {
        let err = mount_order(&[manifest("users", Some("admin"))]).unwrap_err();
        assert!(matches!(err, ControllerError::MissingParent { .. }));
        assert!(err.to_string().contains("admin"));
    }

    #[test]
    fn cycle_is_reported() {
        let manifests = [
            manifest("a", Some("b")),
            manifest("b", Some("a")),
            manifest("root", None),
        ];
        let err = mount_order(&manifests).unwrap_err();
        assert!(matches!(err, ControllerError::MountCycle { .. }));
        let message = err.to_string();
        assert!(message.contains("a, b"));
        assert!(!message.contains("root"));
    }

    #[test]
    fn empty_input() {
        assert!(mount_order(&[]).unwrap().is_empty());
    }
}
