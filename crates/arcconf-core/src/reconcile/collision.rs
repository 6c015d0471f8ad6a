use crate::errors::{ConfError, Result};
use crate::model::Entity;
use crate::path::Path;
use std::collections::HashMap;

/// Fail when two children of any entity in the tree map to the same path
///
/// Keys are compared exactly but paths case-insensitively, so `Q1` and `q1`
/// are distinct keys that collide in the store. Siblings from different
/// collections collide too when their RDNs coincide.
///
/// # Errors
///
/// `PathCollision` naming the path and both `collection:key` owners.
pub fn check_path_collisions(path: &Path, entity: &Entity) -> Result<()> {
    let mut seen: HashMap<Path, String> = HashMap::new();
    for collection in &entity.entity_type().children {
        let Some(children) = entity.children(&collection.name) else {
            continue;
        };
        for (key, child) in children {
            let child_path = path.child(collection.rdn(key));
            let owner = format!("{}:{}", collection.name, key);
            if let Some(first) = seen.insert(child_path.clone(), owner.clone()) {
                return Err(ConfError::PathCollision {
                    path: child_path.to_string(),
                    first,
                    second: owner,
                });
            }
            check_path_collisions(&child_path, child)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;

    #[test]
    fn test_case_only_keys_collide() {
        let schema = Schema::archive().unwrap();
        let queue = |name: &str| {
            Entity::new(schema.entity_type("queue").unwrap().clone())
                .with("queueName", name)
                .unwrap()
        };
        let device = Entity::new(schema.root().clone())
            .with_child("queues", queue("Q1"))
            .unwrap()
            .with_child("queues", queue("q1"))
            .unwrap();
        let err = check_path_collisions(&Path::parse("dicomDeviceName=arc").unwrap(), &device)
            .unwrap_err();
        assert!(matches!(err, ConfError::PathCollision { .. }));
    }

    #[test]
    fn test_sibling_collections_collide_on_shared_rdn() {
        let schema = Schema::archive().unwrap();
        let rule = Entity::new(schema.entity_type("exportRule").unwrap().clone())
            .with("commonName", "weekly")
            .unwrap();
        let policy = Entity::new(schema.entity_type("retentionPolicy").unwrap().clone())
            .with("commonName", "Weekly")
            .unwrap();
        let device = Entity::new(schema.root().clone())
            .with_child("exportRules", rule)
            .unwrap()
            .with_child("retentionPolicies", policy)
            .unwrap();
        let err = check_path_collisions(&Path::parse("dicomDeviceName=arc").unwrap(), &device)
            .unwrap_err();
        match err {
            ConfError::PathCollision { first, second, .. } => {
                assert_eq!(first, "exportRules:weekly");
                assert_eq!(second, "retentionPolicies:Weekly");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_distinct_keys_pass() {
        let schema = Schema::archive().unwrap();
        let queue = |name: &str| {
            Entity::new(schema.entity_type("queue").unwrap().clone())
                .with("queueName", name)
                .unwrap()
        };
        let device = Entity::new(schema.root().clone())
            .with_child("queues", queue("Q1"))
            .unwrap()
            .with_child("queues", queue("Q2"))
            .unwrap();
        assert!(check_path_collisions(&Path::default(), &device).is_ok());
    }
}
