//! Entity diff computation.
//!
//! The entry point is [`diff`]. It walks the fields of the entity type in
//! schema order, encodes both sides through the codec and emits:
//!
//! | previous value | current stored | mutation |
//! |---|---|---|
//! | stored | absent | `Remove` (whole attribute) |
//! | none at all | present | `Add` |
//! | default or stored, different | present | `Replace` |
//!
//! A previous value equal to the field default is a value even though the
//! store does not hold it, so moving off a default is a `Replace`; `Add` is
//! reserved for fields that had no value.
//! Fields whose decoded values are equal produce nothing, whatever their
//! stored text looked like.

use super::model::Mutation;
use crate::codec;
use crate::errors::{ConfError, Result};
use crate::model::Entity;

/// Mutations turning the stored form of `prev` into that of `curr`
///
/// # Errors
///
/// `TypeMismatch` when the two entities are of different types.
pub fn diff(prev: &Entity, curr: &Entity) -> Result<Vec<Mutation>> {
    let ty = curr.entity_type();
    if prev.entity_type().name != ty.name {
        return Err(ConfError::TypeMismatch {
            field: prev.entity_type().name.clone(),
            expected: ty.name.clone(),
        });
    }

    let mut mutations = Vec::new();
    for field in &ty.fields {
        let before = prev.get(&field.name);
        let after = curr.get(&field.name);
        if before == after {
            continue;
        }
        match (codec::encode(field, before), codec::encode(field, after)) {
            (None, None) => {}
            (Some(_), None) => mutations.push(Mutation::remove(&field.attribute)),
            (None, Some(values)) if before.is_none() => {
                mutations.push(Mutation::add(&field.attribute, values))
            }
            // Elided default on the left: the field moves off its default
            (None, Some(new)) => mutations.push(Mutation::replace(&field.attribute, new)),
            (Some(old), Some(new)) if old != new => {
                mutations.push(Mutation::replace(&field.attribute, new))
            }
            (Some(_), Some(_)) => {}
        }
    }
    Ok(mutations)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::Schema;
    use crate::value::Value;
    use proptest::prelude::*;

    fn queue(schema: &Schema) -> Entity {
        Entity::new(schema.entity_type("queue").unwrap().clone())
            .with("queueName", "Q1")
            .unwrap()
    }

    #[test]
    fn test_identical_entities_have_no_mutations() {
        let schema = Schema::archive().unwrap();
        assert!(diff(&queue(&schema), &queue(&schema)).unwrap().is_empty());
    }

    #[test]
    fn test_move_to_default_removes_attribute() {
        let schema = Schema::archive().unwrap();
        let prev = queue(&schema).with("maxRetries", 5).unwrap();
        let curr = queue(&schema).with("maxRetries", 0).unwrap();
        assert_eq!(
            diff(&prev, &curr).unwrap(),
            vec![Mutation::remove("dcmMaxRetries")]
        );
    }

    #[test]
    fn test_move_from_default_replaces_attribute() {
        let schema = Schema::archive().unwrap();
        let prev = queue(&schema);
        let curr = queue(&schema).with("maxRetries", 5).unwrap();
        assert_eq!(
            diff(&prev, &curr).unwrap(),
            vec![Mutation::replace("dcmMaxRetries", vec!["5".to_string()])]
        );
    }

    #[test]
    fn test_value_for_undefaulted_field_adds_attribute() {
        let schema = Schema::archive().unwrap();
        let prev = queue(&schema);
        let curr = queue(&schema).with("jndiName", "jms/queue/Export1").unwrap();
        assert_eq!(
            diff(&prev, &curr).unwrap(),
            vec![Mutation::add("dcmJndiName", vec!["jms/queue/Export1".to_string()])]
        );
    }

    #[test]
    fn test_change_between_non_defaults_replaces() {
        let schema = Schema::archive().unwrap();
        let prev = queue(&schema).with("maxRetries", 3).unwrap();
        let curr = queue(&schema).with("maxRetries", 5).unwrap();
        assert_eq!(
            diff(&prev, &curr).unwrap(),
            vec![Mutation::replace("dcmMaxRetries", vec!["5".to_string()])]
        );
    }

    #[test]
    fn test_representation_churn_is_silent() {
        let schema = Schema::archive().unwrap();
        let prev = queue(&schema).with("maxRetryDelay", "PT60S").unwrap();
        let curr = queue(&schema).with("maxRetryDelay", "PT1M").unwrap();
        assert!(diff(&prev, &curr).unwrap().is_empty());

        let storage_type = schema.entity_type("storage").unwrap().clone();
        let a = Entity::new(storage_type.clone())
            .with("storageId", "fs1")
            .unwrap()
            .with("deleterThresholds", Value::strings(["b", "a"]))
            .unwrap()
            .with("storageThreshold", "1000MB")
            .unwrap();
        let b = Entity::new(storage_type)
            .with("storageId", "fs1")
            .unwrap()
            .with("deleterThresholds", Value::strings(["a", "b", "a"]))
            .unwrap()
            .with("storageThreshold", "1GB")
            .unwrap();
        assert!(diff(&a, &b).unwrap().is_empty());
    }

    #[test]
    fn test_mutations_follow_schema_order() {
        let schema = Schema::archive().unwrap();
        let prev = queue(&schema);
        let curr = queue(&schema)
            .with("retryOnWarning", true)
            .unwrap()
            .with("description", "outbound")
            .unwrap();
        let attrs: Vec<String> = diff(&prev, &curr)
            .unwrap()
            .iter()
            .map(|m| m.attribute().to_string())
            .collect();
        assert_eq!(attrs, ["dicomDescription", "dcmRetryOnWarning"]);
    }

    #[test]
    fn test_type_mismatch() {
        let schema = Schema::archive().unwrap();
        let storage = Entity::new(schema.entity_type("storage").unwrap().clone());
        assert!(diff(&queue(&schema), &storage).is_err());
    }

    #[test]
    fn test_move_from_default_replaces_for_every_scalar_kind() {
        let schema = Schema::archive().unwrap();
        let prev = Entity::new(schema.root().clone());
        let curr = Entity::new(schema.root().clone())
            .with("overwritePolicy", "SAME_SOURCE")
            .unwrap()
            .with("bulkDataSpoolDirectory", "/srv/spool")
            .unwrap()
            .with("personNameComponentOrderInsensitiveMatching", true)
            .unwrap();
        assert_eq!(
            diff(&prev, &curr).unwrap(),
            vec![
                Mutation::replace("dcmOverwritePolicy", vec!["SAME_SOURCE".to_string()]),
                Mutation::replace("dcmBulkDataSpoolDirectory", vec!["/srv/spool".to_string()]),
                Mutation::replace(
                    "dcmPersonNameComponentOrderInsensitiveMatching",
                    vec!["TRUE".to_string()]
                ),
            ]
        );
    }

    #[test]
    fn test_reordered_schedules_replace_in_given_order() {
        let schema = Schema::archive().unwrap();
        let schedules = |texts: [&str; 2]| {
            Value::Schedules(texts.iter().map(|t| t.parse().unwrap()).collect())
        };
        let prev = Entity::new(schema.root().clone())
            .with("rejectExpiredStudiesSchedule", schedules(["hour=8", "hour=2"]))
            .unwrap();
        let curr = Entity::new(schema.root().clone())
            .with("rejectExpiredStudiesSchedule", schedules(["hour=2", "hour=8"]))
            .unwrap();

        let early_first = vec!["hour=2".to_string(), "hour=8".to_string()];
        assert_eq!(
            diff(&prev, &curr).unwrap(),
            vec![Mutation::replace(
                "dcmRejectExpiredStudiesSchedule",
                early_first.clone()
            )]
        );
        assert_eq!(
            crate::serializer::serialize(&prev).get("dcmRejectExpiredStudiesSchedule"),
            Some(&["hour=8".to_string(), "hour=2".to_string()][..])
        );
        assert_eq!(
            crate::serializer::serialize(&curr).get("dcmRejectExpiredStudiesSchedule"),
            Some(early_first.as_slice())
        );
    }

    const ALL_KINDS: &str = r#"
schema_version: 1
root: sample
entity_types:
  - name: sample
    object_class: dcmSample
    fields:
      - { name: label, attribute: dcmLabel, type: str }
      - { name: spool, attribute: dcmSpool, type: str, default: /var/tmp }
      - { name: retries, attribute: dcmRetries, type: int, default: 0 }
      - { name: enabled, attribute: dcmEnabled, type: bool, default: false }
      - name: policy
        attribute: dcmPolicy
        type: enum
        variants: [NEVER, ALWAYS, SAME_SOURCE]
        default: NEVER
      - { name: delay, attribute: dcmDelay, type: duration, default: PT1M }
      - { name: window, attribute: dcmWindow, type: period }
      - { name: threshold, attribute: dcmThreshold, type: size }
      - { name: tag, attribute: dcmTag, type: tag }
      - { name: cert, attribute: "dcmCert;binary", type: bytes }
      - { name: aliases, attribute: dcmAlias, type: str_set }
      - { name: storageIds, attribute: dcmStorageID, type: str_seq }
      - { name: codes, attribute: dcmCode, type: codes }
      - { name: tags, attribute: dcmTags, type: tags }
      - { name: schedules, attribute: dcmSchedule, type: schedules }
      - { name: properties, attribute: dcmProperty, type: properties }
"#;

    /// Valid stored texts per field, defaults included where there is one
    fn pool(field: &str) -> &'static [&'static str] {
        match field {
            "label" => &["a", "b"],
            "spool" => &["/var/tmp", "/srv"],
            "retries" => &["0", "3"],
            "enabled" => &["FALSE", "TRUE"],
            "policy" => &["NEVER", "SAME_SOURCE"],
            "delay" => &["PT1M", "PT60S", "PT30S"],
            "window" => &["P1D", "P1W"],
            "threshold" => &["1GB", "1000MB", "5GB"],
            "tag" => &["0020000D", "00100020"],
            "cert" => &["AQID", "/w=="],
            "aliases" => &["x", "y", "z"],
            "storageIds" => &["fs1", "fs2", "fs3"],
            "codes" => &["113001^DCM^Rejected", "113039^DCM^Retention"],
            "tags" => &["0020000D", "00100020", "00080018"],
            "schedules" => &["hour=2", "hour=8", "dayOfWeek=0 hour=2-4"],
            _ => &["a=1", "b=x=y", "c="],
        }
    }

    /// Stored texts for one field: nothing, or a shuffled selection
    fn stored_texts(
        ty: &crate::schema::FieldType,
        pool: &'static [&'static str],
    ) -> BoxedStrategy<Option<Vec<String>>> {
        let picked = if ty.is_list() {
            proptest::sample::subsequence(pool.to_vec(), 1..=pool.len())
                .prop_shuffle()
                .boxed()
        } else {
            proptest::sample::select(pool.to_vec()).prop_map(|t| vec![t]).boxed()
        };
        let owned = picked.prop_map(|texts| texts.into_iter().map(String::from).collect::<Vec<_>>());
        proptest::option::of(owned).boxed()
    }

    fn sample_entity() -> impl Strategy<Value = Entity> {
        let schema = Schema::from_yaml_str(ALL_KINDS).unwrap();
        let ty = schema.root().clone();
        let per_field: Vec<_> = ty
            .fields
            .iter()
            .map(|f| stored_texts(&f.ty, pool(&f.name)))
            .collect();
        per_field.prop_map(move |choices| {
            ty.fields.iter().zip(choices).fold(Entity::new(ty.clone()), |e, (field, texts)| {
                match texts {
                    Some(texts) => e
                        .with(&field.name, codec::parse_value(field, &texts).unwrap())
                        .unwrap(),
                    None => e.without(&field.name).unwrap(),
                }
            })
        })
    }

    proptest! {
        #[test]
        fn prop_diff_reaches_target_for_every_field_kind(
            prev in sample_entity(),
            curr in sample_entity(),
        ) {
            let mutations = diff(&prev, &curr).unwrap();
            let mut stored = crate::serializer::serialize(&prev);
            stored.apply("cn=sample", &mutations).unwrap();
            prop_assert_eq!(stored, crate::serializer::serialize(&curr));

            // From a bare entity: Add without a default, Replace off one; back is Remove
            let bare = Entity::new(prev.entity_type().clone());
            for m in diff(&bare, &prev).unwrap() {
                let ty = prev.entity_type();
                let field = ty.fields.iter().find(|f| f.attribute == m.attribute()).unwrap();
                prop_assert_eq!(matches!(m, Mutation::Add { .. }), field.default.is_none());
            }
            for m in diff(&prev, &bare).unwrap() {
                let is_remove = matches!(m, Mutation::Remove { .. });
                prop_assert!(is_remove);
            }
        }

        #[test]
        fn prop_applying_diff_reaches_target(a in 0i64..4, b in 0i64..4, d1 in proptest::option::of("[a-z]{1,6}"), d2 in proptest::option::of("[a-z]{1,6}")) {
            let schema = Schema::archive().unwrap();
            let mut prev = queue(&schema).with("maxRetries", a).unwrap();
            let mut curr = queue(&schema).with("maxRetries", b).unwrap();
            if let Some(d) = d1 { prev = prev.with("description", d).unwrap(); }
            if let Some(d) = d2 { curr = curr.with("description", d).unwrap(); }

            let mut stored = crate::serializer::serialize(&prev);
            stored.apply("dcmQueueName=Q1", &diff(&prev, &curr).unwrap()).unwrap();
            prop_assert_eq!(stored, crate::serializer::serialize(&curr));
        }

        #[test]
        fn prop_self_diff_is_empty(n in any::<i64>()) {
            let schema = Schema::archive().unwrap();
            let q = queue(&schema).with("maxRetries", n).unwrap();
            prop_assert!(diff(&q, &q.clone()).unwrap().is_empty());
        }
    }
}
