#![allow(dead_code, clippy::unwrap_used)]

use arcconf_core::model::Entity;
use arcconf_core::path::Path;
use arcconf_core::schema::Schema;

/// Path of the device entry every archive snapshot hangs off
pub fn device_path() -> Path {
    Path::parse("dicomDeviceName=arc").unwrap()
}

/// Queue `name` with the given retry count
pub fn queue(schema: &Schema, name: &str, max_retries: i64) -> Entity {
    Entity::new(schema.entity_type("queue").unwrap().clone())
        .with("queueName", name)
        .unwrap()
        .with("maxRetries", max_retries)
        .unwrap()
}

/// Archive device holding `queues` and nothing else
pub fn archive_device(schema: &Schema, queues: Vec<Entity>) -> Entity {
    queues
        .into_iter()
        .fold(Entity::new(schema.root().clone()), |device, q| {
            device.with_child("queues", q).unwrap()
        })
}
