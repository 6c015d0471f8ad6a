//! Schema command
//!
//! Usage: arcconf schema [ENTITY_TYPE]
//!
//! Without an argument, lists the entity types of the archive schema;
//! with one, prints that type's fields and child collections.

use arcconf_core::codec::format_value;
use arcconf_core::schema::Schema;
use clap::Args;

#[derive(Debug, Args)]
pub struct SchemaArgs {
    /// Entity type to describe
    pub entity_type: Option<String>,
}

pub fn execute(args: SchemaArgs) -> Result<(), Box<dyn std::error::Error>> {
    let schema = Schema::archive()?;

    let Some(name) = args.entity_type else {
        for entity_type in schema.entity_types() {
            let marker = if entity_type.name == schema.root().name {
                " (root)"
            } else {
                ""
            };
            println!(
                "{}{}  objectClass={}  fields={}  collections={}",
                entity_type.name,
                marker,
                entity_type.object_class,
                entity_type.fields.len(),
                entity_type.children.len()
            );
        }
        return Ok(());
    };

    let entity_type = schema.entity_type(&name)?;
    println!("{} (objectClass {})", entity_type.name, entity_type.object_class);
    println!("\nFields:");
    for field in &entity_type.fields {
        let mut line = format!("  {}: {} [{}]", field.name, field.ty.name(), field.attribute);
        if let Some(default) = &field.default {
            let text = format_value(default);
            if !text.is_empty() {
                line.push_str(&format!(" default={}", text.join(",")));
            }
        }
        if field.sensitive {
            line.push_str(" sensitive");
        }
        println!("{}", line);
    }
    if !entity_type.children.is_empty() {
        println!("\nCollections:");
        for collection in &entity_type.children {
            println!(
                "  {}: {} keyed by {}",
                collection.name,
                collection.entity_type.name,
                collection.key.join("+")
            );
        }
    }
    Ok(())
}
