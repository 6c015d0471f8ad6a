pub mod attributes;
pub mod entity;

pub use attributes::{Attribute, AttributeSet};
pub use entity::{Entity, Key};
