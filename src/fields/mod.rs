pub mod builder;

pub use builder::{Field, Fields, FieldsBuilder, Member, ALL};
