use crate::{
    Error,
    node::{Component, Entity, Schema, SchemaNode},
    prelude::*,
    validate::validate_schema,
};

///
/// SchemaBuilder
///
/// Declarative registration API. Duplicate paths and structural problems
/// are collected and surfaced together by `build`.
///

#[derive(Debug, Default)]
pub struct SchemaBuilder {
    schema: Schema,
    errors: ErrorTree,
}

impl SchemaBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn component(mut self, component: Component) -> Self {
        self.insert(SchemaNode::Component(component));
        self
    }

    #[must_use]
    pub fn entity(mut self, entity: Entity) -> Self {
        self.insert(SchemaNode::Entity(entity));
        self
    }

    fn insert(&mut self, node: SchemaNode) {
        if let Err(e) = self.schema.insert_node(node) {
            self.errors.add(e);
        }
    }

    /// Validate and return the schema.
    pub fn build(self) -> Result<Schema, Error> {
        let Self { schema, mut errors } = self;

        if let Err(tree) = validate_schema(&schema) {
            errors.merge(tree);
        }
        errors.result().map_err(Error::Validation)?;

        Ok(schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_collects_every_problem() {
        let err = SchemaBuilder::new()
            .component(Component::new("game::Position"))
            .component(Component::new("game::Position"))
            .entity(Entity::new("game::Player").attach(Attachment::new(" ")))
            .build()
            .expect_err("two problems expected");

        let Error::Validation(tree) = err else {
            panic!("expected validation error");
        };
        assert_eq!(tree.len(), 2);
        assert!(tree.to_string().contains("duplicate schema path: game::Position"));
    }

    #[test]
    fn builds_valid_schema() {
        let schema = SchemaBuilder::new()
            .component(Component::new("game::Position").member(Member::field("x", "f32")))
            .entity(Entity::new("game::Player").attach(Attachment::new("game::Position")))
            .build()
            .expect("schema is valid");

        assert_eq!(schema.len(), 2);
    }
}
