//! Structural schema validation.
//!
//! Only checks that make the graph unusable as a whole live here (bad
//! identifiers, duplicate members). Problems that concern one entity's
//! ancestry or attachments are reported per entity by the synthesis engine.

pub mod naming;

use crate::{
    err,
    error::ErrorTree,
    node::{Entity, Schema, SchemaNode, ValidateNode},
};
use std::collections::BTreeMap;

/// Validate every node, routing errors by node path.
pub fn validate_schema(schema: &Schema) -> Result<(), ErrorTree> {
    let mut errs = ErrorTree::new();

    for node in schema.nodes() {
        let result = match node {
            SchemaNode::Component(n) => n.validate(),
            SchemaNode::Entity(n) => n.validate(),
        };
        errs.add_result(node.def().path.clone(), result);
    }

    validate_entity_idents(schema, &mut errs);

    errs.result()
}

// Generated entity types share one module, so their bare idents must differ.
fn validate_entity_idents(schema: &Schema, errs: &mut ErrorTree) {
    let mut seen = BTreeMap::<&str, &str>::new();

    for (path, entity) in schema.get_nodes::<Entity>() {
        if let Some(prev) = seen.insert(entity.def.ident(), path) {
            err!(
                errs,
                "entities '{prev}' and '{path}' share the type name '{}'",
                entity.def.ident()
            );
        }
    }
}
