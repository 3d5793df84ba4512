use crate::{
    node::{Component, Entity, NodeError, Schema, SchemaNode},
    prelude::*,
};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error as ThisError;

///
/// LoadError
///

#[derive(Debug, ThisError)]
pub enum LoadError {
    #[error("cannot read schema '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML schema: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON schema: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported schema format '{}' (expected .toml or .json)", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error(transparent)]
    Node(#[from] NodeError),
}

///
/// SchemaFile
///
/// On-disk layout: `[[component]]` and `[[entity]]` tables (or the JSON
/// equivalent), in any order.
///

#[derive(Debug, Default, Deserialize, Serialize)]
pub struct SchemaFile {
    #[serde(default, rename = "component", skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<Component>,

    #[serde(default, rename = "entity", skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<Entity>,
}

impl Schema {
    /// Build a schema from a parsed file, rejecting duplicate paths.
    pub fn from_file(file: SchemaFile) -> Result<Self, NodeError> {
        let mut schema = Self::new();

        for component in file.components {
            schema.insert_node(SchemaNode::Component(component))?;
        }
        for entity in file.entities {
            schema.insert_node(SchemaNode::Entity(entity))?;
        }

        Ok(schema)
    }

    pub fn from_toml_str(source: &str) -> Result<Self, LoadError> {
        let file: SchemaFile = toml::from_str(source)?;

        Ok(Self::from_file(file)?)
    }

    pub fn from_json_str(source: &str) -> Result<Self, LoadError> {
        let file: SchemaFile = serde_json::from_str(source)?;

        Ok(Self::from_file(file)?)
    }

    /// Load a `.toml` or `.json` schema file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let path = path.as_ref();
        let source = fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match path.extension().and_then(|ext| ext.to_str()) {
            Some("toml") => Self::from_toml_str(&source),
            Some("json") => Self::from_json_str(&source),
            _ => Err(LoadError::UnsupportedFormat(path.to_path_buf())),
        }
    }

    /// The schema in its on-disk layout.
    #[must_use]
    pub fn to_file(&self) -> SchemaFile {
        SchemaFile {
            components: self.get_nodes::<Component>().map(|(_, c)| c.clone()).collect(),
            entities: self.get_nodes::<Entity>().map(|(_, e)| e.clone()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCHEMA: &str = r#"
        [[component]]
        path = "game::Position"

        [[component.member]]
        name = "x"
        type = "f32"
        initializer = "1.5"

        [[component.member]]
        name = "on_change"
        type = "Rc<dyn Fn(f32)>"

        [[component]]
        path = "game::Health"
        constructor = { param = [{ name = "value", default = "10" }] }

        [[component.member]]
        name = "value"
        type = "u32"
        kind = "property"
        getter = "public"

        [[entity]]
        path = "game::Actor"

        [[entity]]
        path = "game::Player"
        parent = "game::Actor"
        useNestedNames = true

        [[entity.component]]
        component = "game::Position"
        args = ["", true]
        named = { top_level_accessor = true }
    "#;

    #[test]
    fn loads_toml_schema() {
        let schema = Schema::from_toml_str(SCHEMA).expect("schema should parse");

        assert_eq!(schema.len(), 4);

        let position = schema.component("game::Position").unwrap();
        assert_eq!(position.members.len(), 2);
        assert_eq!(position.members[0].initializer.as_deref(), Some("1.5"));
        assert_eq!(position.members[1].shape, Shape::Callback);

        let health = schema.component("game::Health").unwrap();
        let ctor = health.constructor.as_ref().unwrap();
        assert_eq!(ctor.name, "new");
        assert_eq!(ctor.params[0].default.as_deref(), Some("10"));

        let player = schema.entity("game::Player").unwrap();
        assert_eq!(player.parent.as_deref(), Some("game::Actor"));
        assert!(player.use_nested_names);
        assert_eq!(player.components[0].args, vec![Arg::from(""), Arg::Bool(true)]);
        assert_eq!(
            player.components[0].named_lookup(&TOP_LEVEL_KEYS),
            Some(&Arg::Bool(true))
        );
    }

    #[test]
    fn json_and_toml_agree() {
        let schema = Schema::from_toml_str(SCHEMA).unwrap();
        let json = serde_json::to_string(&schema.to_file()).unwrap();
        let reloaded = Schema::from_json_str(&json).unwrap();

        assert_eq!(
            serde_json::to_string(&reloaded.to_file()).unwrap(),
            json,
            "reloading the serialized schema must be stable"
        );
    }

    #[test]
    fn duplicate_paths_fail_loading() {
        let source = r#"
            [[component]]
            path = "game::Thing"

            [[entity]]
            path = "game::Thing"
        "#;

        let err = Schema::from_toml_str(source).expect_err("duplicate path must fail");
        assert!(matches!(err, LoadError::Node(NodeError::DuplicatePath(_))));
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let err = Schema::load("schema.yaml").expect_err("yaml is not supported");
        assert!(matches!(err, LoadError::Io { .. } | LoadError::UnsupportedFormat(_)));
    }
}
