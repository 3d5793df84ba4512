mod attachment;
mod component;
mod constructor;
mod def;
mod entity;
mod member;

pub use attachment::*;
pub use component::*;
pub use constructor::*;
pub use def::*;
pub use entity::*;
pub use member::*;

use crate::prelude::*;
use std::collections::BTreeMap;
use thiserror::Error as ThisError;

///
/// NodeError
///

#[derive(Debug, ThisError)]
pub enum NodeError {
    #[error("path not found: {0}")]
    PathNotFound(String),

    #[error("node '{path}' has the wrong kind, expected {expected}")]
    IncorrectNodeType { path: String, expected: &'static str },

    #[error("duplicate schema path: {0}")]
    DuplicatePath(String),
}

///
/// SchemaNode
///

#[derive(Clone, Debug, Serialize)]
#[remain::sorted]
pub enum SchemaNode {
    Component(Component),
    Entity(Entity),
}

impl SchemaNode {
    #[must_use]
    pub const fn def(&self) -> &Def {
        match self {
            Self::Component(n) => &n.def,
            Self::Entity(n) => &n.def,
        }
    }
}

///
/// NodeKind
/// typed access into a `SchemaNode`
///

pub trait NodeKind: Sized + 'static {
    const NAME: &'static str;

    fn from_node(node: &SchemaNode) -> Option<&Self>;
}

impl NodeKind for Entity {
    const NAME: &'static str = "entity";

    fn from_node(node: &SchemaNode) -> Option<&Self> {
        match node {
            SchemaNode::Entity(n) => Some(n),
            SchemaNode::Component(_) => None,
        }
    }
}

impl NodeKind for Component {
    const NAME: &'static str = "component";

    fn from_node(node: &SchemaNode) -> Option<&Self> {
        match node {
            SchemaNode::Component(n) => Some(n),
            SchemaNode::Entity(_) => None,
        }
    }
}

///
/// ValidateNode
/// local, structural checks for one node
///

pub trait ValidateNode {
    fn validate(&self) -> Result<(), ErrorTree> {
        Ok(())
    }
}

///
/// Schema
///
/// The symbol graph: every entity and component kind keyed by its
/// qualified path. Ordered so that iteration is deterministic.
///

#[derive(Clone, Debug, Default, Serialize)]
pub struct Schema {
    nodes: BTreeMap<String, SchemaNode>,
}

impl Schema {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: BTreeMap::new(),
        }
    }

    /// Insert a node, rejecting a second node at the same path.
    pub fn insert_node(&mut self, node: SchemaNode) -> Result<(), NodeError> {
        let path = node.def().path.clone();
        if self.nodes.contains_key(&path) {
            return Err(NodeError::DuplicatePath(path));
        }
        self.nodes.insert(path, node);

        Ok(())
    }

    #[must_use]
    pub fn get_node(&self, path: &str) -> Option<&SchemaNode> {
        self.nodes.get(path)
    }

    /// Fetch a node of a specific kind.
    pub fn cast_node<T: NodeKind>(&self, path: &str) -> Result<&T, NodeError> {
        let node = self
            .get_node(path)
            .ok_or_else(|| NodeError::PathNotFound(path.to_string()))?;

        T::from_node(node).ok_or_else(|| NodeError::IncorrectNodeType {
            path: path.to_string(),
            expected: T::NAME,
        })
    }

    /// All nodes of a kind, in path order.
    pub fn get_nodes<T: NodeKind>(&self) -> impl Iterator<Item = (&str, &T)> {
        self.nodes
            .iter()
            .filter_map(|(path, node)| T::from_node(node).map(|n| (path.as_str(), n)))
    }

    #[must_use]
    pub fn entity(&self, path: &str) -> Option<&Entity> {
        self.cast_node::<Entity>(path).ok()
    }

    #[must_use]
    pub fn component(&self, path: &str) -> Option<&Component> {
        self.cast_node::<Component>(path).ok()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &SchemaNode> {
        self.nodes.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
