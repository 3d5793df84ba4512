//! Hierarchy flattening: walk an entity's ancestor chain and merge every
//! level's attachments into one duplicate-free, first-declared-wins list.

use crate::{
    diagnostic::SynthError,
    resolve::{Resolution, ResolvedAttachment, resolve_attachments},
};
use entigen_config::SynthesisConfig;
use entigen_schema::node::{Entity, Schema};
use std::collections::{BTreeMap, BTreeSet};

///
/// ChainCache
///
/// Per-invocation memo of every entity's own resolved attachments. Built
/// eagerly, then only read, so it can be shared across worker threads.
///

pub struct ChainCache<'a> {
    schema: &'a Schema,
    config: &'a SynthesisConfig,
    resolved: BTreeMap<&'a str, Resolution>,
}

impl<'a> ChainCache<'a> {
    #[must_use]
    pub fn new(schema: &'a Schema, config: &'a SynthesisConfig) -> Self {
        let resolved = schema
            .get_nodes::<Entity>()
            .map(|(path, entity)| (path, resolve_attachments(schema, entity)))
            .collect();

        Self {
            schema,
            config,
            resolved,
        }
    }

    #[must_use]
    pub const fn schema(&self) -> &'a Schema {
        self.schema
    }

    #[must_use]
    pub const fn config(&self) -> &'a SynthesisConfig {
        self.config
    }

    /// The entity's own resolution (attachments and dropped-attachment warnings).
    #[must_use]
    pub fn own(&self, path: &str) -> Option<&Resolution> {
        self.resolved.get(path)
    }

    /// Whether `entity` terminates its chain.
    #[must_use]
    pub fn is_root(&self, entity: &Entity) -> bool {
        let Some(parent) = &entity.parent else {
            return true;
        };

        match &self.config.root {
            // the sentinel itself, or a direct child of an undeclared sentinel
            Some(root) => {
                entity.path() == root || (parent == root && self.schema.entity(root).is_none())
            }
            None => false,
        }
    }

    /// Ancestor chain of `path`, root first, `path` last.
    pub fn chain(&self, path: &str) -> Result<Vec<&'a Entity>, SynthError> {
        let mut entity = self
            .schema
            .entity(path)
            .ok_or_else(|| SynthError::UnknownEntity {
                path: path.to_string(),
            })?;
        let mut visited = BTreeSet::from([entity.path()]);
        let mut chain = vec![entity];

        while !self.is_root(entity) {
            if chain.len() >= self.config.max_depth {
                return Err(SynthError::DepthExceeded {
                    max: self.config.max_depth,
                });
            }

            let parent_path = entity.parent.as_deref().unwrap_or_default();
            let parent =
                self.schema
                    .entity(parent_path)
                    .ok_or_else(|| SynthError::UnknownParent {
                        child: entity.path().to_string(),
                        parent: parent_path.to_string(),
                    })?;

            if !visited.insert(parent.path()) {
                return Err(SynthError::CyclicAncestry {
                    at: parent.path().to_string(),
                });
            }

            chain.push(parent);
            entity = parent;
        }

        chain.reverse();

        Ok(chain)
    }

    /// Flatten the chain of `path`.
    pub fn flatten(&self, path: &str) -> Result<Flattened<'a>, SynthError> {
        let chain = self.chain(path)?;

        let mut seen = BTreeSet::new();
        let mut attachments = Vec::new();

        for entity in &chain {
            let Some(resolution) = self.own(entity.path()) else {
                continue;
            };

            for attachment in &resolution.attachments {
                if seen.insert(attachment.kind.clone()) {
                    attachments.push(attachment.clone());
                } else {
                    tracing::debug!(
                        entity = entity.path(),
                        kind = %attachment.kind,
                        "component already attached higher in the chain"
                    );
                }
            }
        }

        Ok(Flattened { chain, attachments })
    }
}

///
/// Flattened
///

#[derive(Clone, Debug)]
pub struct Flattened<'a> {
    /// Root first, the flattened entity last.
    pub chain: Vec<&'a Entity>,

    /// Deduplicated attachments, ancestors first.
    pub attachments: Vec<ResolvedAttachment>,
}

impl Flattened<'_> {
    #[must_use]
    pub fn entity(&self) -> &Entity {
        self.chain[self.chain.len() - 1]
    }

    /// The chain's root (the flattened entity itself for a root).
    #[must_use]
    pub fn root(&self) -> &Entity {
        self.chain[0]
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.chain.len() == 1
    }

    /// Ordered, unique component kinds.
    #[must_use]
    pub fn archetype(&self) -> Vec<String> {
        self.attachments.iter().map(|a| a.kind.clone()).collect()
    }

    /// Surviving attachments declared by `owner`.
    pub fn owned_by<'s>(&'s self, owner: &'s str) -> impl Iterator<Item = &'s ResolvedAttachment> {
        self.attachments.iter().filter(move |a| a.owner == owner)
    }

    /// Attachments declared on the flattened entity itself.
    pub fn own(&self) -> impl Iterator<Item = &ResolvedAttachment> {
        self.owned_by(self.entity().path())
    }

    /// Whether `chain[..=depth]` carries any attachment.
    #[must_use]
    pub fn has_attachments_up_to(&self, depth: usize) -> bool {
        self.chain[..=depth]
            .iter()
            .any(|entity| self.owned_by(entity.path()).next().is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use entigen_schema::{
        builder::SchemaBuilder,
        node::{Attachment, Component, Member},
    };

    fn kinds() -> SchemaBuilder {
        SchemaBuilder::new()
            .component(Component::new("game::Position").member(Member::field("x", "f32")))
            .component(Component::new("game::Collider").member(Member::field("radius", "f32")))
            .component(Component::new("game::Sprite").member(Member::field("frame", "u32")))
    }

    #[test]
    fn ancestors_come_first_and_first_declaration_wins() {
        let schema = kinds()
            .entity(Entity::new("game::Root"))
            .entity(
                Entity::new("game::Child")
                    .with_parent("game::Root")
                    .attach(Attachment::new("game::Position")),
            )
            .entity(
                Entity::new("game::Grandchild")
                    .with_parent("game::Child")
                    .attach(Attachment::new("game::Collider").alias("CircleCollider"))
                    .attach(Attachment::new("game::Position").alias("Again")),
            )
            .build()
            .unwrap();
        let config = SynthesisConfig::default();
        let cache = ChainCache::new(&schema, &config);

        let flat = cache.flatten("game::Grandchild").unwrap();

        assert_eq!(flat.archetype(), vec!["game::Position", "game::Collider"]);
        assert_eq!(flat.attachments[0].owner, "game::Child");
        assert_eq!(flat.attachments[0].alias, "");
        assert_eq!(flat.own().count(), 1);
        assert_eq!(flat.root().path(), "game::Root");
        assert!(!flat.is_root());
        assert!(!flat.has_attachments_up_to(0));
        assert!(flat.has_attachments_up_to(1));
    }

    #[test]
    fn cycles_are_detected() {
        let schema = kinds()
            .entity(Entity::new("game::A").with_parent("game::B"))
            .entity(Entity::new("game::B").with_parent("game::A"))
            .build()
            .unwrap();
        let config = SynthesisConfig::default();
        let cache = ChainCache::new(&schema, &config);

        assert_eq!(
            cache.chain("game::A").unwrap_err(),
            SynthError::CyclicAncestry {
                at: "game::A".to_string()
            }
        );
    }

    #[test]
    fn self_parent_is_a_cycle() {
        let schema = kinds()
            .entity(Entity::new("game::Loop").with_parent("game::Loop"))
            .build()
            .unwrap();
        let config = SynthesisConfig::default();
        let cache = ChainCache::new(&schema, &config);

        assert!(matches!(
            cache.chain("game::Loop"),
            Err(SynthError::CyclicAncestry { .. })
        ));
    }

    #[test]
    fn unknown_parents_leave_the_chain_unterminated() {
        let schema = kinds()
            .entity(Entity::new("game::Orphan").with_parent("game::Gone"))
            .build()
            .unwrap();
        let config = SynthesisConfig::default();
        let cache = ChainCache::new(&schema, &config);

        assert_eq!(
            cache.chain("game::Orphan").unwrap_err(),
            SynthError::UnknownParent {
                child: "game::Orphan".to_string(),
                parent: "game::Gone".to_string(),
            }
        );
    }

    #[test]
    fn unknown_entities_are_named_once() {
        let schema = kinds().build().unwrap();
        let config = SynthesisConfig::default();
        let cache = ChainCache::new(&schema, &config);

        let err = cache.flatten("game::Ghost").err().unwrap();
        assert_eq!(
            err,
            SynthError::UnknownEntity {
                path: "game::Ghost".to_string(),
            }
        );
        assert_eq!(err.to_string(), "'game::Ghost' is not a known entity");
    }

    #[test]
    fn depth_is_bounded() {
        let mut builder = kinds().entity(Entity::new("game::E0"));
        for i in 1..10 {
            builder = builder.entity(
                Entity::new(format!("game::E{i}")).with_parent(format!("game::E{}", i - 1)),
            );
        }
        let schema = builder.build().unwrap();
        let config = SynthesisConfig::default().with_max_depth(5);
        let cache = ChainCache::new(&schema, &config);

        assert_eq!(cache.chain("game::E4").unwrap().len(), 5);
        assert_eq!(
            cache.chain("game::E5").unwrap_err(),
            SynthError::DepthExceeded { max: 5 }
        );
    }

    #[test]
    fn sentinel_root_stops_the_walk() {
        let schema = kinds()
            .entity(Entity::new("game::Base").with_parent("engine::Object"))
            .entity(
                Entity::new("game::Actor")
                    .with_parent("engine::EntityBase")
                    .attach(Attachment::new("game::Sprite")),
            )
            .entity(Entity::new("game::Hero").with_parent("game::Actor"))
            .build()
            .unwrap();

        let config = SynthesisConfig::default().with_root("engine::EntityBase");
        let cache = ChainCache::new(&schema, &config);
        let chain: Vec<_> = cache
            .chain("game::Hero")
            .unwrap()
            .iter()
            .map(|e| e.path())
            .collect();
        assert_eq!(chain, vec!["game::Actor", "game::Hero"]);

        // declared sentinel is part of the chain
        let config = SynthesisConfig::default().with_root("game::Base");
        let cache = ChainCache::new(&schema, &config);
        assert_eq!(cache.chain("game::Base").unwrap().len(), 1);
    }
}
