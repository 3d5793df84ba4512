//! Attachment resolution: turn the raw attachment records declared on one
//! entity into concrete component kinds plus naming policy.

use crate::diagnostic::{Diagnostic, SynthError};
use entigen_schema::{
    node::{Attachment, Entity, NAME_KEYS, NEST_KEYS, Schema, TOP_LEVEL_KEYS, bare_name},
    types::Arg,
};
use serde::Serialize;

/// Positional argument slots, in declaration order.
const POSITIONAL_ARGS: usize = 3;

///
/// ResolvedAttachment
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct ResolvedAttachment {
    /// Entity that declared the attachment.
    pub owner: String,

    /// Position in the owner's declaration list.
    pub index: usize,

    /// Component kind path.
    pub kind: String,

    pub alias: String,
    pub nest: bool,
    pub top_level: bool,
}

impl ResolvedAttachment {
    #[must_use]
    pub fn kind_name(&self) -> &str {
        bare_name(&self.kind)
    }

    /// Name of the nested accessor object: the alias, else the kind's name.
    #[must_use]
    pub fn nest_name(&self) -> &str {
        if self.alias.is_empty() {
            self.kind_name()
        } else {
            &self.alias
        }
    }

    /// Whether members are exposed flat on the entity.
    #[must_use]
    pub const fn exposes_flat(&self) -> bool {
        !self.nest || self.top_level
    }
}

///
/// Resolution
/// one entity's own attachments, plus what was dropped on the way
///

#[derive(Clone, Debug, Default)]
pub struct Resolution {
    pub attachments: Vec<ResolvedAttachment>,
    pub warnings: Vec<Diagnostic>,
}

/// Resolve the attachments declared directly on `entity`.
#[must_use]
pub fn resolve_attachments(schema: &Schema, entity: &Entity) -> Resolution {
    let mut resolution = Resolution::default();

    for (index, attachment) in entity.components.iter().enumerate() {
        match resolve_one(schema, entity, index, attachment) {
            Ok(resolved) => resolution.attachments.push(resolved),
            Err(error) => {
                tracing::warn!(
                    entity = entity.path(),
                    index,
                    %error,
                    "dropping attachment"
                );
                resolution
                    .warnings
                    .push(Diagnostic::new(entity.path(), error).at_attachment(index));
            }
        }
    }

    resolution
}

fn resolve_one(
    schema: &Schema,
    entity: &Entity,
    index: usize,
    attachment: &Attachment,
) -> Result<ResolvedAttachment, SynthError> {
    let reference = attachment.component.trim();

    if attachment.is_generic_reference() || schema.component(reference).is_none() {
        return Err(SynthError::UnresolvedComponent {
            reference: reference.to_string(),
            generic: attachment.is_generic_reference(),
        });
    }

    let malformed = |reason: String| SynthError::MalformedAttachment {
        reference: reference.to_string(),
        reason,
    };

    if attachment.args.len() > POSITIONAL_ARGS {
        return Err(malformed(format!(
            "expected at most {POSITIONAL_ARGS} positional arguments, found {}",
            attachment.args.len()
        )));
    }
    if let Some(key) = attachment.unknown_named().next() {
        return Err(malformed(format!("unknown argument '{key}'")));
    }

    // named argument wins over the positional slot
    let alias = match attachment
        .named_lookup(&NAME_KEYS)
        .or_else(|| attachment.args.first())
    {
        Some(arg) => text_arg(arg, "name").map_err(malformed)?.to_string(),
        None if entity.use_nested_names => bare_name(reference).to_string(),
        None => String::new(),
    };
    validate_alias(&alias).map_err(malformed)?;

    let nest = flag(attachment, &NEST_KEYS, 1, "nest_declaration").map_err(malformed)?;
    let top_level =
        flag(attachment, &TOP_LEVEL_KEYS, 2, "top_level_accessor").map_err(malformed)?;

    Ok(ResolvedAttachment {
        owner: entity.path().to_string(),
        index,
        kind: reference.to_string(),
        alias,
        nest,
        top_level,
    })
}

fn text_arg<'a>(arg: &'a Arg, name: &str) -> Result<&'a str, String> {
    arg.as_text()
        .ok_or_else(|| format!("'{name}' must be a string, found {} {arg}", arg.type_name()))
}

fn flag(attachment: &Attachment, keys: &[&str], slot: usize, name: &str) -> Result<bool, String> {
    let Some(arg) = attachment
        .named_lookup(keys)
        .or_else(|| attachment.args.get(slot))
    else {
        return Ok(false);
    };

    arg.as_bool()
        .ok_or_else(|| format!("'{name}' must be a bool, found {} {arg}", arg.type_name()))
}

// Aliases prefix accessor names, so they must be identifier-shaped.
fn validate_alias(alias: &str) -> Result<(), String> {
    let mut chars = alias.chars();
    let Some(first) = chars.next() else {
        return Ok(());
    };

    if !(first.is_ascii_alphabetic() || first == '_')
        || !chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(format!("alias '{alias}' is not a valid identifier"));
    }

    Ok(())
}
