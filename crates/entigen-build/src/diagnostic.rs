use serde::Serialize;
use std::fmt;
use thiserror::Error as ThisError;

///
/// SynthError
///
/// Everything synthesis can report about one entity. Whether it is fatal
/// for the entity is decided by `severity`.
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize, ThisError)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SynthError {
    #[error(
        "component reference '{reference}' does not resolve to a component kind{}",
        generic_note(*.generic)
    )]
    UnresolvedComponent { reference: String, generic: bool },

    #[error("malformed attachment of '{reference}': {reason}")]
    MalformedAttachment { reference: String, reason: String },

    #[error("accessor name '{name}' collides with {existing}")]
    AccessorCollision { name: String, existing: String },

    #[error("cyclic ancestry: '{at}' is reached twice")]
    CyclicAncestry { at: String },

    #[error("'{path}' is not a known entity")]
    UnknownEntity { path: String },

    #[error("parent '{parent}' of '{child}' is not a known entity")]
    UnknownParent { child: String, parent: String },

    #[error("ancestor chain is longer than the maximum depth {max}")]
    DepthExceeded { max: usize },

    #[error("generated type '{name}' is already emitted for '{existing}'")]
    TypeCollision { name: String, existing: String },

    #[error("ancestor '{ancestor}' failed synthesis")]
    AncestorFailed { ancestor: String },

    #[error("invalid {what} '{text}' in {context}")]
    InvalidFragment {
        what: &'static str,
        text: String,
        context: String,
    },
}

fn generic_note(generic: bool) -> &'static str {
    if generic {
        " (generic arguments are not concrete kinds)"
    } else {
        ""
    }
}

impl SynthError {
    /// Dropped attachments are reported but do not stop synthesis.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        match self {
            Self::UnresolvedComponent { .. } | Self::MalformedAttachment { .. } => {
                Severity::Warning
            }
            _ => Severity::Error,
        }
    }
}

///
/// Severity
///

#[derive(Clone, Copy, Debug, Eq, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Warning => f.write_str("warning"),
            Self::Error => f.write_str("error"),
        }
    }
}

///
/// Diagnostic
///
/// A `SynthError` attributed to an entity and, where it applies, to one of
/// its attachments (`component[i]`).
///

#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
pub struct Diagnostic {
    pub entity: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<String>,

    pub severity: Severity,
    pub error: SynthError,
}

impl Diagnostic {
    pub fn new(entity: impl Into<String>, error: SynthError) -> Self {
        Self {
            entity: entity.into(),
            attachment: None,
            severity: error.severity(),
            error,
        }
    }

    /// Attribute to the attachment at `index` on the entity.
    #[must_use]
    pub fn at_attachment(mut self, index: usize) -> Self {
        self.attachment = Some(format!("component[{index}]"));
        self
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}", self.severity, self.entity)?;
        if let Some(attachment) = &self.attachment {
            write!(f, "/{attachment}")?;
        }
        write!(f, "]: {}", self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dropped_attachments_are_warnings() {
        let diag = Diagnostic::new(
            "game::Player",
            SynthError::UnresolvedComponent {
                reference: "T".to_string(),
                generic: true,
            },
        )
        .at_attachment(2);

        assert!(!diag.is_error());
        assert_eq!(
            diag.to_string(),
            "warning[game::Player/component[2]]: component reference 'T' does not resolve to a component kind (generic arguments are not concrete kinds)"
        );
    }

    #[test]
    fn collisions_are_errors() {
        let diag = Diagnostic::new(
            "game::Player",
            SynthError::AccessorCollision {
                name: "X".to_string(),
                existing: "accessor 'X' from game::Position".to_string(),
            },
        );

        assert!(diag.is_error());
        assert_eq!(
            diag.to_string(),
            "error[game::Player]: accessor name 'X' collides with accessor 'X' from game::Position"
        );
    }
}
