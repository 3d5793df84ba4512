//! Parsing of the code fragments a schema carries as text: member types,
//! component kind paths and default expressions.

use crate::diagnostic::SynthError;
use syn::{Expr, Ident, Path, Type};

fn invalid(what: &'static str, text: &str, context: &str) -> SynthError {
    SynthError::InvalidFragment {
        what,
        text: text.to_string(),
        context: context.to_string(),
    }
}

pub fn parse_type(text: &str, context: &str) -> Result<Type, SynthError> {
    syn::parse_str(text).map_err(|_| invalid("type", text, context))
}

pub fn parse_path(text: &str, context: &str) -> Result<Path, SynthError> {
    syn::parse_str(text).map_err(|_| invalid("path", text, context))
}

pub fn parse_expr(text: &str, context: &str) -> Result<Expr, SynthError> {
    syn::parse_str(text).map_err(|_| invalid("expression", text, context))
}

pub fn parse_ident(text: &str, context: &str) -> Result<Ident, SynthError> {
    syn::parse_str(text).map_err(|_| invalid("identifier", text, context))
}

///
/// FragmentCheck
/// collects every unparsable fragment instead of stopping at the first
///

#[derive(Debug, Default)]
pub struct FragmentCheck {
    errors: Vec<SynthError>,
}

impl FragmentCheck {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn check<T>(&mut self, result: Result<T, SynthError>) {
        if let Err(e) = result {
            self.errors.push(e);
        }
    }

    #[must_use]
    pub fn into_errors(self) -> Vec<SynthError> {
        self.errors
    }
}
