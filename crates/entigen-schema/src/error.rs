use std::{collections::BTreeMap, fmt};

///
/// ErrorTree
///
/// Route-keyed collection of validation messages. Each node keeps its own
/// messages plus child trees keyed by a route segment (schema path, member
/// name, ...), so a failure can be traced back to the node that produced it.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ErrorTree {
    pub messages: Vec<String>,
    pub children: BTreeMap<String, ErrorTree>,
}

impl ErrorTree {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            messages: Vec::new(),
            children: BTreeMap::new(),
        }
    }

    /// Record a message at this level.
    pub fn add(&mut self, message: impl ToString) {
        self.messages.push(message.to_string());
    }

    /// Record a nested result under `route`, ignoring successes.
    pub fn add_result(&mut self, route: impl Into<String>, result: Result<(), Self>) {
        if let Err(child) = result {
            self.add_child(route, child);
        }
    }

    /// Merge a child tree under `route`; empty trees are dropped.
    pub fn add_child(&mut self, route: impl Into<String>, child: Self) {
        if child.is_empty() {
            return;
        }

        self.children.entry(route.into()).or_default().merge(child);
    }

    /// Merge another tree into this one at the same level.
    pub fn merge(&mut self, other: Self) {
        self.messages.extend(other.messages);
        for (route, child) in other.children {
            self.add_child(route, child);
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.messages.is_empty() && self.children.values().all(Self::is_empty)
    }

    /// Total number of messages, children included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.messages.len() + self.children.values().map(Self::len).sum::<usize>()
    }

    /// Flatten into `(route, message)` pairs, routes joined with `/`.
    #[must_use]
    pub fn flatten(&self) -> Vec<(String, String)> {
        let mut out = Vec::new();
        self.flatten_into("", &mut out);

        out
    }

    fn flatten_into(&self, prefix: &str, out: &mut Vec<(String, String)>) {
        for message in &self.messages {
            out.push((prefix.to_string(), message.clone()));
        }

        for (route, child) in &self.children {
            let route = if prefix.is_empty() {
                route.clone()
            } else {
                format!("{prefix}/{route}")
            };
            child.flatten_into(&route, out);
        }
    }

    /// Ok when nothing was recorded.
    pub fn result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }
}

impl fmt::Display for ErrorTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (route, message)) in self.flatten().into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }

            if route.is_empty() {
                write!(f, "{message}")?;
            } else {
                write!(f, "{route}: {message}")?;
            }
        }

        Ok(())
    }
}

impl std::error::Error for ErrorTree {}

/// Push a formatted message onto an `ErrorTree`.
#[macro_export]
macro_rules! err {
    ($errs:expr, $($arg:tt)*) => {
        $errs.add(format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_children_do_not_make_a_tree_fail() {
        let mut errs = ErrorTree::new();
        errs.add_child("game::Player", ErrorTree::new());

        assert!(errs.is_empty());
        assert!(errs.result().is_ok());
    }

    #[test]
    fn display_renders_routes_in_order() {
        let mut errs = ErrorTree::new();
        err!(errs, "top-level {}", 1);

        let mut member = ErrorTree::new();
        member.add("bad member");
        errs.add_child("game::Position", member);

        assert_eq!(errs.len(), 2);
        assert_eq!(
            errs.to_string(),
            "top-level 1\ngame::Position: bad member"
        );
    }

    #[test]
    fn nested_routes_are_joined() {
        let mut inner = ErrorTree::new();
        inner.add("reserved");
        let mut middle = ErrorTree::new();
        middle.add_child("x", inner);
        let mut errs = ErrorTree::new();
        errs.add_result("game::Position", Err(middle));

        assert_eq!(
            errs.flatten(),
            vec![("game::Position/x".to_string(), "reserved".to_string())]
        );
    }
}
