//! Record of the rewrites performed by one pass.

use std::fmt;

use serde::Serialize;

use crate::method::Method;

/// Statement shape a rewrite was applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Shape {
    /// `recv.forEach(f);`
    Statement,
    /// `out = recv.method(...);`
    Assignment,
    /// `const out = recv.method(...);`
    Declaration,
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Shape::Statement => "statement",
            Shape::Assignment => "assignment",
            Shape::Declaration => "declaration",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rewrite {
    pub method: Method,
    pub shape: Shape,
    /// Byte position of the original statement, 0 if it had no source span
    pub offset: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RewriteReport {
    pub rewrites: Vec<Rewrite>,
}

impl RewriteReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, rewrite: Rewrite) {
        self.rewrites.push(rewrite);
    }

    pub fn len(&self) -> usize {
        self.rewrites.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rewrites.is_empty()
    }

    /// Number of rewrites of one method.
    pub fn count(&self, method: Method) -> usize {
        self.rewrites.iter().filter(|r| r.method == method).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Rewrite> {
        self.rewrites.iter()
    }
}
