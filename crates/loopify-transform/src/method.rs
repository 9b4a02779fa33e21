//! The array methods the engine knows how to rewrite.

use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Method {
    ForEach,
    Map,
    Filter,
    Reduce,
    ReduceRight,
    Some,
    Every,
}

impl Method {
    pub const ALL: [Method; 7] = [
        Method::ForEach,
        Method::Map,
        Method::Filter,
        Method::Reduce,
        Method::ReduceRight,
        Method::Some,
        Method::Every,
    ];

    /// The property name as written in source.
    pub fn name(&self) -> &'static str {
        match self {
            Method::ForEach => "forEach",
            Method::Map => "map",
            Method::Filter => "filter",
            Method::Reduce => "reduce",
            Method::ReduceRight => "reduceRight",
            Method::Some => "some",
            Method::Every => "every",
        }
    }

    /// Look a method up by its source name (`reduceRight`) or its
    /// configuration key (`reduce_right`).
    pub fn from_name(name: &str) -> Option<Method> {
        Method::ALL
            .into_iter()
            .find(|m| m.name() == name || m.config_key() == name)
    }

    /// Key used in `loopify.toml`.
    pub fn config_key(&self) -> &'static str {
        match self {
            Method::ForEach => "for_each",
            Method::ReduceRight => "reduce_right",
            other => other.name(),
        }
    }

    /// Argument counts the rewrite accepts. A second `thisArg` argument is
    /// never accepted; `reduce` and `reduceRight` take an optional seed.
    pub fn arity(&self) -> Arity {
        match self {
            Method::Reduce | Method::ReduceRight => Arity::Between(1, 2),
            _ => Arity::Exactly(1),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Constraint on the number of call arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exactly(usize),
    /// Inclusive range
    Between(usize, usize),
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exactly(n) => count == n,
            Arity::Between(min, max) => (min..=max).contains(&count),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exactly(n) => write!(f, "{}", n),
            Arity::Between(min, max) => write!(f, "{} or {}", min, max),
        }
    }
}
