//! Which rewrite rules are enabled.

use serde::{Deserialize, Serialize};

use crate::method::Method;

fn enabled() -> bool {
    true
}

/// Per-method switches, read from the `[rules]` table of `loopify.toml`.
/// Missing keys leave the rule enabled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleConfig {
    #[serde(default = "enabled")]
    pub for_each: bool,
    #[serde(default = "enabled")]
    pub map: bool,
    #[serde(default = "enabled")]
    pub filter: bool,
    #[serde(default = "enabled")]
    pub reduce: bool,
    #[serde(default = "enabled")]
    pub reduce_right: bool,
    #[serde(default = "enabled")]
    pub some: bool,
    #[serde(default = "enabled")]
    pub every: bool,
}

impl Default for RuleConfig {
    fn default() -> Self {
        Self {
            for_each: true,
            map: true,
            filter: true,
            reduce: true,
            reduce_right: true,
            some: true,
            every: true,
        }
    }
}

impl RuleConfig {
    /// Everything enabled except the listed methods. Unknown names are
    /// returned in the error so the caller can report them.
    pub fn from_skip_list<S: AsRef<str>>(skip: &[S]) -> Result<Self, Vec<String>> {
        let mut config = Self::default();
        config.skip(skip)?;
        Ok(config)
    }

    /// Disable the listed methods, by source name or config key.
    pub fn skip<S: AsRef<str>>(&mut self, skip: &[S]) -> Result<(), Vec<String>> {
        let mut unknown = Vec::new();
        for name in skip {
            match Method::from_name(name.as_ref()) {
                Some(method) => self.set(method, false),
                None => unknown.push(name.as_ref().to_string()),
            }
        }
        if unknown.is_empty() {
            Ok(())
        } else {
            Err(unknown)
        }
    }

    pub fn is_enabled(&self, method: Method) -> bool {
        match method {
            Method::ForEach => self.for_each,
            Method::Map => self.map,
            Method::Filter => self.filter,
            Method::Reduce => self.reduce,
            Method::ReduceRight => self.reduce_right,
            Method::Some => self.some,
            Method::Every => self.every,
        }
    }

    pub fn set(&mut self, method: Method, on: bool) {
        let slot = match method {
            Method::ForEach => &mut self.for_each,
            Method::Map => &mut self.map,
            Method::Filter => &mut self.filter,
            Method::Reduce => &mut self.reduce,
            Method::ReduceRight => &mut self.reduce_right,
            Method::Some => &mut self.some,
            Method::Every => &mut self.every,
        };
        *slot = on;
    }

    /// Enabled methods in registration order.
    pub fn enabled_methods(&self) -> Vec<Method> {
        Method::ALL
            .into_iter()
            .filter(|m| self.is_enabled(*m))
            .collect()
    }
}
