//! Resource instance naming.

use std::collections::HashSet;
use std::ops::RangeInclusive;

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Suffix range of randomly generated names.
pub const RANDOM_SUFFIX_RANGE: RangeInclusive<u32> = 10_000..=90_000;

/// How missing resource instance names are generated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingStrategy {
    /// `{type}_{random suffix}`, no collision check.
    #[default]
    Random,
    /// `{type}_{k}` with the smallest free `k`, starting at 1.
    Sequential,
}

impl NamingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamingStrategy::Random => "random",
            NamingStrategy::Sequential => "sequential",
        }
    }
}

/// Generates instance names for resources that declare none.
#[derive(Debug, Clone)]
pub struct NameGenerator {
    strategy: NamingStrategy,
    taken: HashSet<String>,
}

impl NameGenerator {
    pub fn new(strategy: NamingStrategy) -> Self {
        Self {
            strategy,
            taken: HashSet::new(),
        }
    }

    /// Mark a name as used so sequential generation skips it.
    pub fn reserve(&mut self, name: impl Into<String>) {
        self.taken.insert(name.into());
    }

    pub fn generate(&mut self, resource_type: &str) -> String {
        let name = match self.strategy {
            NamingStrategy::Random => {
                let suffix = rand::thread_rng().gen_range(RANDOM_SUFFIX_RANGE);
                format!("{}_{}", resource_type, suffix)
            }
            NamingStrategy::Sequential => {
                let mut index = 1usize;
                loop {
                    let candidate = format!("{}_{}", resource_type, index);
                    if !self.taken.contains(&candidate) {
                        break candidate;
                    }
                    index += 1;
                }
            }
        };

        self.taken.insert(name.clone());
        name
    }
}
