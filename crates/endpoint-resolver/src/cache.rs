//! Per-environment memo of resolved base URLs.

use std::collections::HashMap;

use crate::environment::Environment;

/// At most one resolved base URL per environment. Lives for the process;
/// never persisted.
///
/// Every [`ResolutionCache::clear`] bumps a generation counter, so a
/// resolution that started before the clear can detect that its result is
/// stale and skip storing it.
#[derive(Debug, Default)]
pub struct ResolutionCache {
    resolved: HashMap<Environment, String>,
    generation: u64,
}

impl ResolutionCache {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Store `url` only if no clear happened since `generation` was read.
    /// Returns whether the value was stored.
    pub fn insert_if_current(&mut self, generation: u64, env: Environment, url: String) -> bool {
        if generation != self.generation {
            return false;
        }
        self.insert(env, url);
        true
    }

    pub fn get(&self, env: Environment) -> Option<&str> {
        self.resolved.get(&env).map(String::as_str)
    }

    /// Store `url` for `env`, replacing any previous value.
    pub fn insert(&mut self, env: Environment, url: String) {
        self.resolved.insert(env, url);
    }

    pub fn clear(&mut self) {
        self.resolved.clear();
        self.generation = self.generation.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.resolved.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolved.is_empty()
    }
}
