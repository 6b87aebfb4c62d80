//! Priority-ordered pattern collection

use crate::pattern::Pattern;

/// Holds the registered descriptor patterns in matching order
///
/// Ascending priority value; insertion is stable, so patterns sharing a
/// priority are tried in registration order.
#[derive(Debug, Default)]
pub struct PatternRegistry {
    patterns: Vec<Pattern>,
}

impl PatternRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert keeping ascending-priority order, after any existing
    /// pattern of equal priority
    pub fn add(&mut self, pattern: Pattern) {
        let at = self
            .patterns
            .partition_point(|p| p.priority <= pattern.priority);
        self.patterns.insert(at, pattern);
    }

    /// Patterns in the order the matching loop tries them
    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    /// Remove every registered pattern
    pub fn clear(&mut self) {
        self.patterns.clear();
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }
}
