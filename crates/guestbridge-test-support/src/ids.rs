//! Test id generator — deterministic `IdGenerator` implementation for tests.

use std::collections::VecDeque;

use guestbridge_core::ids::IdGenerator;

/// Hands out a predetermined list of ids, then `generated-1`,
/// `generated-2`, ... once the list is exhausted.
#[derive(Debug, Default)]
pub struct SequenceIds {
    ids: VecDeque<String>,
    generated: usize,
}

impl SequenceIds {
    /// Create a generator that returns `ids` in order.
    #[must_use]
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ids: ids.into_iter().map(Into::into).collect(),
            generated: 0,
        }
    }
}

impl IdGenerator for SequenceIds {
    fn next_id(&mut self) -> String {
        self.ids.pop_front().unwrap_or_else(|| {
            self.generated += 1;
            format!("generated-{}", self.generated)
        })
    }
}
