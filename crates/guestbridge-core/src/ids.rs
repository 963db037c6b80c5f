//! State identifier generation.
//!
//! Production code mints random UUIDs. Tests inject a generator that hands
//! out a known sequence so duplicated and newly authored states get
//! predictable ids.

use uuid::Uuid;

/// Source of fresh, unique state identifiers.
pub trait IdGenerator {
    /// Returns an identifier that has not been returned before.
    fn next_id(&mut self) -> String;
}

/// Generator backed by random (v4) UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidIdGenerator;

impl IdGenerator for UuidIdGenerator {
    fn next_id(&mut self) -> String {
        Uuid::new_v4().to_string()
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_id(&mut self) -> String {
        (**self).next_id()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_uuid_generator_produces_distinct_ids() {
        let mut ids = UuidIdGenerator;

        let first = ids.next_id();
        let second = ids.next_id();

        assert_ne!(first, second);
        assert!(Uuid::parse_str(&first).is_ok());
    }
}
