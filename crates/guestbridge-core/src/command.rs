//! Command abstractions.

/// Trait that all authoring commands implement.
pub trait Command: std::fmt::Debug {
    /// The type name for this command (for logging).
    fn command_type(&self) -> &'static str;
}
