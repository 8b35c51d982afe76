//! Entity trait: records with a stable identity.

/// Anything addressed by an identifier (products, categories, users).
///
/// Identity is what de-duplication and lookups key on; two entities with the
/// same id are the same record even when their other fields differ.
pub trait Entity {
    /// Strongly-typed entity identifier.
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    /// Returns the entity identifier.
    fn id(&self) -> &Self::Id;
}
