//! First-class identity types for reflected entities.
//!
//! These types provide type-safe identifiers for type definitions, methods, fields,
//! properties, generic parameters and expression parameters, preventing mix-ups
//! between different entity kinds. Every id is an index into the arena that owns it.

macro_rules! define_entity_id {
    ($(#[$meta:meta])* $vis:vis struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        $vis struct $name(u32);

        impl $name {
            pub fn new(index: u32) -> Self {
                Self(index)
            }

            pub fn index(self) -> u32 {
                self.0
            }
        }
    };
}

define_entity_id! {
    /// Identity for a type definition (class, struct or primitive)
    pub struct TypeDefId;
}

define_entity_id! {
    /// Identity for a method descriptor, generic definitions and their
    /// closed instantiations alike
    pub struct MethodId;
}

define_entity_id! {
    /// Identity for a field (always has a defining type)
    pub struct FieldId;
}

define_entity_id! {
    /// Identity for a property or indexer (always has a defining type)
    pub struct PropertyId;
}

define_entity_id! {
    /// Identity for a generic type parameter (e.g. T in `Wrapper<T>` or `Method<T>(T t)`)
    pub struct TypeParamId;
}

define_entity_id! {
    /// Identity for a parameter expression; bound to a frame slot at compile time
    pub struct ParamId;
}

impl std::fmt::Display for ParamId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "p{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_round_trip_their_index() {
        assert_eq!(MethodId::new(7).index(), 7);
        assert_eq!(FieldId::new(0).index(), 0);
    }

    #[test]
    fn ids_of_equal_index_compare_equal() {
        assert_eq!(TypeDefId::new(3), TypeDefId::new(3));
        assert_ne!(TypeParamId::new(1), TypeParamId::new(2));
        assert!(ParamId::new(1) < ParamId::new(2));
    }
}
