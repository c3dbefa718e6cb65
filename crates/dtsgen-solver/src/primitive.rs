//! Primitive-kind evidence.

use bitflags::bitflags;
use dtsgen_heap::PrimitiveKind;

bitflags! {
    /// Primitive kinds a node may hold, plus two hints that merge the same way.
    #[derive(Default, Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct PrimitiveSet: u8 {
        const STRING = 1 << 0;
        const NUMBER = 1 << 1;
        const BOOLEAN = 1 << 2;
        const NULL = 1 << 3;
        const UNDEFINED = 1 << 4;
        /// Used as an operand or argument; assumed not to be undefined.
        const NON_VOID = 1 << 5;
        /// Forced to a string or a number without saying which.
        const STRING_OR_NUMBER = 1 << 6;
    }
}

impl PrimitiveSet {
    pub const KINDS: PrimitiveSet = PrimitiveSet::STRING
        .union(PrimitiveSet::NUMBER)
        .union(PrimitiveSet::BOOLEAN)
        .union(PrimitiveSet::NULL)
        .union(PrimitiveSet::UNDEFINED);

    pub const HINTS: PrimitiveSet = PrimitiveSet::NON_VOID.union(PrimitiveSet::STRING_OR_NUMBER);

    /// Kinds only, hints stripped.
    #[inline]
    pub fn kinds(self) -> PrimitiveSet {
        self & PrimitiveSet::KINDS
    }

    #[inline]
    pub fn hints(self) -> PrimitiveSet {
        self & PrimitiveSet::HINTS
    }
}

impl From<PrimitiveKind> for PrimitiveSet {
    fn from(kind: PrimitiveKind) -> PrimitiveSet {
        match kind {
            PrimitiveKind::String => PrimitiveSet::STRING,
            PrimitiveKind::Number => PrimitiveSet::NUMBER,
            PrimitiveKind::Boolean => PrimitiveSet::BOOLEAN,
            PrimitiveKind::Null => PrimitiveSet::NULL,
            PrimitiveKind::Undefined => PrimitiveSet::UNDEFINED,
        }
    }
}
