//! Domain-specific newtypes

use std::fmt;

macro_rules! u16_id {
    ($(#[$meta:meta])* $name:ident, $label:literal) => {
        $(#[$meta])*
        #[repr(transparent)]
        #[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(pub u16);

        impl $name {
            pub const fn new(id: u16) -> Self {
                Self(id)
            }

            pub const fn to_u16(self) -> u16 {
                self.0
            }

            pub const fn to_u32(self) -> u32 {
                self.0 as u32
            }
        }

        impl From<u16> for $name {
            fn from(id: u16) -> Self {
                Self(id)
            }
        }

        impl From<$name> for u16 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $label, self.0)
            }
        }
    };
}

u16_id!(
    /// Glyph ID in the font being painted
    GlyphId,
    "gid"
);

/// Glyph a layer paints with.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GlyphRef {
    /// The glyph whose layer stack is being compiled
    #[default]
    Current,
    /// A specific glyph
    Id(GlyphId),
}

impl GlyphRef {
    /// Resolve against the glyph being compiled.
    pub fn resolve(self, current: GlyphId) -> GlyphId {
        match self {
            Self::Current => current,
            Self::Id(gid) => gid,
        }
    }
}

impl From<GlyphId> for GlyphRef {
    fn from(gid: GlyphId) -> Self {
        Self::Id(gid)
    }
}

impl fmt::Display for GlyphRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Current => f.write_str("<self>"),
            Self::Id(gid) => gid.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_current() {
        let current = GlyphId::new(12);
        assert_eq!(GlyphRef::Current.resolve(current), current);
        assert_eq!(GlyphRef::from(GlyphId::new(3)).resolve(current), GlyphId::new(3));
        assert_eq!(GlyphRef::default().to_string(), "<self>");
        assert_eq!(GlyphRef::Id(GlyphId::new(3)).to_string(), "gid3");
    }
}
