//! Design-space locations.
//!
//! A location maps axis tags to coordinates. Two flavours exist: user-space
//! locations in raw axis units, and normalized locations where every axis
//! lies in `[-1, 1]` with `0` at the axis default.

use std::{collections::BTreeMap, fmt};

use font_types::Tag;

use crate::error::{Error, Result};

macro_rules! location_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq)]
        pub struct $name(BTreeMap<Tag, f64>);

        impl $name {
            pub fn new() -> Self {
                Self::default()
            }

            /// Set the coordinate for an axis, returning the previous one.
            pub fn insert(&mut self, tag: Tag, value: f64) -> Option<f64> {
                self.0.insert(tag, value)
            }

            /// Builder-style variant of [`insert`](Self::insert).
            pub fn with(mut self, tag: Tag, value: f64) -> Self {
                self.0.insert(tag, value);
                self
            }

            pub fn get(&self, tag: Tag) -> Option<f64> {
                self.0.get(&tag).copied()
            }

            pub fn contains(&self, tag: Tag) -> bool {
                self.0.contains_key(&tag)
            }

            /// Axis coordinates in tag order.
            pub fn iter(&self) -> impl Iterator<Item = (Tag, f64)> + '_ {
                self.0.iter().map(|(tag, value)| (*tag, *value))
            }

            pub fn axis_tags(&self) -> impl Iterator<Item = Tag> + '_ {
                self.0.keys().copied()
            }

            pub fn len(&self) -> usize {
                self.0.len()
            }

            pub fn is_empty(&self) -> bool {
                self.0.is_empty()
            }
        }

        impl FromIterator<(Tag, f64)> for $name {
            fn from_iter<I: IntoIterator<Item = (Tag, f64)>>(iter: I) -> Self {
                Self(iter.into_iter().collect())
            }
        }
    };
}

location_type!(
    /// A location in user-space (raw axis units)
    UserLocation
);

location_type!(
    /// A location in normalized coordinates
    ///
    /// Axes absent from the map are at their default (`0`).
    NormalizedLocation
);

impl NormalizedLocation {
    /// Coordinate on an axis, treating absent axes as the default.
    pub fn value(&self, tag: Tag) -> f64 {
        self.get(tag).unwrap_or(0.0)
    }

    /// Drop every axis sitting at the default.
    pub fn sparse(&self) -> Self {
        self.iter().filter(|(_, value)| *value != 0.0).collect()
    }

    /// Axes with a non-default coordinate.
    pub fn active_axes(&self) -> impl Iterator<Item = Tag> + '_ {
        self.iter().filter(|(_, value)| *value != 0.0).map(|(tag, _)| tag)
    }

    /// Canonical string form, `"tag:value,tag:value"` with tags sorted.
    ///
    /// Used as the identity of a location in every cache keyed by location.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Parse the canonical form produced by [`key`](Self::key).
    pub fn from_key(key: &str) -> Result<Self> {
        let malformed = |message: String| Error::MalformedLocationKey {
            key: key.to_string(),
            message,
        };
        let mut location = Self::new();
        if key.is_empty() {
            return Ok(location);
        }
        for part in key.split(',') {
            let (tag, value) = part
                .rsplit_once(':')
                .ok_or_else(|| malformed(format!("missing ':' in '{part}'")))?;
            let tag = Tag::new_checked(tag.as_bytes())
                .map_err(|e| malformed(format!("bad tag '{tag}': {e}")))?;
            let value: f64 = value
                .parse()
                .map_err(|e| malformed(format!("bad value '{value}': {e}")))?;
            location.insert(tag, value);
        }
        Ok(location)
    }
}

impl fmt::Display for NormalizedLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (tag, value)) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            // -0.0 and 0.0 must share a key
            write!(f, "{tag}:{}", value + 0.0)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WGHT: Tag = Tag::new(b"wght");
    const WDTH: Tag = Tag::new(b"wdth");

    #[test]
    fn key_sorts_axis_tags() {
        let loc = NormalizedLocation::new().with(WGHT, 0.5).with(WDTH, -1.0);
        assert_eq!(loc.key(), "wdth:-1,wght:0.5");
    }

    #[test]
    fn key_keeps_default_axes() {
        let loc = NormalizedLocation::new().with(WGHT, 0.0);
        assert_eq!(loc.key(), "wght:0");
    }

    #[test]
    fn negative_zero_shares_key() {
        let a = NormalizedLocation::new().with(WGHT, -0.0);
        let b = NormalizedLocation::new().with(WGHT, 0.0);
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn parse_key() {
        let loc = NormalizedLocation::from_key("wdth:-1,wght:0.25").unwrap();
        assert_eq!(loc.get(WDTH), Some(-1.0));
        assert_eq!(loc.get(WGHT), Some(0.25));
        assert_eq!(NormalizedLocation::from_key(&loc.key()).unwrap(), loc);
    }

    #[test]
    fn parse_empty_key() {
        assert!(NormalizedLocation::from_key("").unwrap().is_empty());
    }

    #[test]
    fn parse_malformed_key() {
        assert!(NormalizedLocation::from_key("wght=1").is_err());
        assert!(NormalizedLocation::from_key("wght:heavy").is_err());
        assert!(NormalizedLocation::from_key("toolong:1").is_err());
    }

    #[test]
    fn sparse_drops_defaults() {
        let loc = NormalizedLocation::new().with(WGHT, 0.0).with(WDTH, 0.5);
        let sparse = loc.sparse();
        assert_eq!(sparse.len(), 1);
        assert_eq!(sparse.get(WDTH), Some(0.5));
        assert_eq!(loc.value(Tag::new(b"ital")), 0.0);
    }
}
