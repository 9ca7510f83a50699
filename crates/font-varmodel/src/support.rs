//! Support regions and the tent scalar function.

use std::{collections::BTreeMap, fmt};

use font_types::Tag;

use crate::location::NormalizedLocation;

/// A piecewise-linear tent on one axis.
///
/// The contribution is 0 at `lower`, 1 at `peak` and 0 again at `upper`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tent {
    pub lower: f64,
    pub peak: f64,
    pub upper: f64,
}

impl Tent {
    pub fn new(lower: f64, peak: f64, upper: f64) -> Self {
        Self { lower, peak, upper }
    }

    /// Whether this tent takes part in the scalar computation at all.
    fn is_active(&self) -> bool {
        if self.peak == 0.0 {
            return false;
        }
        if self.lower > self.peak || self.peak > self.upper {
            return false;
        }
        // straddling the default in both directions
        !(self.lower < 0.0 && self.upper > 0.0)
    }

    /// Factor for a single axis coordinate, or `None` when the tent is ignored.
    fn factor(&self, value: f64) -> Option<f64> {
        if !self.is_active() {
            return None;
        }
        if value == self.peak {
            return Some(1.0);
        }
        if value <= self.lower || self.upper <= value {
            return Some(0.0);
        }
        if value < self.peak {
            Some((value - self.lower) / (self.peak - self.lower))
        } else {
            Some((value - self.upper) / (self.peak - self.upper))
        }
    }
}

impl fmt::Display for Tent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.lower + 0.0, self.peak + 0.0, self.upper + 0.0)
    }
}

/// A support region: one tent per relevant axis.
///
/// Axes without a tent do not constrain the region.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Support(BTreeMap<Tag, Tent>);

impl Support {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: Tag, tent: Tent) -> Option<Tent> {
        self.0.insert(tag, tent)
    }

    pub fn get(&self, tag: Tag) -> Option<&Tent> {
        self.0.get(&tag)
    }

    pub fn contains(&self, tag: Tag) -> bool {
        self.0.contains_key(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Tag, &Tent)> + '_ {
        self.0.iter().map(|(tag, tent)| (*tag, tent))
    }

    pub fn axis_tags(&self) -> impl Iterator<Item = Tag> + '_ {
        self.0.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// The base region, which constrains no axis and always scores 1.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Stable string form used for region deduplication.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Evaluate the region at a location.
    ///
    /// The result is the product of the per-axis tent factors; any axis
    /// outside its tent zeroes the whole scalar.
    pub fn scalar_at(&self, location: &NormalizedLocation) -> f64 {
        let mut scalar = 1.0;
        for (tag, tent) in self.iter() {
            match tent.factor(location.value(tag)) {
                None => continue,
                Some(factor) if factor == 0.0 => return 0.0,
                Some(factor) => scalar *= factor,
            }
        }
        scalar
    }
}

impl FromIterator<(Tag, Tent)> for Support {
    fn from_iter<I: IntoIterator<Item = (Tag, Tent)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for Support {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, (tag, tent)) in self.iter().enumerate() {
            if idx > 0 {
                f.write_str(",")?;
            }
            write!(f, "{tag}={tent}")?;
        }
        Ok(())
    }
}

/// Scalar contribution of `support` at `location`.
pub fn support_scalar(location: &NormalizedLocation, support: &Support) -> f64 {
    support.scalar_at(location)
}

#[cfg(test)]
mod tests {
    use super::*;

    const WGHT: Tag = Tag::new(b"wght");
    const WDTH: Tag = Tag::new(b"wdth");

    fn loc(coords: &[(Tag, f64)]) -> NormalizedLocation {
        coords.iter().copied().collect()
    }

    #[test]
    fn empty_support_is_one_everywhere() {
        let support = Support::new();
        assert_eq!(support.scalar_at(&loc(&[])), 1.0);
        assert_eq!(support.scalar_at(&loc(&[(WGHT, 0.7)])), 1.0);
    }

    #[test]
    fn scalar_at_peak() {
        let support: Support = [(WGHT, Tent::new(0.0, 1.0, 1.0))].into_iter().collect();
        assert_eq!(support.scalar_at(&loc(&[(WGHT, 1.0)])), 1.0);
    }

    #[test]
    fn scalar_ramps() {
        let support: Support = [(WGHT, Tent::new(0.0, 1.0, 1.0))].into_iter().collect();
        assert!((support.scalar_at(&loc(&[(WGHT, 0.25)])) - 0.25).abs() < 1e-12);

        let support: Support = [(WGHT, Tent::new(0.0, 0.5, 1.0))].into_iter().collect();
        assert!((support.scalar_at(&loc(&[(WGHT, 0.75)])) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn scalar_outside_is_zero() {
        let support: Support = [(WGHT, Tent::new(0.0, 1.0, 1.0))].into_iter().collect();
        assert_eq!(support.scalar_at(&loc(&[(WGHT, -0.5)])), 0.0);
        assert_eq!(support.scalar_at(&loc(&[])), 0.0);
    }

    #[test]
    fn scalar_is_product_over_axes() {
        let support: Support = [
            (WGHT, Tent::new(0.0, 1.0, 1.0)),
            (WDTH, Tent::new(-1.0, -1.0, 0.0)),
        ]
        .into_iter()
        .collect();
        let scalar = support.scalar_at(&loc(&[(WGHT, 0.5), (WDTH, -0.5)]));
        assert!((scalar - 0.25).abs() < 1e-12);
    }

    #[test]
    fn degenerate_tents_are_ignored() {
        // peak at default
        let support: Support = [(WGHT, Tent::new(0.0, 0.0, 1.0))].into_iter().collect();
        assert_eq!(support.scalar_at(&loc(&[(WGHT, 0.5)])), 1.0);

        // straddles the default
        let support: Support = [(WGHT, Tent::new(-1.0, 0.5, 1.0))].into_iter().collect();
        assert_eq!(support.scalar_at(&loc(&[(WGHT, -0.9)])), 1.0);

        // out of order
        let support: Support = [(WGHT, Tent::new(0.8, 0.5, 1.0))].into_iter().collect();
        assert_eq!(support.scalar_at(&loc(&[(WGHT, 0.1)])), 1.0);
    }

    #[test]
    fn key_is_stable() {
        let support: Support = [
            (WGHT, Tent::new(0.0, 1.0, 1.0)),
            (WDTH, Tent::new(-1.0, -0.5, 0.0)),
        ]
        .into_iter()
        .collect();
        assert_eq!(support.key(), "wdth=-1:-0.5:0,wght=0:1:1");
    }
}
