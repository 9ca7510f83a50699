//! Sparse variation model.
//!
//! Given an irregular set of master locations, works out a canonical master
//! order, a support region per master and the weights each master's delta
//! receives from earlier masters. With those, master values can be turned
//! into deltas and interpolated at any location in the design space.

use std::{borrow::Cow, cmp::Ordering, collections::HashMap};

use font_types::Tag;
use log::{debug, log_enabled, trace, Level};

use crate::{
    location::NormalizedLocation,
    support::{Support, Tent},
};

/// Variation model over a set of master locations.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationModel {
    /// Master locations as supplied
    orig_locations: Vec<NormalizedLocation>,
    /// Sparse master locations in canonical order
    locations: Vec<NormalizedLocation>,
    /// Canonical locations relative to `origin`; identical to `locations`
    /// whenever a master sits at the default
    relative: Vec<NormalizedLocation>,
    /// The location the model is anchored at (empty when a default master exists)
    origin: NormalizedLocation,
    /// One region per canonical master
    supports: Vec<Support>,
    axis_order: Vec<Tag>,
    /// Original index -> canonical index
    mapping: Vec<usize>,
    /// Canonical index -> original index
    reverse_mapping: Vec<usize>,
    /// For each canonical master, (earlier master, weight) pairs
    delta_weights: Vec<Vec<(usize, f64)>>,
}

impl VariationModel {
    /// Build a model from master locations.
    ///
    /// `axis_order` only breaks ties between otherwise equivalent masters;
    /// locations may use axes it does not mention.
    ///
    /// When no master sits at the default location, the model is anchored at
    /// the first master in canonical order: that master takes the
    /// unconstrained base region and every other region is measured from it.
    pub fn new(locations: Vec<NormalizedLocation>, axis_order: Vec<Tag>) -> Self {
        let sparse: Vec<NormalizedLocation> = locations.iter().map(|loc| loc.sparse()).collect();

        let origin = if sparse.iter().any(|loc| loc.is_empty()) {
            NormalizedLocation::new()
        } else {
            let hat = SortingHat::new(&sparse, &axis_order);
            sparse
                .iter()
                .min_by(|a, b| hat.compare(a, b))
                .cloned()
                .unwrap_or_default()
        };
        if !origin.is_empty() {
            debug!("No master at the default location; anchoring model at {origin}");
        }

        let relative: Vec<NormalizedLocation> =
            sparse.iter().map(|loc| relative_to(loc, &origin)).collect();

        let hat = SortingHat::new(&relative, &axis_order);
        let mut order: Vec<usize> = (0..relative.len()).collect();
        order.sort_by(|&a, &b| hat.compare(&relative[a], &relative[b]));

        let mut mapping = vec![0; order.len()];
        for (canonical, &original) in order.iter().enumerate() {
            mapping[original] = canonical;
        }

        let canonical_relative: Vec<NormalizedLocation> =
            order.iter().map(|&idx| relative[idx].clone()).collect();
        let canonical_locations: Vec<NormalizedLocation> =
            order.iter().map(|&idx| sparse[idx].clone()).collect();

        let supports = compute_supports(&canonical_relative);
        let delta_weights = compute_delta_weights(&canonical_relative, &supports);

        debug!(
            "Variation model: {} masters, {} regions with axis constraints",
            canonical_locations.len(),
            supports.iter().filter(|s| !s.is_empty()).count()
        );
        if log_enabled!(Level::Trace) {
            for (loc, support) in canonical_locations.iter().zip(supports.iter()) {
                trace!("  {loc} -> {support}");
            }
        }

        Self {
            orig_locations: locations,
            locations: canonical_locations,
            relative: canonical_relative,
            origin,
            supports,
            axis_order,
            mapping,
            reverse_mapping: order,
            delta_weights,
        }
    }

    /// Number of masters in the model.
    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }

    /// Master locations in the order they were supplied.
    pub fn orig_locations(&self) -> &[NormalizedLocation] {
        &self.orig_locations
    }

    /// Sparse master locations in canonical order.
    pub fn locations(&self) -> &[NormalizedLocation] {
        &self.locations
    }

    /// Support regions, one per canonical master.
    pub fn supports(&self) -> &[Support] {
        &self.supports
    }

    pub fn axis_order(&self) -> &[Tag] {
        &self.axis_order
    }

    /// Original master index to canonical index.
    pub fn mapping(&self) -> &[usize] {
        &self.mapping
    }

    /// Canonical master index to original index.
    pub fn reverse_mapping(&self) -> &[usize] {
        &self.reverse_mapping
    }

    /// For each canonical master, the earlier masters it depends on and their weights.
    pub fn delta_weights(&self) -> &[Vec<(usize, f64)>] {
        &self.delta_weights
    }

    /// The location the model is anchored at.
    pub fn origin(&self) -> &NormalizedLocation {
        &self.origin
    }

    /// Whether one of the masters sits at the default location.
    pub fn is_anchored_at_default(&self) -> bool {
        self.origin.is_empty()
    }

    /// Scalar of every canonical master's region at `location`.
    pub fn scalars(&self, location: &NormalizedLocation) -> Vec<f64> {
        let location = relative_to(location, &self.origin);
        self.supports
            .iter()
            .map(|support| support.scalar_at(&location))
            .collect()
    }

    /// Turn master values (in original order) into deltas (in canonical order).
    ///
    /// `deltas[0]` is the absolute value of the base master.
    ///
    /// # Panics
    ///
    /// Panics if the number of values does not match the number of masters.
    pub fn deltas(&self, master_values: &[f64]) -> Vec<f64> {
        assert_eq!(
            master_values.len(),
            self.delta_weights.len(),
            "master value count must match the model"
        );
        let mut out: Vec<f64> = Vec::with_capacity(master_values.len());
        for (idx, weights) in self.delta_weights.iter().enumerate() {
            let mut delta = master_values[self.reverse_mapping[idx]];
            for &(prev, weight) in weights {
                delta -= out[prev] * weight;
            }
            out.push(delta);
        }
        out
    }

    /// Weighted sum of deltas; `None` when every scalar is zero.
    pub fn interpolate_from_deltas_and_scalars(&self, deltas: &[f64], scalars: &[f64]) -> Option<f64> {
        assert_eq!(deltas.len(), scalars.len(), "one scalar per delta");
        deltas
            .iter()
            .zip(scalars)
            .filter(|(_, scalar)| **scalar != 0.0)
            .fold(None, |acc, (delta, scalar)| Some(acc.unwrap_or(0.0) + delta * scalar))
    }

    pub fn interpolate_from_deltas(&self, location: &NormalizedLocation, deltas: &[f64]) -> Option<f64> {
        let scalars = self.scalars(location);
        self.interpolate_from_deltas_and_scalars(deltas, &scalars)
    }

    pub fn interpolate_from_masters(
        &self,
        location: &NormalizedLocation,
        master_values: &[f64],
    ) -> Option<f64> {
        let deltas = self.deltas(master_values);
        self.interpolate_from_deltas(location, &deltas)
    }

    pub fn interpolate_from_masters_and_scalars(
        &self,
        master_values: &[f64],
        scalars: &[f64],
    ) -> Option<f64> {
        let deltas = self.deltas(master_values);
        self.interpolate_from_deltas_and_scalars(&deltas, scalars)
    }

    /// A model restricted to the masters that have a value.
    ///
    /// Returns this model unchanged when every item is present.
    pub fn sub_model(&self, items: &[Option<f64>]) -> (Cow<'_, VariationModel>, Vec<f64>) {
        assert_eq!(items.len(), self.orig_locations.len(), "one item per master");
        let present: Vec<f64> = items.iter().flatten().copied().collect();
        if present.len() == items.len() {
            return (Cow::Borrowed(self), present);
        }
        let locations = self
            .orig_locations
            .iter()
            .zip(items)
            .filter(|(_, item)| item.is_some())
            .map(|(loc, _)| loc.clone())
            .collect();
        (Cow::Owned(Self::new(locations, self.axis_order.clone())), present)
    }

    #[cfg(test)]
    fn relative_locations(&self) -> &[NormalizedLocation] {
        &self.relative
    }
}

/// `location - origin`, dropping axes that end up at zero.
fn relative_to(location: &NormalizedLocation, origin: &NormalizedLocation) -> NormalizedLocation {
    if origin.is_empty() {
        return location.sparse();
    }
    let mut out = location.clone();
    for (tag, value) in origin.iter() {
        out.insert(tag, location.value(tag) - value);
    }
    out.sparse()
}

/// Orders master locations so that a master can only be influenced by masters before it.
///
/// Masters offset on fewer axes sort first; among those, masters whose
/// coordinates coincide with single-axis masters ("on-point") are preferred.
/// Remaining ties are broken by the axis order hint, then the signs of the
/// coordinates (negative first), then their magnitudes.
struct SortingHat<'a> {
    axis_order: &'a [Tag],
    axis_points: HashMap<Tag, Vec<f64>>,
}

impl<'a> SortingHat<'a> {
    fn new(locations: &[NormalizedLocation], axis_order: &'a [Tag]) -> Self {
        let mut axis_points: HashMap<Tag, Vec<f64>> = HashMap::new();
        for location in locations {
            if location.len() != 1 {
                continue;
            }
            for (tag, value) in location.iter() {
                let points = axis_points.entry(tag).or_insert_with(|| vec![0.0]);
                if !points.contains(&value) {
                    points.push(value);
                }
            }
        }
        Self { axis_order, axis_points }
    }

    fn on_point_count(&self, location: &NormalizedLocation) -> usize {
        location
            .iter()
            .filter(|(tag, value)| {
                self.axis_points
                    .get(tag)
                    .is_some_and(|points| points.contains(value))
            })
            .count()
    }

    /// Axes of the location: hinted axes first (in hint order), then the rest by tag.
    fn ordered_axes(&self, location: &NormalizedLocation) -> Vec<Tag> {
        let mut axes: Vec<Tag> = self
            .axis_order
            .iter()
            .copied()
            .filter(|tag| location.contains(*tag))
            .collect();
        axes.extend(location.axis_tags().filter(|tag| !self.axis_order.contains(tag)));
        axes
    }

    fn axis_ranks(&self, axes: &[Tag]) -> Vec<usize> {
        axes.iter()
            .map(|tag| {
                self.axis_order
                    .iter()
                    .position(|t| t == tag)
                    .unwrap_or(0x10000)
            })
            .collect()
    }

    fn compare(&self, a: &NormalizedLocation, b: &NormalizedLocation) -> Ordering {
        let axes_a = self.ordered_axes(a);
        let axes_b = self.ordered_axes(b);
        let signs = |loc: &NormalizedLocation, axes: &[Tag]| -> Vec<i8> {
            axes.iter().map(|tag| loc.value(*tag).signum() as i8).collect()
        };
        let magnitudes = |loc: &NormalizedLocation, axes: &[Tag]| -> Vec<f64> {
            axes.iter().map(|tag| loc.value(*tag).abs()).collect()
        };

        a.len()
            .cmp(&b.len())
            .then_with(|| self.on_point_count(b).cmp(&self.on_point_count(a)))
            .then_with(|| self.axis_ranks(&axes_a).cmp(&self.axis_ranks(&axes_b)))
            .then_with(|| axes_a.cmp(&axes_b))
            .then_with(|| signs(a, &axes_a).cmp(&signs(b, &axes_b)))
            .then_with(|| {
                let ma = magnitudes(a, &axes_a);
                let mb = magnitudes(b, &axes_b);
                ma.iter()
                    .zip(&mb)
                    .map(|(x, y)| x.total_cmp(y))
                    .find(|ord| ord.is_ne())
                    .unwrap_or(Ordering::Equal)
            })
    }
}

/// Initial regions: each active axis spans from the default to the observed extreme.
fn locations_to_regions(locations: &[NormalizedLocation]) -> Vec<Support> {
    let mut min_v: HashMap<Tag, f64> = HashMap::new();
    let mut max_v: HashMap<Tag, f64> = HashMap::new();
    for location in locations {
        for (tag, value) in location.iter() {
            let min = min_v.entry(tag).or_insert(value);
            *min = min.min(value);
            let max = max_v.entry(tag).or_insert(value);
            *max = max.max(value);
        }
    }

    locations
        .iter()
        .map(|location| {
            location
                .iter()
                .map(|(tag, value)| {
                    let tent = if value > 0.0 {
                        Tent::new(0.0, value, max_v[&tag])
                    } else {
                        Tent::new(min_v[&tag], value, 0.0)
                    };
                    (tag, tent)
                })
                .collect()
        })
        .collect()
}

/// Refine the initial regions so that overlapping masters do not double-count.
///
/// For each master, every earlier master whose axes are a subset and whose
/// peak falls inside this region splits the region on the axis (or axes) with
/// the largest overlap ratio.
fn compute_supports(locations: &[NormalizedLocation]) -> Vec<Support> {
    let mut regions = locations_to_regions(locations);

    for idx in 0..regions.len() {
        let (earlier, rest) = regions.split_at_mut(idx);
        let region = &mut rest[0];

        for prev in earlier.iter() {
            if !prev.axis_tags().all(|tag| region.contains(tag)) {
                continue;
            }

            let relevant = region.iter().all(|(tag, tent)| match prev.get(tag) {
                Some(prev_tent) => {
                    prev_tent.peak == tent.peak
                        || (tent.lower < prev_tent.peak && prev_tent.peak < tent.upper)
                }
                None => false,
            });
            if !relevant {
                continue;
            }

            let mut best_axes: Vec<(Tag, Tent)> = Vec::new();
            let mut best_ratio = -1.0;
            for (tag, prev_tent) in prev.iter() {
                let val = prev_tent.peak;
                let Some(&Tent { lower, peak, upper }) = region.get(tag) else {
                    continue;
                };
                let (new_lower, new_upper, ratio) = match val.partial_cmp(&peak) {
                    Some(Ordering::Less) => (val, upper, (val - peak) / (lower - peak)),
                    Some(Ordering::Greater) => (lower, val, (val - peak) / (upper - peak)),
                    // can't split the box in this direction
                    _ => continue,
                };
                if ratio > best_ratio {
                    best_axes.clear();
                    best_ratio = ratio;
                }
                if ratio == best_ratio {
                    best_axes.push((tag, Tent::new(new_lower, peak, new_upper)));
                }
            }

            for (tag, tent) in best_axes {
                trace!("Splitting region {idx} on {tag}: {tent}");
                region.insert(tag, tent);
            }
        }
    }

    regions
}

fn compute_delta_weights(locations: &[NormalizedLocation], supports: &[Support]) -> Vec<Vec<(usize, f64)>> {
    locations
        .iter()
        .enumerate()
        .map(|(idx, location)| {
            supports[..idx]
                .iter()
                .enumerate()
                .filter_map(|(prev, support)| {
                    let scalar = support.scalar_at(location);
                    (scalar != 0.0).then_some((prev, scalar))
                })
                .collect()
        })
        .collect()
}
