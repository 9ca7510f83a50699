//! Variation regions in table form.

use font_types::{F2Dot14, Tag};
use painter_font_varmodel::Support;

/// Start, peak and end of a region on one axis.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegionAxisCoordinates {
    pub start_coord: F2Dot14,
    pub peak_coord: F2Dot14,
    pub end_coord: F2Dot14,
}

/// A region with one entry per font axis, in font axis order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VariationRegion {
    pub region_axes: Vec<RegionAxisCoordinates>,
}

impl VariationRegion {
    /// Convert a model support into a region over `axis_tags`.
    ///
    /// Axes the support does not constrain are written as all zeros.
    pub fn from_support(support: &Support, axis_tags: &[Tag]) -> Self {
        let region_axes = axis_tags
            .iter()
            .map(|tag| match support.get(*tag) {
                Some(tent) => RegionAxisCoordinates {
                    start_coord: F2Dot14::from_f32(tent.lower as f32),
                    peak_coord: F2Dot14::from_f32(tent.peak as f32),
                    end_coord: F2Dot14::from_f32(tent.upper as f32),
                },
                None => RegionAxisCoordinates::default(),
            })
            .collect();
        Self { region_axes }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use painter_font_varmodel::Tent;

    #[test]
    fn missing_axes_are_zero() {
        let wght = Tag::new(b"wght");
        let wdth = Tag::new(b"wdth");
        let support: Support = [(wght, Tent::new(0.0, 1.0, 1.0))].into_iter().collect();
        let region = VariationRegion::from_support(&support, &[wdth, wght]);

        assert_eq!(region.region_axes.len(), 2);
        assert_eq!(region.region_axes[0], RegionAxisCoordinates::default());
        assert_eq!(region.region_axes[1].start_coord.to_f32(), 0.0);
        assert_eq!(region.region_axes[1].peak_coord.to_f32(), 1.0);
        assert_eq!(region.region_axes[1].end_coord.to_f32(), 1.0);
    }
}
