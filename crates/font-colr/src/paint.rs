//! Paint records and the COLR table structures they live in.
//!
//! These are the logical table structures; turning them into bytes is left
//! to the table serializer.

use font_types::{F2Dot14, Fixed};
use kurbo::Affine;
use painter_font_varstore::{DeltaSetIndexMap, ItemVariationStore};

use crate::types::GlyphId;

/// How a color line extends beyond its first and last stops.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Extend {
    #[default]
    Pad = 0,
    Repeat = 1,
    Reflect = 2,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ColorStop {
    pub stop_offset: F2Dot14,
    pub palette_index: u16,
    pub alpha: F2Dot14,
}

/// A color stop whose offset and alpha take deltas from two consecutive
/// delta-set entries starting at `var_index_base`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VarColorStop {
    pub stop_offset: F2Dot14,
    pub palette_index: u16,
    pub alpha: F2Dot14,
    pub var_index_base: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorLine {
    pub extend: Extend,
    pub color_stops: Vec<ColorStop>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VarColorLine {
    pub extend: Extend,
    pub color_stops: Vec<VarColorStop>,
}

/// A 2x3 affine matrix in 16.16 fixed point.
///
/// Maps `(x, y)` to `(xx * x + xy * y + dx, yx * x + yy * y + dy)`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Affine2x3 {
    pub xx: Fixed,
    pub yx: Fixed,
    pub xy: Fixed,
    pub yy: Fixed,
    pub dx: Fixed,
    pub dy: Fixed,
}

impl Affine2x3 {
    pub fn from_affine(affine: &Affine) -> Self {
        let [xx, yx, xy, yy, dx, dy] = affine.as_coeffs().map(Fixed::from_f64);
        Self {
            xx,
            yx,
            xy,
            yy,
            dx,
            dy,
        }
    }

    pub fn to_affine(&self) -> Affine {
        Affine::new(
            [self.xx, self.yx, self.xy, self.yy, self.dx, self.dy].map(Fixed::to_f64),
        )
    }
}

/// Porter-Duff and blend modes for composite paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum CompositeMode {
    Clear = 0,
    Src = 1,
    Dest = 2,
    SrcOver = 3,
    DestOver = 4,
    SrcIn = 5,
    DestIn = 6,
    SrcOut = 7,
    DestOut = 8,
    SrcAtop = 9,
    DestAtop = 10,
    Xor = 11,
    Plus = 12,
    Screen = 13,
    Overlay = 14,
    Darken = 15,
    Lighten = 16,
    ColorDodge = 17,
    ColorBurn = 18,
    HardLight = 19,
    SoftLight = 20,
    Difference = 21,
    Exclusion = 22,
    Multiply = 23,
    HslHue = 24,
    HslSaturation = 25,
    HslColor = 26,
    HslLuminosity = 27,
}

/// One node of a color glyph's paint graph.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    /// A run of the shared layer list, painted bottom to top
    ColrLayers {
        num_layers: u32,
        first_layer_index: u32,
    },
    Solid {
        palette_index: u16,
        alpha: F2Dot14,
    },
    VarSolid {
        palette_index: u16,
        alpha: F2Dot14,
        var_index_base: u32,
    },
    LinearGradient {
        color_line: ColorLine,
        x0: i16,
        y0: i16,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
    },
    VarLinearGradient {
        color_line: VarColorLine,
        x0: i16,
        y0: i16,
        x1: i16,
        y1: i16,
        x2: i16,
        y2: i16,
        var_index_base: u32,
    },
    RadialGradient {
        color_line: ColorLine,
        x0: i16,
        y0: i16,
        radius0: u16,
        x1: i16,
        y1: i16,
        radius1: u16,
    },
    VarRadialGradient {
        color_line: VarColorLine,
        x0: i16,
        y0: i16,
        radius0: u16,
        x1: i16,
        y1: i16,
        radius1: u16,
        var_index_base: u32,
    },
    /// Fill the outline of a glyph with `paint`
    Glyph {
        paint: Box<Paint>,
        glyph_id: GlyphId,
    },
    Transform {
        paint: Box<Paint>,
        transform: Affine2x3,
    },
    VarTransform {
        paint: Box<Paint>,
        transform: Affine2x3,
        var_index_base: u32,
    },
    Translate {
        paint: Box<Paint>,
        dx: i16,
        dy: i16,
    },
    VarTranslate {
        paint: Box<Paint>,
        dx: i16,
        dy: i16,
        var_index_base: u32,
    },
    Composite {
        source_paint: Box<Paint>,
        composite_mode: CompositeMode,
        backdrop_paint: Box<Paint>,
    },
}

impl Paint {
    /// OpenType paint format number.
    pub fn format(&self) -> u8 {
        match self {
            Self::ColrLayers { .. } => 1,
            Self::Solid { .. } => 2,
            Self::VarSolid { .. } => 3,
            Self::LinearGradient { .. } => 4,
            Self::VarLinearGradient { .. } => 5,
            Self::RadialGradient { .. } => 6,
            Self::VarRadialGradient { .. } => 7,
            Self::Glyph { .. } => 10,
            Self::Transform { .. } => 12,
            Self::VarTransform { .. } => 13,
            Self::Translate { .. } => 14,
            Self::VarTranslate { .. } => 15,
            Self::Composite { .. } => 32,
        }
    }

    /// Whether the record takes deltas from the variation store.
    pub fn is_variable(&self) -> bool {
        matches!(
            self,
            Self::VarSolid { .. }
                | Self::VarLinearGradient { .. }
                | Self::VarRadialGradient { .. }
                | Self::VarTransform { .. }
                | Self::VarTranslate { .. }
        )
    }

    /// The single child paint of a wrapping record.
    pub fn child(&self) -> Option<&Paint> {
        match self {
            Self::Glyph { paint, .. }
            | Self::Transform { paint, .. }
            | Self::VarTransform { paint, .. }
            | Self::Translate { paint, .. }
            | Self::VarTranslate { paint, .. } => Some(paint.as_ref()),
            _ => None,
        }
    }
}

/// Root paint of one color glyph.
#[derive(Debug, Clone, PartialEq)]
pub struct BaseGlyphPaint {
    pub glyph_id: GlyphId,
    pub paint: Paint,
}

/// Delta-set index map as stored in the table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VarIndexMap {
    pub entry_format: u8,
    pub map_data: Vec<u32>,
}

impl From<DeltaSetIndexMap> for VarIndexMap {
    fn from(map: DeltaSetIndexMap) -> Self {
        Self {
            entry_format: map.entry_format(),
            map_data: map.entries,
        }
    }
}

/// Logical COLR version 1 table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColrTable {
    /// Sorted by glyph ID
    pub base_glyph_paints: Vec<BaseGlyphPaint>,
    pub layers: Vec<Paint>,
    pub var_index_map: Option<VarIndexMap>,
    pub item_variation_store: Option<ItemVariationStore>,
}

impl ColrTable {
    pub fn base_glyph_paint(&self, glyph_id: GlyphId) -> Option<&Paint> {
        self.base_glyph_paints
            .binary_search_by_key(&glyph_id, |record| record.glyph_id)
            .ok()
            .map(|idx| &self.base_glyph_paints[idx].paint)
    }

    /// Layers referenced by a [`Paint::ColrLayers`] record.
    pub fn layer_slice(&self, paint: &Paint) -> Option<&[Paint]> {
        let Paint::ColrLayers {
            num_layers,
            first_layer_index,
        } = paint
        else {
            return None;
        };
        let start = *first_layer_index as usize;
        self.layers.get(start..start + *num_layers as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_field_order() {
        // kurbo coefficients are [a, b, c, d, e, f] with x' = a*x + c*y + e
        let affine = Affine::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let table = Affine2x3::from_affine(&affine);

        assert_eq!(table.xx.to_f64(), 1.0);
        assert_eq!(table.yx.to_f64(), 2.0);
        assert_eq!(table.xy.to_f64(), 3.0);
        assert_eq!(table.yy.to_f64(), 4.0);
        assert_eq!(table.dx.to_f64(), 5.0);
        assert_eq!(table.dy.to_f64(), 6.0);
        assert_eq!(table.to_affine(), affine);
    }

    #[test]
    fn formats() {
        let solid = Paint::Solid {
            palette_index: 0,
            alpha: F2Dot14::from_f32(1.0),
        };
        assert_eq!(solid.format(), 2);
        assert!(!solid.is_variable());

        let glyph = Paint::Glyph {
            paint: Box::new(solid.clone()),
            glyph_id: GlyphId::new(3),
        };
        assert_eq!(glyph.format(), 10);
        assert_eq!(glyph.child(), Some(&solid));
    }

    #[test]
    fn layer_slice_bounds() {
        let solid = Paint::Solid {
            palette_index: 0,
            alpha: F2Dot14::from_f32(1.0),
        };
        let table = ColrTable {
            layers: vec![solid.clone(), solid],
            ..Default::default()
        };
        let slice = Paint::ColrLayers {
            num_layers: 2,
            first_layer_index: 0,
        };
        let too_long = Paint::ColrLayers {
            num_layers: 3,
            first_layer_index: 0,
        };

        assert_eq!(table.layer_slice(&slice).map(<[Paint]>::len), Some(2));
        assert_eq!(table.layer_slice(&too_long), None);
    }
}
