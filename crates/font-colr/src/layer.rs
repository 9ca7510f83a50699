//! Paint layers and their compilation to a single paint record.

use std::convert::identity;

use font_types::Tag;
use kurbo::Affine;

use crate::{
    context::{CompileContext, fixed_units},
    error::Result,
    fill::Fill,
    matrix::{MatrixType, matrix_type},
    paint::{Affine2x3, CompositeMode, Paint},
    types::{GlyphId, GlyphRef},
    variable::VariableMatrix,
};

/// How a layer combines with the layers below it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum BlendMode {
    /// Painted on top of what is below
    #[default]
    Normal,
    /// Composited onto everything below with the given mode
    Composite(CompositeMode),
}

impl BlendMode {
    pub fn is_normal(&self) -> bool {
        matches!(self, Self::Normal)
    }
}

impl From<CompositeMode> for BlendMode {
    fn from(mode: CompositeMode) -> Self {
        Self::Composite(mode)
    }
}

/// One entry of a glyph's layer stack.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Glyph whose outline is filled; `None` when the reference could not be resolved
    pub glyph: Option<GlyphRef>,
    pub fill: Fill,
    pub transform: VariableMatrix,
    pub blend_mode: BlendMode,
    /// Editor state, not compiled
    pub visible: bool,
    /// Editor state, not compiled
    pub locked: bool,
}

impl Layer {
    pub fn new(axes: &[Tag], glyph: Option<GlyphRef>, fill: impl Into<Fill>) -> Self {
        Self {
            glyph,
            fill: fill.into(),
            transform: VariableMatrix::with_default(axes.to_vec(), Affine::IDENTITY),
            blend_mode: BlendMode::Normal,
            visible: true,
            locked: false,
        }
    }

    pub fn with_transform(mut self, transform: VariableMatrix) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_blend_mode(mut self, blend_mode: impl Into<BlendMode>) -> Self {
        self.blend_mode = blend_mode.into();
        self
    }

    /// Compile to a glyph record holding the fill, wrapped in the layer's transform.
    pub fn to_paint(&self, glyph_id: GlyphId, ctx: &mut CompileContext) -> Result<Paint> {
        let glyph = Paint::Glyph {
            paint: Box::new(self.fill.to_paint(ctx)?),
            glyph_id,
        };
        Ok(wrap_transform(glyph, &self.transform, ctx))
    }
}

/// Wrap `paint` in the simplest record able to express `transform`.
pub fn wrap_transform(paint: Paint, transform: &VariableMatrix, ctx: &mut CompileContext) -> Paint {
    let default = transform.value_at(ctx.default_location());
    let [.., e, f] = default.as_coeffs();
    let paint = Box::new(paint);

    if !transform.does_vary() {
        return match matrix_type(&default) {
            MatrixType::None => *paint,
            MatrixType::Translation => Paint::Translate {
                paint,
                dx: fword(e),
                dy: fword(f),
            },
            _ => Paint::Transform {
                paint,
                transform: Affine2x3::from_affine(&default),
            },
        };
    }

    let var_index_base = ctx.next_var_index();
    match transform.most_complex_type() {
        MatrixType::None => *paint,
        MatrixType::Translation => {
            ctx.push_matrix_component(transform, 4, identity);
            ctx.push_matrix_component(transform, 5, identity);
            Paint::VarTranslate {
                paint,
                dx: fword(e),
                dy: fword(f),
                var_index_base,
            }
        }
        _ => {
            for idx in 0..6 {
                ctx.push_matrix_component(transform, idx, fixed_units);
            }
            Paint::VarTransform {
                paint,
                transform: Affine2x3::from_affine(&default),
                var_index_base,
            }
        }
    }
}

fn fword(value: f64) -> i16 {
    value.round().clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fill::SolidFill;
    use font_types::F2Dot14;
    use painter_font_varmodel::NormalizedLocation;
    use painter_font_varstore::{NO_VARIATION_INDEX, VarStoreBuilder};

    const WGHT: Tag = Tag::new(b"wght");

    fn context() -> CompileContext {
        CompileContext::new(
            VarStoreBuilder::new(vec![WGHT]),
            NormalizedLocation::new().with(WGHT, 0.0),
        )
    }

    fn bold() -> NormalizedLocation {
        NormalizedLocation::new().with(WGHT, 1.0)
    }

    fn black_layer() -> Layer {
        Layer::new(&[WGHT], Some(GlyphRef::Current), SolidFill::black(&[WGHT]))
    }

    fn black() -> Paint {
        Paint::Solid {
            palette_index: 0,
            alpha: F2Dot14::from_f32(1.0),
        }
    }

    #[test]
    fn identity_transform_is_not_wrapped() {
        let mut ctx = context();
        let paint = black_layer().to_paint(GlyphId::new(4), &mut ctx).unwrap();

        assert_eq!(
            paint,
            Paint::Glyph {
                paint: Box::new(black()),
                glyph_id: GlyphId::new(4),
            }
        );
    }

    #[test]
    fn static_translation() {
        let mut ctx = context();
        let layer = black_layer().with_transform(VariableMatrix::with_default(
            vec![WGHT],
            Affine::translate((10.4, -20.6)),
        ));
        let paint = layer.to_paint(GlyphId::new(1), &mut ctx).unwrap();

        let Paint::Translate { dx, dy, paint } = paint else {
            panic!("expected a translate record");
        };
        assert_eq!((dx, dy), (10, -21));
        assert_eq!(paint.format(), 10);
        assert!(ctx.delta_sets.is_empty());
    }

    #[test]
    fn static_scale_uses_full_transform() {
        let mut ctx = context();
        let layer = black_layer().with_transform(VariableMatrix::with_default(vec![WGHT], Affine::scale(2.0)));
        let paint = layer.to_paint(GlyphId::new(1), &mut ctx).unwrap();

        let Paint::Transform { transform, .. } = paint else {
            panic!("expected a transform record");
        };
        assert_eq!(transform.to_affine(), Affine::scale(2.0));
    }

    #[test]
    fn variable_translation() {
        let mut ctx = context();
        let transform = VariableMatrix::with_default(vec![WGHT], Affine::translate((5.0, 0.0)))
            .with_value(&bold(), Affine::translate((5.0, 40.0)));
        let paint = wrap_transform(black(), &transform, &mut ctx);

        assert!(matches!(
            paint,
            Paint::VarTranslate {
                dx: 5,
                dy: 0,
                var_index_base: 0,
                ..
            }
        ));
        assert_eq!(ctx.delta_sets.entries[0], NO_VARIATION_INDEX);
        let dy_entry = ctx.delta_sets.entries[1];
        let store = ctx.builder.finish(true);
        assert_eq!(store.item(dy_entry), Some(&[40][..]));
    }

    #[test]
    fn variable_scale_pushes_six_components() {
        let mut ctx = context();
        let transform =
            VariableMatrix::with_default(vec![WGHT], Affine::IDENTITY).with_value(&bold(), Affine::scale(1.5));
        let paint = wrap_transform(black(), &transform, &mut ctx);

        assert!(matches!(paint, Paint::VarTransform { var_index_base: 0, .. }));
        assert_eq!(ctx.delta_sets.len(), 6);
        let varying: Vec<usize> = (0..6)
            .filter(|idx| ctx.delta_sets.entries[*idx] != NO_VARIATION_INDEX)
            .collect();
        assert_eq!(varying, vec![0, 3]);

        let a_entry = ctx.delta_sets.entries[0];
        let store = ctx.builder.finish(true);
        assert_eq!(store.item(a_entry), Some(&[32768][..]));
    }

    #[test]
    fn clone_is_independent() {
        let layer = black_layer().with_blend_mode(CompositeMode::Multiply);
        let mut copy = layer.clone();
        copy.transform.add_value(&bold(), Affine::translate((0.0, 1.0)));
        copy.visible = false;

        assert!(!layer.transform.does_vary());
        assert!(layer.visible);
        assert_eq!(copy.blend_mode, BlendMode::Composite(CompositeMode::Multiply));
        assert!(!copy.blend_mode.is_normal());
    }
}
