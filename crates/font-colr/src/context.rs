//! Shared state threaded through one compile.

use painter_font_varmodel::NormalizedLocation;
use painter_font_varstore::{DeltaSetIndexMap, NO_VARIATION_INDEX, VarStoreBuilder};

use crate::{
    error::Result,
    palette::Palette,
    variable::{VariableMatrix, VariableScalar},
};

/// Scale a value to F2Dot14 units.
pub fn f2dot14_units(value: f64) -> f64 {
    (value * 16384.0).round()
}

/// Scale a value to 16.16 fixed-point units.
pub fn fixed_units(value: f64) -> f64 {
    (value * 65536.0).round()
}

/// Accumulates the variation store, the delta-set index map and the palette
/// while paint records are produced.
#[derive(Debug)]
pub struct CompileContext {
    pub builder: VarStoreBuilder,
    pub delta_sets: DeltaSetIndexMap,
    pub palette: Palette,
    default_location: NormalizedLocation,
}

impl CompileContext {
    pub fn new(builder: VarStoreBuilder, default_location: NormalizedLocation) -> Self {
        Self {
            builder,
            delta_sets: DeltaSetIndexMap::new(),
            palette: Palette::new(),
            default_location,
        }
    }

    pub fn default_location(&self) -> &NormalizedLocation {
        &self.default_location
    }

    pub fn palette_index(&mut self, color: &str) -> Result<u16> {
        self.palette.index_of(color)
    }

    /// `var_index_base` for the next record.
    pub fn next_var_index(&self) -> u32 {
        self.delta_sets.next_index()
    }

    /// Add a delta-set entry for a scalar field.
    ///
    /// Fields that do not vary get [`NO_VARIATION_INDEX`] without touching the store.
    pub fn push_scalar(&mut self, value: &VariableScalar, convert: fn(f64) -> f64) -> u32 {
        let entry = if value.does_vary() {
            value.add_to_var_store(&mut self.builder, |v| convert(*v))
        } else {
            NO_VARIATION_INDEX
        };
        self.delta_sets.push(entry)
    }

    /// Add a delta-set entry for one coefficient (`a` through `f`) of a transform.
    pub fn push_matrix_component(&mut self, matrix: &VariableMatrix, idx: usize, convert: fn(f64) -> f64) -> u32 {
        let entry = if matrix.component_varies(idx) {
            matrix.add_to_var_store(&mut self.builder, |m| convert(m.as_coeffs()[idx]))
        } else {
            NO_VARIATION_INDEX
        };
        self.delta_sets.push(entry)
    }

    pub fn push_no_variation(&mut self) -> u32 {
        self.delta_sets.push(NO_VARIATION_INDEX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use font_types::Tag;
    use kurbo::Affine;

    const WGHT: Tag = Tag::new(b"wght");

    fn context() -> CompileContext {
        CompileContext::new(
            VarStoreBuilder::new(vec![WGHT]),
            NormalizedLocation::new().with(WGHT, 0.0),
        )
    }

    #[test]
    fn units() {
        assert_eq!(f2dot14_units(0.5), 8192.0);
        assert_eq!(fixed_units(-1.0), -65536.0);
    }

    #[test]
    fn constant_fields_skip_the_store() {
        let mut ctx = context();
        let opacity = VariableScalar::with_default(vec![WGHT], 1.0);

        assert_eq!(ctx.push_scalar(&opacity, f2dot14_units), 0);
        assert_eq!(ctx.delta_sets.entries, vec![NO_VARIATION_INDEX]);
        assert!(ctx.builder.is_empty());
    }

    #[test]
    fn varying_fields_reach_the_store() {
        let mut ctx = context();
        let opacity = VariableScalar::with_default(vec![WGHT], 1.0)
            .with_value(&NormalizedLocation::new().with(WGHT, 1.0), 0.5);

        ctx.push_no_variation();
        assert_eq!(ctx.push_scalar(&opacity, f2dot14_units), 1);
        assert_eq!(ctx.delta_sets.entries[1], 0);
        assert_eq!(ctx.next_var_index(), 2);
    }

    #[test]
    fn matrix_components_vary_independently() {
        let mut ctx = context();
        let matrix = VariableMatrix::with_default(vec![WGHT], Affine::IDENTITY).with_value(
            &NormalizedLocation::new().with(WGHT, 1.0),
            Affine::translate((0.0, 30.0)),
        );

        ctx.push_matrix_component(&matrix, 4, fixed_units);
        ctx.push_matrix_component(&matrix, 5, fixed_units);

        assert_eq!(ctx.delta_sets.entries, vec![NO_VARIATION_INDEX, 0]);
    }
}
