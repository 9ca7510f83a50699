//! # COLR Paint Compiler
//!
//! Compiles editable, variable paint layers into a COLR version 1 paint
//! graph: a base glyph record per color glyph, a shared layer list, the
//! palette the records index into and, when anything varies, an item
//! variation store with its delta-set index map.
//!
//! Fills, opacities, gradient geometry and transforms are [`Variable`]
//! containers holding master values at normalized design-space locations.
//!
//! ## Example
//!
//! ```
//! use std::collections::BTreeMap;
//!
//! use font_types::Tag;
//! use painter_font_colr::{CompileOptions, GlyphId, GlyphRef, Layer, Paint, SolidFill, compile};
//! use painter_font_varmodel::NormalizedLocation;
//!
//! let wght = Tag::new(b"wght");
//! let mut fill = SolidFill::new(&[wght], "#ff0000", 1.0);
//! fill.opacity.add_value(&NormalizedLocation::new().with(wght, 1.0), 0.5);
//!
//! let layer = Layer::new(&[wght], Some(GlyphRef::Current), fill);
//! let glyphs = BTreeMap::from([(GlyphId::new(1), vec![layer])]);
//! let out = compile(vec![wght], &glyphs, CompileOptions::default()).unwrap();
//!
//! let paint = out.colr.base_glyph_paint(GlyphId::new(1)).unwrap();
//! assert!(matches!(paint, Paint::Glyph { .. }));
//! assert!(out.colr.item_variation_store.is_some());
//! ```

mod compiler;
mod context;
mod error;
mod fill;
mod layer;
mod matrix;
mod options;
mod paint;
mod palette;
mod types;
mod variable;

pub use compiler::{ColrCompiler, CompileWarning, CompiledColr, compile};
pub use context::{CompileContext, f2dot14_units, fixed_units};
pub use error::{Error, Result};
pub use fill::{Fill, GradientStop, LinearGradientFill, RadialGradientFill, SolidFill};
pub use layer::{BlendMode, Layer, wrap_transform};
pub use matrix::{MatrixType, matrix_label, matrix_type, merge_matrix_types};
pub use options::CompileOptions;
pub use paint::{
    Affine2x3, BaseGlyphPaint, ColorLine, ColorStop, ColrTable, CompositeMode, Extend, Paint, VarColorLine,
    VarColorStop, VarIndexMap,
};
pub use palette::{ColorRecord, MAX_PALETTE_ENTRIES, Palette, parse_color};
pub use types::{GlyphId, GlyphRef};
pub use variable::{Interpolate, Variable, VariableMatrix, VariableScalar};
