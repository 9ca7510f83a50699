//! Layer stack to paint graph compilation.

use std::{collections::BTreeMap, fmt};

use font_types::Tag;
use log::{debug, info, warn};
use painter_font_varmodel::NormalizedLocation;
use painter_font_varstore::VarStoreBuilder;

use crate::{
    context::CompileContext,
    error::Result,
    layer::{BlendMode, Layer},
    options::CompileOptions,
    paint::{BaseGlyphPaint, ColrTable, Paint, VarIndexMap},
    palette::Palette,
    types::{GlyphId, GlyphRef},
};

/// A layer left out of the output because its glyph reference did not resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileWarning {
    /// Glyph whose stack held the layer
    pub glyph_id: GlyphId,
    /// Position of the layer in the stack
    pub layer_index: usize,
    /// The unresolved reference
    pub reference: Option<GlyphRef>,
}

impl fmt::Display for CompileWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Skipped layer {} of {}: ", self.layer_index, self.glyph_id)?;
        match self.reference {
            Some(reference) => write!(f, "glyph {reference} does not exist"),
            None => f.write_str("no glyph reference"),
        }
    }
}

/// Output of a compile.
#[derive(Debug, Clone)]
pub struct CompiledColr {
    pub colr: ColrTable,
    /// Colors referenced by palette index from the paint records
    pub palette: Palette,
    pub warnings: Vec<CompileWarning>,
}

/// Compiles layer stacks glyph by glyph into one COLR table.
///
/// The layer list, palette and variation store are shared by every glyph.
#[derive(Debug)]
pub struct ColrCompiler {
    options: CompileOptions,
    ctx: CompileContext,
    layers: Vec<Paint>,
    base_glyph_paints: BTreeMap<GlyphId, Paint>,
    warnings: Vec<CompileWarning>,
}

impl ColrCompiler {
    pub fn new(axes: Vec<Tag>, options: CompileOptions) -> Self {
        let default_location: NormalizedLocation = axes.iter().map(|tag| (*tag, 0.0)).collect();
        Self {
            options,
            ctx: CompileContext::new(VarStoreBuilder::new(axes), default_location),
            layers: Vec::new(),
            base_glyph_paints: BTreeMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Compile the stack for `glyph_id`. The first layer is the topmost.
    ///
    /// A stack that produces no paint gets no base glyph record. On error the
    /// layers and delta-set entries added for this glyph are discarded.
    pub fn add_glyph(&mut self, glyph_id: GlyphId, stack: &[Layer]) -> Result<()> {
        let resolved = self.resolve_layers(glyph_id, stack);
        let layer_count = self.layers.len();
        let entry_count = self.ctx.delta_sets.len();
        let compiled = match resolved.as_slice() {
            [] => Ok(None),
            [(layer, target)] => layer.to_paint(*target, &mut self.ctx).map(Some),
            _ => self.compile_stack(&resolved),
        };
        let paint = match compiled {
            Ok(paint) => paint,
            Err(err) => {
                self.layers.truncate(layer_count);
                self.ctx.delta_sets.entries.truncate(entry_count);
                return Err(err);
            }
        };
        let Some(paint) = paint else {
            debug!("{glyph_id} has no paintable layers");
            return Ok(());
        };
        if self.base_glyph_paints.insert(glyph_id, paint).is_some() {
            warn!("{glyph_id} compiled twice; keeping the last stack");
        }
        Ok(())
    }

    fn resolve_layers<'a>(&mut self, glyph_id: GlyphId, stack: &'a [Layer]) -> Vec<(&'a Layer, GlyphId)> {
        let mut resolved = Vec::with_capacity(stack.len());
        for (layer_index, layer) in stack.iter().enumerate() {
            let target = layer
                .glyph
                .map(|reference| reference.resolve(glyph_id))
                .filter(|target| self.options.has_glyph(target.to_u16()));
            match target {
                Some(target) => resolved.push((layer, target)),
                None => {
                    let warning = CompileWarning {
                        glyph_id,
                        layer_index,
                        reference: layer.glyph,
                    };
                    warn!("{warning}");
                    self.warnings.push(warning);
                }
            }
        }
        resolved
    }

    /// Append the stack to the shared layer list, bottom layer first.
    ///
    /// A layer with a composite blend mode becomes the source of a composite
    /// record whose backdrop is every layer appended below it.
    fn compile_stack(&mut self, stack: &[(&Layer, GlyphId)]) -> Result<Option<Paint>> {
        let mut start = self.layers.len();
        for (layer, target) in stack.iter().rev() {
            let paint = layer.to_paint(*target, &mut self.ctx)?;
            match layer.blend_mode {
                BlendMode::Normal => self.layers.push(paint),
                BlendMode::Composite(composite_mode) => {
                    let backdrop = Paint::ColrLayers {
                        num_layers: (self.layers.len() - start) as u32,
                        first_layer_index: start as u32,
                    };
                    self.layers.push(Paint::Composite {
                        source_paint: Box::new(paint),
                        composite_mode,
                        backdrop_paint: Box::new(backdrop),
                    });
                    start = self.layers.len() - 1;
                }
            }
        }

        Ok(match self.layers.len() - start {
            0 => None,
            1 => self.layers.pop(),
            count => Some(Paint::ColrLayers {
                num_layers: count as u32,
                first_layer_index: start as u32,
            }),
        })
    }

    /// Finish the variation store, if anything varied, and assemble the table.
    pub fn finish(self) -> CompiledColr {
        let CompileContext {
            builder,
            delta_sets,
            palette,
            ..
        } = self.ctx;

        let (var_index_map, item_variation_store) = if delta_sets.is_empty() {
            (None, None)
        } else {
            let store = builder.finish(self.options.optimize_var_store);
            (Some(VarIndexMap::from(delta_sets)), Some(store))
        };

        info!(
            "Compiled {} color glyphs: {} layers, {} palette entries, {} variation entries in {} pages",
            self.base_glyph_paints.len(),
            self.layers.len(),
            palette.len(),
            var_index_map.as_ref().map_or(0, |map| map.map_data.len()),
            item_variation_store.as_ref().map_or(0, |store| store.var_data.len()),
        );

        let base_glyph_paints = self
            .base_glyph_paints
            .into_iter()
            .map(|(glyph_id, paint)| BaseGlyphPaint { glyph_id, paint })
            .collect();

        CompiledColr {
            colr: ColrTable {
                base_glyph_paints,
                layers: self.layers,
                var_index_map,
                item_variation_store,
            },
            palette,
            warnings: self.warnings,
        }
    }
}

/// Compile every glyph's layer stack in glyph order.
pub fn compile(axes: Vec<Tag>, glyphs: &BTreeMap<GlyphId, Vec<Layer>>, options: CompileOptions) -> Result<CompiledColr> {
    let mut compiler = ColrCompiler::new(axes, options);
    for (glyph_id, stack) in glyphs {
        compiler.add_glyph(*glyph_id, stack)?;
    }
    Ok(compiler.finish())
}
