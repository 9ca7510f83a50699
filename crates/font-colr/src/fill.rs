//! Layer fills: solid colors and gradients.

use std::fmt;

use font_types::{F2Dot14, Tag};
use log::debug;

use crate::{
    context::{CompileContext, f2dot14_units},
    error::Result,
    paint::{ColorLine, ColorStop, Extend, Paint, VarColorLine, VarColorStop},
    variable::VariableScalar,
};

/// A single palette color with variable opacity.
#[derive(Debug, Clone)]
pub struct SolidFill {
    pub color: String,
    pub opacity: VariableScalar,
}

impl SolidFill {
    pub fn new(axes: &[Tag], color: impl Into<String>, opacity: f64) -> Self {
        Self {
            color: color.into(),
            opacity: VariableScalar::with_default(axes.to_vec(), opacity),
        }
    }

    /// Opaque black.
    pub fn black(axes: &[Tag]) -> Self {
        Self::new(axes, "#000000", 1.0)
    }

    pub fn does_vary(&self) -> bool {
        self.opacity.does_vary()
    }

    pub fn to_paint(&self, ctx: &mut CompileContext) -> Result<Paint> {
        let palette_index = ctx.palette_index(&self.color)?;
        let alpha = F2Dot14::from_f32(self.opacity.value_at(ctx.default_location()) as f32);
        if !self.opacity.does_vary() {
            return Ok(Paint::Solid {
                palette_index,
                alpha,
            });
        }
        let var_index_base = ctx.next_var_index();
        ctx.push_scalar(&self.opacity, f2dot14_units);
        Ok(Paint::VarSolid {
            palette_index,
            alpha,
            var_index_base,
        })
    }
}

/// A color stop on a gradient.
#[derive(Debug, Clone)]
pub struct GradientStop {
    pub color: String,
    /// Position along the color line, 0 to 1
    pub offset: f64,
    pub opacity: VariableScalar,
}

impl GradientStop {
    pub fn new(axes: &[Tag], color: impl Into<String>, offset: f64, opacity: f64) -> Self {
        Self {
            color: color.into(),
            offset,
            opacity: VariableScalar::with_default(axes.to_vec(), opacity),
        }
    }

    fn to_color_stop(&self, ctx: &mut CompileContext) -> Result<ColorStop> {
        Ok(ColorStop {
            stop_offset: F2Dot14::from_f32(self.offset as f32),
            palette_index: ctx.palette_index(&self.color)?,
            alpha: F2Dot14::from_f32(self.opacity.value_at(ctx.default_location()) as f32),
        })
    }

    /// Variable stops take two entries: the offset, which never varies, then alpha.
    fn to_var_color_stop(&self, ctx: &mut CompileContext) -> Result<VarColorStop> {
        let ColorStop {
            stop_offset,
            palette_index,
            alpha,
        } = self.to_color_stop(ctx)?;
        let var_index_base = ctx.push_no_variation();
        ctx.push_scalar(&self.opacity, f2dot14_units);
        Ok(VarColorStop {
            stop_offset,
            palette_index,
            alpha,
            var_index_base,
        })
    }
}

fn color_line(stops: &[GradientStop], ctx: &mut CompileContext) -> Result<ColorLine> {
    Ok(ColorLine {
        extend: Extend::Pad,
        color_stops: stops
            .iter()
            .map(|stop| stop.to_color_stop(ctx))
            .collect::<Result<_>>()?,
    })
}

fn var_color_line(stops: &[GradientStop], ctx: &mut CompileContext) -> Result<VarColorLine> {
    Ok(VarColorLine {
        extend: Extend::Pad,
        color_stops: stops
            .iter()
            .map(|stop| stop.to_var_color_stop(ctx))
            .collect::<Result<_>>()?,
    })
}

fn stops_vary(stops: &[GradientStop]) -> bool {
    stops.iter().any(|stop| stop.opacity.does_vary())
}

/// FWORD coordinate at the default location.
fn fword(value: &VariableScalar, ctx: &CompileContext) -> i16 {
    value
        .value_at(ctx.default_location())
        .round()
        .clamp(i16::MIN as f64, i16::MAX as f64) as i16
}

/// UFWORD distance at the default location.
fn ufword(value: &VariableScalar, ctx: &CompileContext) -> u16 {
    value
        .value_at(ctx.default_location())
        .round()
        .clamp(0.0, u16::MAX as f64) as u16
}

/// A linear gradient from p0 towards p1, with p2 setting the rotation.
#[derive(Debug, Clone)]
pub struct LinearGradientFill {
    pub stops: Vec<GradientStop>,
    pub x0: VariableScalar,
    pub y0: VariableScalar,
    pub x1: VariableScalar,
    pub y1: VariableScalar,
    pub x2: VariableScalar,
    pub y2: VariableScalar,
}

impl LinearGradientFill {
    /// Gradient with constant geometry.
    pub fn new(axes: &[Tag], stops: Vec<GradientStop>, points: [(f64, f64); 3]) -> Self {
        let scalar = |v: f64| VariableScalar::with_default(axes.to_vec(), v);
        let [(x0, y0), (x1, y1), (x2, y2)] = points;
        Self {
            stops,
            x0: scalar(x0),
            y0: scalar(y0),
            x1: scalar(x1),
            y1: scalar(y1),
            x2: scalar(x2),
            y2: scalar(y2),
        }
    }

    fn geometry(&self) -> [&VariableScalar; 6] {
        [&self.x0, &self.y0, &self.x1, &self.y1, &self.x2, &self.y2]
    }

    pub fn does_vary(&self) -> bool {
        self.geometry().iter().any(|v| v.does_vary()) || stops_vary(&self.stops)
    }

    pub fn to_paint(&self, ctx: &mut CompileContext) -> Result<Paint> {
        if !self.does_vary() {
            return Ok(Paint::LinearGradient {
                color_line: color_line(&self.stops, ctx)?,
                x0: fword(&self.x0, ctx),
                y0: fword(&self.y0, ctx),
                x1: fword(&self.x1, ctx),
                y1: fword(&self.y1, ctx),
                x2: fword(&self.x2, ctx),
                y2: fword(&self.y2, ctx),
            });
        }
        let color_line = var_color_line(&self.stops, ctx)?;
        let var_index_base = ctx.next_var_index();
        for value in self.geometry() {
            ctx.push_scalar(value, std::convert::identity);
        }
        debug!("Variable linear gradient at delta-set entry {var_index_base}");
        Ok(Paint::VarLinearGradient {
            color_line,
            x0: fword(&self.x0, ctx),
            y0: fword(&self.y0, ctx),
            x1: fword(&self.x1, ctx),
            y1: fword(&self.y1, ctx),
            x2: fword(&self.x2, ctx),
            y2: fword(&self.y2, ctx),
            var_index_base,
        })
    }
}

/// A two-circle radial gradient.
#[derive(Debug, Clone)]
pub struct RadialGradientFill {
    pub stops: Vec<GradientStop>,
    pub x0: VariableScalar,
    pub y0: VariableScalar,
    pub radius0: VariableScalar,
    pub x1: VariableScalar,
    pub y1: VariableScalar,
    pub radius1: VariableScalar,
}

impl RadialGradientFill {
    /// Gradient with constant geometry; circles are `(x, y, radius)`.
    pub fn new(axes: &[Tag], stops: Vec<GradientStop>, start: (f64, f64, f64), end: (f64, f64, f64)) -> Self {
        let scalar = |v: f64| VariableScalar::with_default(axes.to_vec(), v);
        Self {
            stops,
            x0: scalar(start.0),
            y0: scalar(start.1),
            radius0: scalar(start.2),
            x1: scalar(end.0),
            y1: scalar(end.1),
            radius1: scalar(end.2),
        }
    }

    fn geometry(&self) -> [&VariableScalar; 6] {
        [&self.x0, &self.y0, &self.radius0, &self.x1, &self.y1, &self.radius1]
    }

    pub fn does_vary(&self) -> bool {
        self.geometry().iter().any(|v| v.does_vary()) || stops_vary(&self.stops)
    }

    pub fn to_paint(&self, ctx: &mut CompileContext) -> Result<Paint> {
        if !self.does_vary() {
            return Ok(Paint::RadialGradient {
                color_line: color_line(&self.stops, ctx)?,
                x0: fword(&self.x0, ctx),
                y0: fword(&self.y0, ctx),
                radius0: ufword(&self.radius0, ctx),
                x1: fword(&self.x1, ctx),
                y1: fword(&self.y1, ctx),
                radius1: ufword(&self.radius1, ctx),
            });
        }
        let color_line = var_color_line(&self.stops, ctx)?;
        let var_index_base = ctx.next_var_index();
        for value in self.geometry() {
            ctx.push_scalar(value, std::convert::identity);
        }
        debug!("Variable radial gradient at delta-set entry {var_index_base}");
        Ok(Paint::VarRadialGradient {
            color_line,
            x0: fword(&self.x0, ctx),
            y0: fword(&self.y0, ctx),
            radius0: ufword(&self.radius0, ctx),
            x1: fword(&self.x1, ctx),
            y1: fword(&self.y1, ctx),
            radius1: ufword(&self.radius1, ctx),
            var_index_base,
        })
    }
}

/// What a layer is painted with.
#[derive(Debug, Clone)]
pub enum Fill {
    Solid(SolidFill),
    LinearGradient(LinearGradientFill),
    RadialGradient(RadialGradientFill),
}

impl Fill {
    pub fn does_vary(&self) -> bool {
        match self {
            Self::Solid(fill) => fill.does_vary(),
            Self::LinearGradient(fill) => fill.does_vary(),
            Self::RadialGradient(fill) => fill.does_vary(),
        }
    }

    /// Produce the fill's paint record, registering colors in the palette
    /// and any varying fields in the variation store.
    pub fn to_paint(&self, ctx: &mut CompileContext) -> Result<Paint> {
        match self {
            Self::Solid(fill) => fill.to_paint(ctx),
            Self::LinearGradient(fill) => fill.to_paint(ctx),
            Self::RadialGradient(fill) => fill.to_paint(ctx),
        }
    }
}

impl From<SolidFill> for Fill {
    fn from(fill: SolidFill) -> Self {
        Self::Solid(fill)
    }
}

impl From<LinearGradientFill> for Fill {
    fn from(fill: LinearGradientFill) -> Self {
        Self::LinearGradient(fill)
    }
}

impl From<RadialGradientFill> for Fill {
    fn from(fill: RadialGradientFill) -> Self {
        Self::RadialGradient(fill)
    }
}

impl fmt::Display for Fill {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Solid(fill) => write!(f, "SolidFill({}, {})", fill.color, fill.opacity.default_value()),
            Self::LinearGradient(fill) => write!(f, "LinearGradient({} stops)", fill.stops.len()),
            Self::RadialGradient(fill) => write!(f, "RadialGradient({} stops)", fill.stops.len()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
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

    fn stops() -> Vec<GradientStop> {
        vec![
            GradientStop::new(&[WGHT], "#ff0000", 0.0, 1.0),
            GradientStop::new(&[WGHT], "#0000ff", 1.0, 1.0),
        ]
    }

    #[test]
    fn static_solid() {
        let mut ctx = context();
        let paint = SolidFill::new(&[WGHT], "#123456", 0.5).to_paint(&mut ctx).unwrap();

        assert_eq!(
            paint,
            Paint::Solid {
                palette_index: 0,
                alpha: F2Dot14::from_f32(0.5),
            }
        );
        assert!(ctx.delta_sets.is_empty());
    }

    #[test]
    fn variable_solid() {
        let mut ctx = context();
        let mut fill = SolidFill::new(&[WGHT], "#123456", 1.0);
        fill.opacity.add_value(&bold(), 0.25);
        let paint = fill.to_paint(&mut ctx).unwrap();

        assert_eq!(
            paint,
            Paint::VarSolid {
                palette_index: 0,
                alpha: F2Dot14::from_f32(1.0),
                var_index_base: 0,
            }
        );
        assert_eq!(ctx.delta_sets.len(), 1);
        let store = ctx.builder.finish(true);
        assert_eq!(store.item(ctx.delta_sets.entries[0]), Some(&[-12288][..]));
    }

    #[test]
    fn static_linear_gradient_shares_palette() {
        let mut ctx = context();
        let fill = LinearGradientFill::new(&[WGHT], stops(), [(0.0, 0.0), (100.4, 0.0), (0.0, 100.0)]);
        let Paint::LinearGradient { color_line, x1, .. } = fill.to_paint(&mut ctx).unwrap() else {
            panic!("expected a static linear gradient");
        };

        assert_eq!(x1, 100);
        assert_eq!(color_line.color_stops.len(), 2);
        assert_eq!(color_line.color_stops[1].palette_index, 1);
        assert_eq!(ctx.palette.len(), 2);
    }

    #[test]
    fn variable_stop_opacity_makes_gradient_variable() {
        let mut ctx = context();
        let mut stops = stops();
        stops[1].opacity.add_value(&bold(), 0.0);
        let fill = RadialGradientFill::new(&[WGHT], stops, (0.0, 0.0, 0.0), (10.0, 10.0, 50.0));

        let Paint::VarRadialGradient {
            color_line,
            radius1,
            var_index_base,
            ..
        } = fill.to_paint(&mut ctx).unwrap()
        else {
            panic!("expected a variable radial gradient");
        };

        assert_eq!(radius1, 50);
        assert_eq!(color_line.color_stops[0].var_index_base, 0);
        assert_eq!(color_line.color_stops[1].var_index_base, 2);
        assert_eq!(var_index_base, 4);
        // two entries per stop, then six geometry entries
        assert_eq!(ctx.delta_sets.len(), 10);
        let entries = &ctx.delta_sets.entries;
        assert_eq!(entries[0], NO_VARIATION_INDEX);
        assert_eq!(entries[1], NO_VARIATION_INDEX);
        assert_eq!(entries[2], NO_VARIATION_INDEX);
        assert_ne!(entries[3], NO_VARIATION_INDEX);
        assert!(entries[4..].iter().all(|e| *e == NO_VARIATION_INDEX));
    }

    #[test]
    fn variable_geometry() {
        let mut ctx = context();
        let mut fill = LinearGradientFill::new(&[WGHT], stops(), [(0.0, 0.0), (100.0, 0.0), (0.0, 100.0)]);
        fill.x1.add_value(&bold(), 300.0);

        let Paint::VarLinearGradient { var_index_base, x1, .. } = fill.to_paint(&mut ctx).unwrap() else {
            panic!("expected a variable linear gradient");
        };
        assert_eq!(x1, 100);
        assert_eq!(var_index_base, 4);

        let x1_entry = ctx.delta_sets.entries[var_index_base as usize + 2];
        let store = ctx.builder.finish(true);
        assert_eq!(store.item(x1_entry), Some(&[200][..]));
    }

    #[test]
    fn fill_clone_is_deep() {
        let fill = Fill::from(SolidFill::black(&[WGHT]));
        let mut copy = fill.clone();
        if let Fill::Solid(solid) = &mut copy {
            solid.opacity.add_value(&bold(), 0.0);
        }

        assert!(!fill.does_vary());
        assert!(copy.does_vary());
        assert_eq!(fill.to_string(), "SolidFill(#000000, 1)");
    }
}
