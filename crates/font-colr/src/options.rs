//! Options for COLR compilation

/// Options for COLR compilation
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Reorder variation data columns by byte width when finishing the store
    pub optimize_var_store: bool,

    /// Number of glyphs in the font; references at or past it are skipped
    pub glyph_count: Option<u16>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            optimize_var_store: true,
            glyph_count: None,
        }
    }
}

impl CompileOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn optimize_var_store(mut self, optimize: bool) -> Self {
        self.optimize_var_store = optimize;
        self
    }

    pub fn glyph_count(mut self, count: u16) -> Self {
        self.glyph_count = Some(count);
        self
    }

    /// Check if a glyph ID exists in the font
    pub fn has_glyph(&self, glyph: u16) -> bool {
        self.glyph_count.is_none_or(|count| glyph < count)
    }
}
