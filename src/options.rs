//! Options for the extraction pipeline.

/// Default per-line length limit for pattern attempts.
pub const DEFAULT_MAX_LINE_CHARS: usize = 512;

/// Options for controlling extraction behavior.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractOptions {
    /// Whether to apply NFC and fullwidth glyph normalization.
    pub normalize_glyphs: bool,

    /// Whether to pair label rows with value rows.
    pub table_structure: bool,

    /// Whether to run the fallback label/value patterns.
    pub fallback_patterns: bool,

    /// Lines longer than this (in characters) fail every pattern attempt.
    pub max_line_chars: usize,

    /// Whether batch extraction may process inputs in parallel.
    pub parallel: bool,
}

impl Default for ExtractOptions {
    fn default() -> Self {
        Self {
            normalize_glyphs: true,
            table_structure: true,
            fallback_patterns: true,
            max_line_chars: DEFAULT_MAX_LINE_CHARS,
            parallel: true,
        }
    }
}

impl ExtractOptions {
    /// Creates new options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Extracts only the stat table and the combat time.
    pub fn table_only() -> Self {
        Self::default().without_patterns()
    }

    /// Disables glyph normalization.
    pub fn without_glyph_normalization(mut self) -> Self {
        self.normalize_glyphs = false;
        self
    }

    /// Disables label row / value row pairing.
    pub fn without_table(mut self) -> Self {
        self.table_structure = false;
        self
    }

    /// Disables the fallback patterns.
    pub fn without_patterns(mut self) -> Self {
        self.fallback_patterns = false;
        self
    }

    /// Sets the per-line length limit for pattern attempts.
    pub fn with_max_line_chars(mut self, limit: usize) -> Self {
        self.max_line_chars = limit;
        self
    }

    /// Disables parallel batch processing.
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }
}
