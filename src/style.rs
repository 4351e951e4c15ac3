//! Visual configuration of a bar.
//!
//! [`Style`] holds everything that decides how a line looks: which [`Fields`] are shown,
//! the glyphs and brackets of the bar, and the opaque color tokens wrapped around each
//! segment. Color tokens are written verbatim; they are usually ANSI escape sequences
//! but any string (including an empty one) works.
//!
//! [`StyleOptions`] is the aggregate form: every field is optional and merging it over
//! an existing configuration only touches the fields that are set.

use bitflags::bitflags;
use compact_str::CompactString;

/// ANSI tokens used by the default style.
pub mod ansi {
    /// Bold font, used to frame the status segment.
    pub const BOLD: &str = "\x1b[1m";
    /// Cyan foreground, the default status color.
    pub const CYAN: &str = "\x1b[36m";
    /// Resets color and font.
    pub const RESET: &str = "\x1b[0m";
}

/// Separator placed between two adjacent status fields.
pub const DIVIDER: &str = " | ";

bitflags! {
    /// The set of fields rendered on the line, in display order.
    #[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
    #[cfg_attr(
        feature = "serde",
        derive(serde::Serialize, serde::Deserialize),
        serde(transparent)
    )]
    pub struct Fields: u8 {
        /// The bar itself.
        const BAR = 1 << 0;
        /// Completion percentage, e.g. ` 42.00%`.
        const PERCENTAGE = 1 << 1;
        /// Task counter, e.g. ` 42/100`.
        const COUNTER = 1 << 2;
        /// Update rate, e.g. `12.50 Hz`.
        const RATE = 1 << 3;
        /// Elapsed and remaining time, e.g. `45s < 1.5m`.
        const COUNTDOWN = 1 << 4;
    }
}

impl Default for Fields {
    fn default() -> Self {
        Self::all()
    }
}

impl Fields {
    /// The fields drawn inside the status wrapper.
    pub const STATUS: Self = Self::PERCENTAGE
        .union(Self::COUNTER)
        .union(Self::RATE)
        .union(Self::COUNTDOWN);
}

/// Complete visual configuration of a bar.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Style {
    pub(crate) fields: Fields,
    pub(crate) done_glyph: CompactString,
    pub(crate) todo_glyph: CompactString,
    pub(crate) done_color: CompactString,
    pub(crate) todo_color: CompactString,
    pub(crate) status_color: CompactString,
    pub(crate) bar_start: CompactString,
    pub(crate) bar_end: CompactString,
    pub(crate) status_left: CompactString,
    pub(crate) status_right: CompactString,
    pub(crate) status_font: CompactString,
    pub(crate) reset: CompactString,
    pub(crate) bar_width: usize,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            fields: Fields::all(),
            done_glyph: CompactString::const_new("-"),
            todo_glyph: CompactString::const_new(" "),
            done_color: CompactString::default(),
            todo_color: CompactString::default(),
            status_color: CompactString::const_new(ansi::CYAN),
            bar_start: CompactString::const_new("["),
            bar_end: CompactString::const_new("]"),
            status_left: CompactString::const_new("[ "),
            status_right: CompactString::const_new(" ]"),
            status_font: CompactString::const_new(ansi::BOLD),
            reset: CompactString::const_new(ansi::RESET),
            bar_width: 30,
        }
    }
}

impl Style {
    /// A style with every color and font token emptied, for sinks that show raw text.
    #[must_use]
    pub fn plain() -> Self {
        Self {
            status_color: CompactString::default(),
            status_font: CompactString::default(),
            reset: CompactString::default(),
            ..Self::default()
        }
    }

    /// Returns the enabled fields.
    #[must_use]
    pub const fn fields(&self) -> Fields {
        self.fields
    }

    /// Returns the number of cells in the bar, brackets excluded.
    #[must_use]
    pub const fn bar_width(&self) -> usize {
        self.bar_width
    }

    /// Returns the glyph repeated over the completed part of the bar.
    #[must_use]
    pub fn done_glyph(&self) -> &str {
        &self.done_glyph
    }

    /// Returns the glyph repeated over the remaining part of the bar.
    #[must_use]
    pub fn todo_glyph(&self) -> &str {
        &self.todo_glyph
    }

    /// Merges every set field of `options` over this style.
    ///
    /// `total` and `step` are counter settings and are ignored here.
    pub fn apply(&mut self, options: &StyleOptions) {
        fn merge(slot: &mut CompactString, value: Option<&CompactString>) {
            if let Some(value) = value {
                slot.clone_from(value);
            }
        }

        if let Some(fields) = options.fields {
            self.fields = fields;
        }
        if let Some(width) = options.bar_width {
            self.bar_width = width;
        }
        merge(&mut self.done_glyph, options.done_glyph.as_ref());
        merge(&mut self.todo_glyph, options.todo_glyph.as_ref());
        merge(&mut self.done_color, options.done_color.as_ref());
        merge(&mut self.todo_color, options.todo_color.as_ref());
        merge(&mut self.status_color, options.status_color.as_ref());
        merge(&mut self.bar_start, options.bar_start.as_ref());
        merge(&mut self.bar_end, options.bar_end.as_ref());
        merge(&mut self.status_left, options.status_left.as_ref());
        merge(&mut self.status_right, options.status_right.as_ref());
    }
}

/// An all-optional configuration bundle. Unset fields keep the current value.
///
/// With the `serde` feature enabled this can be deserialized from any serde format;
/// absent keys are left unset.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default, deny_unknown_fields)
)]
pub struct StyleOptions {
    /// Total number of tasks.
    pub total: Option<u64>,
    /// Tasks completed by each plain `update()`.
    pub step: Option<u64>,
    /// Which fields to render.
    pub fields: Option<Fields>,
    /// Glyph for completed bar cells.
    pub done_glyph: Option<CompactString>,
    /// Glyph for remaining bar cells.
    pub todo_glyph: Option<CompactString>,
    /// Color token for completed bar cells.
    pub done_color: Option<CompactString>,
    /// Color token for remaining bar cells.
    pub todo_color: Option<CompactString>,
    /// Color token for the status segment.
    pub status_color: Option<CompactString>,
    /// Opening bracket of the bar.
    pub bar_start: Option<CompactString>,
    /// Closing bracket of the bar.
    pub bar_end: Option<CompactString>,
    /// Opening bracket of the status segment.
    pub status_left: Option<CompactString>,
    /// Closing bracket of the status segment.
    pub status_right: Option<CompactString>,
    /// Number of cells in the bar.
    pub bar_width: Option<usize>,
}
