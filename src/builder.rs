//! Fluent interface for constructing [`ProgressBar`] instances.
//!
//! [`ProgressBar::new`] covers the common case: a background-refreshed bar on standard
//! error with the default look. The [`BarBuilder`] is for everything else, such as a
//! custom [`Sink`], synchronous refreshing, or a style copied from another bar.

use std::io::Stderr;

use crate::{
    counter::Counter,
    error::BarError,
    progress::ProgressBar,
    refresh::RefreshMode,
    sink::{Sink, StreamSink},
    style::{Fields, Style, StyleOptions},
};

/// A builder for [`ProgressBar`].
///
/// # Examples
///
/// ```
/// use stepbar::{BarBuilder, Fields, MemorySink, RefreshMode};
///
/// let bar = BarBuilder::new(100)
///     .step(10)
///     .fields(Fields::BAR | Fields::PERCENTAGE)
///     .sink(MemorySink::piped())
///     .mode(RefreshMode::Synchronous)
///     .build()?;
///
/// assert_eq!(bar.step(), 10);
/// # Ok::<(), stepbar::BarError>(())
/// ```
#[derive(Debug)]
pub struct BarBuilder<S = StreamSink<Stderr>> {
    total: u64,
    step: u64,
    style: Style,
    options: StyleOptions,
    mode: RefreshMode,
    sink: S,
}

impl BarBuilder {
    /// Starts building a bar over `total` tasks, drawing to standard error.
    ///
    /// A zero total is accepted here and rejected by the bar's first update.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self {
            total,
            step: 1,
            style: Style::default(),
            options: StyleOptions::default(),
            mode: RefreshMode::default(),
            sink: StreamSink::stderr(),
        }
    }
}

impl<S: Sink> BarBuilder<S> {
    /// Sets how many tasks each plain update completes.
    #[must_use]
    pub const fn step(mut self, step: u64) -> Self {
        self.step = step;
        self
    }

    /// Selects the rendered fields.
    #[must_use]
    pub const fn fields(mut self, fields: Fields) -> Self {
        self.style.fields = fields;
        self
    }

    /// Sets the number of cells in the bar.
    #[must_use]
    pub const fn bar_width(mut self, width: usize) -> Self {
        self.style.bar_width = width;
        self
    }

    /// Replaces the whole style, e.g. with [`ProgressBar::style`] of another bar.
    #[must_use]
    pub fn with_style(mut self, style: Style) -> Self {
        self.style = style;
        self
    }

    /// Merges an options bundle over the style when the bar is built. Its `total` and
    /// `step`, when set, override the builder's.
    #[must_use]
    pub fn options(mut self, options: StyleOptions) -> Self {
        self.options = options;
        self
    }

    /// Chooses the refresh strategy.
    #[must_use]
    pub const fn mode(mut self, mode: RefreshMode) -> Self {
        self.mode = mode;
        self
    }

    /// Directs output to `sink` instead.
    #[must_use]
    pub fn sink<T: Sink>(self, sink: T) -> BarBuilder<T> {
        BarBuilder {
            total: self.total,
            step: self.step,
            style: self.style,
            options: self.options,
            mode: self.mode,
            sink,
        }
    }

    /// Consumes the builder and returns the bar.
    ///
    /// # Errors
    ///
    /// Returns [`BarError::InvalidConfig`] for a zero step, or a zero total set through
    /// [`options`](Self::options).
    pub fn build(self) -> Result<ProgressBar<S>, BarError> {
        if self.options.total == Some(0) {
            return Err(BarError::zero_total());
        }
        let total = self.options.total.unwrap_or(self.total);
        let step = self.options.step.unwrap_or(self.step);
        if step == 0 {
            return Err(BarError::zero_step());
        }

        let mut style = self.style;
        style.apply(&self.options);

        Ok(ProgressBar::from_parts(
            Counter::new(total, step),
            style,
            self.sink,
            self.mode,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::BarBuilder;
    use crate::{BarError, Fields, MemorySink, ProgressBar, RefreshMode, StyleOptions};

    /// Option Precedence
    /// Bundle values override builder values and style defaults.
    #[test]
    fn test_options_override() {
        let bar = BarBuilder::new(10)
            .step(2)
            .bar_width(12)
            .options(StyleOptions {
                total: Some(40),
                done_glyph: Some("#".into()),
                ..StyleOptions::default()
            })
            .sink(MemorySink::piped())
            .mode(RefreshMode::Synchronous)
            .build()
            .unwrap();

        assert_eq!(bar.total(), 40);
        assert_eq!(bar.step(), 2);
        assert_eq!(bar.style().bar_width(), 12);
        assert_eq!(bar.style().done_glyph(), "#");
    }

    /// Validation
    /// A zero step never makes it into a bar.
    #[test]
    fn test_rejects_zero_step() {
        let result = BarBuilder::new(10)
            .step(0)
            .sink(MemorySink::piped())
            .build();
        assert!(matches!(result, Err(BarError::InvalidConfig { .. })));
    }

    /// Style Copy
    /// A bar's style can seed another bar.
    #[test]
    fn test_style_copy() {
        let mut first = ProgressBar::with_sink(5, MemorySink::piped());
        first.set_fields(Fields::BAR).set_done_glyph("=");

        let second = ProgressBar::builder(8)
            .with_style(first.style())
            .sink(MemorySink::piped())
            .build()
            .unwrap();
        assert_eq!(second.style(), first.style());
        assert_eq!(second.total(), 8);
    }
}
