//! The bar controller.
//!
//! [`ProgressBar`] wires the [`Counter`], the [`Style`] and a refresh driver together.
//! Its state is split the same way the refresh worker reads it:
//!
//! * **Hot data:** the counter and the "has rendered" flag live in atomics, so the caller
//!   can advance the bar while the worker reads it, without locking.
//! * **Cold data:** the style sits behind an [`RwLock`] that is only written before the
//!   bar starts. Render bookkeeping and the sink sit behind one [`Mutex`], held for the
//!   duration of a single frame so frames never interleave.
//!
//! # Lifecycle
//!
//! A bar is *not started* until the first [`update`](ProgressBar::update), *running*
//! until its counter reaches the total, and *finished* afterwards. Only
//! [`reset`](ProgressBar::reset) leaves the finished state. Configuration setters are
//! ignored once the bar has started.

use std::{
    io::Stderr,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use compact_str::CompactString;
use parking_lot::{Mutex, RwLock};
use web_time::Instant;

use crate::{
    counter::Counter,
    error::BarError,
    format,
    line::{self, Readings},
    refresh::{RefreshMode, Refresher, Task},
    sink::{Sink, StreamSink},
    style::{Fields, Style, StyleOptions},
};

/// Smallest change of the completed fraction that repaints the bar segment.
const REPAINT_THRESHOLD: f64 = 0.01;

/// A single-line terminal progress bar.
///
/// Rendering goes to a [`Sink`]; when the sink is not an interactive terminal nothing is
/// written at all, but the bar still counts and changes state.
///
/// # Examples
///
/// ```
/// use stepbar::{MemorySink, ProgressBar, RefreshMode};
///
/// let sink = MemorySink::terminal();
/// let mut bar = ProgressBar::builder(3)
///     .sink(sink.clone())
///     .mode(RefreshMode::Synchronous)
///     .build()?;
///
/// for _ in 0..3 {
///     bar.update()?;
/// }
/// assert!(bar.is_finished());
/// assert!(sink.contents().ends_with('\n'));
/// # Ok::<(), stepbar::BarError>(())
/// ```
pub struct ProgressBar<S: Sink = StreamSink<Stderr>> {
    shared: Arc<Shared<S>>,
    refresher: Refresher,
}

/// State shared between the controller and the render routine.
pub(crate) struct Shared<S> {
    counter: Counter,
    started: AtomicBool,
    style: RwLock<Style>,
    canvas: Mutex<Canvas<S>>,
    tty: bool,
}

/// Everything a frame touches while it is being drawn.
struct Canvas<S> {
    sink: S,
    state: RenderState,
}

/// Bookkeeping for one run, from the first frame to the final one.
#[derive(Debug)]
struct RenderState {
    /// A line is on screen and the next frame has to erase it.
    drawn: bool,
    /// The final line was printed.
    done: bool,
    /// Fraction shown the last time the bar segment was painted.
    last_bar_progress: f64,
    /// Smoothed per-step interval for the rate field.
    rate_interval: Duration,
    first_invoked: Instant,
}

impl Default for RenderState {
    fn default() -> Self {
        Self {
            drawn: false,
            done: false,
            last_bar_progress: 0.0,
            rate_interval: Duration::ZERO,
            first_invoked: Instant::now(),
        }
    }
}

impl<S: Sink> Canvas<S> {
    fn emit(&mut self, frame: &line::Frame, newline: bool) {
        let output = frame.output(newline);
        if let Err(err) = self.sink.write_str(&output).and_then(|()| self.sink.flush()) {
            tracing::debug!(%err, "dropping progress frame");
        }
        self.state.drawn = true;
    }
}

impl<S: Sink> Shared<S> {
    /// The render routine. Runs on whichever thread the refresh driver uses.
    fn draw(&self) {
        let mut canvas = self.canvas.lock();
        let style = self.style.read();
        let total = self.counter.total();

        if !self.started.load(Ordering::Acquire) {
            canvas.state = RenderState::default();
            if self.tty {
                let frame = line::compose(&style, style.fields, &Readings::pending(total), false);
                canvas.emit(&frame, false);
            }
            self.started.store(true, Ordering::Release);
        }

        if canvas.state.done {
            return;
        }

        let done = self.counter.current();
        let mut readings = Readings::pending(total);
        if self.tty {
            let elapsed = canvas.state.first_invoked.elapsed();
            let interval = per_step(elapsed, done);
            canvas.state.rate_interval = format::smooth(canvas.state.rate_interval, interval);
            readings = Readings {
                done,
                total,
                interval: Some(interval),
                rate_interval: Some(canvas.state.rate_interval),
            };

            let fraction = readings.fraction();
            let mut fields = style.fields;
            if fraction - canvas.state.last_bar_progress < REPAINT_THRESHOLD {
                fields.remove(Fields::BAR);
            } else {
                canvas.state.last_bar_progress = fraction;
            }

            let repaint = canvas.state.drawn;
            canvas.emit(&line::compose(&style, fields, &readings, repaint), false);
        }

        if self.counter.is_finished() {
            if self.tty {
                readings.done = total;
                let repaint = canvas.state.drawn;
                canvas.emit(&line::compose(&style, style.fields, &readings, repaint), true);
            }
            canvas.state.done = true;
            tracing::debug!(total, "progress bar finished");
        }
    }
}

/// Mean time per completed step; the whole elapsed time before the first step.
fn per_step(elapsed: Duration, done: u64) -> Duration {
    let nanos = elapsed.as_nanos() / u128::from(done.max(1));
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

impl ProgressBar<StreamSink<Stderr>> {
    /// Creates a bar over `total` tasks with step 1, drawing to standard error from a
    /// background worker.
    #[must_use]
    pub fn new(total: u64) -> Self {
        Self::with_sink(total, StreamSink::stderr())
    }

    /// Starts a [`BarBuilder`](crate::BarBuilder) for a bar over `total` tasks.
    #[must_use]
    pub fn builder(total: u64) -> crate::BarBuilder {
        crate::BarBuilder::new(total)
    }
}

impl<S: Sink> ProgressBar<S> {
    /// Creates a bar over `total` tasks with step 1, drawing to `sink` from a background
    /// worker.
    #[must_use]
    pub fn with_sink(total: u64, sink: S) -> Self {
        Self::from_parts(Counter::new(total, 1), Style::default(), sink, RefreshMode::default())
    }

    pub(crate) fn from_parts(counter: Counter, style: Style, sink: S, mode: RefreshMode) -> Self {
        let tty = sink.is_terminal();
        let shared = Arc::new(Shared {
            counter,
            started: AtomicBool::new(false),
            style: RwLock::new(style),
            canvas: Mutex::new(Canvas {
                sink,
                state: RenderState::default(),
            }),
            tty,
        });

        let routine = Arc::clone(&shared);
        let task: Task = Arc::new(move || routine.draw());

        Self {
            shared,
            refresher: Refresher::new(mode, task),
        }
    }

    // ========================================================================
    // Updates
    // ========================================================================

    /// Advances the bar by its step.
    ///
    /// # Errors
    ///
    /// * [`BarError::InvalidState`] if the bar is already finished.
    /// * [`BarError::InvalidConfig`] if the total number of tasks is zero.
    pub fn update(&mut self) -> Result<(), BarError> {
        let step = self.shared.counter.step();
        self.advance(step)
    }

    /// Advances the bar by `amount`, ignoring the configured step. Anything beyond the
    /// total is dropped.
    ///
    /// # Errors
    ///
    /// Same as [`update`](Self::update).
    pub fn update_by(&mut self, amount: u64) -> Result<(), BarError> {
        self.advance(amount)
    }

    fn advance(&mut self, amount: u64) -> Result<(), BarError> {
        if self.is_finished() {
            return Err(BarError::already_finished());
        }
        if self.shared.counter.total() == 0 {
            return Err(BarError::zero_total());
        }

        if !self.is_started() {
            self.refresher.activate();
        }
        self.shared.counter.advance(amount);
        self.refresher.render();

        if self.shared.counter.is_finished() {
            self.refresher.suspend();
        }
        Ok(())
    }

    /// Re-arms the bar: position back to zero, render state cleared, total and step kept.
    ///
    /// Does nothing on a bar that never started.
    pub fn reset(&mut self) -> &mut Self {
        if !self.is_started() {
            return self;
        }
        self.refresher.suspend();

        let mut canvas = self.shared.canvas.lock();
        self.shared.counter.rewind();
        canvas.state = RenderState::default();
        self.shared.started.store(false, Ordering::Release);
        drop(canvas);

        tracing::debug!("progress bar reset");
        self
    }

    // ========================================================================
    // State
    // ========================================================================

    /// Returns `true` once the first frame has been rendered.
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.shared.started.load(Ordering::Acquire)
    }

    /// Returns `true` once the bar has started and reached its total.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.is_started() && self.shared.counter.is_finished()
    }

    /// Returns the number of tasks done.
    #[must_use]
    pub fn position(&self) -> u64 {
        self.shared.counter.current()
    }

    /// Returns the total number of tasks.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.shared.counter.total()
    }

    /// Returns the step applied by [`update`](Self::update).
    #[must_use]
    pub fn step(&self) -> u64 {
        self.shared.counter.step()
    }

    /// Returns a copy of the current style, e.g. to configure another bar the same way.
    #[must_use]
    pub fn style(&self) -> Style {
        self.shared.style.read().clone()
    }

    /// Captures the counter and lifecycle state.
    #[must_use]
    pub fn snapshot(&self) -> BarSnapshot {
        BarSnapshot {
            position: self.position(),
            total: self.total(),
            step: self.step(),
            started: self.is_started(),
            finished: self.is_finished(),
        }
    }

    // ========================================================================
    // Configuration (ignored once started)
    // ========================================================================

    /// Sets the total number of tasks.
    ///
    /// # Errors
    ///
    /// Returns [`BarError::InvalidConfig`] if `total` is zero and the bar has not started.
    pub fn set_total(&mut self, total: u64) -> Result<&mut Self, BarError> {
        if !self.is_started() {
            self.shared.counter.set_total(total)?;
        }
        Ok(self)
    }

    /// Sets how many tasks each [`update`](Self::update) completes.
    ///
    /// # Errors
    ///
    /// Returns [`BarError::InvalidConfig`] if `step` is zero and the bar has not started.
    pub fn set_step(&mut self, step: u64) -> Result<&mut Self, BarError> {
        if !self.is_started() {
            self.shared.counter.set_step(step)?;
        }
        Ok(self)
    }

    /// Merges every set option over the current configuration.
    ///
    /// # Errors
    ///
    /// Returns [`BarError::InvalidConfig`] if the options set a zero total or step; in
    /// that case nothing is applied.
    pub fn apply(&mut self, options: &StyleOptions) -> Result<&mut Self, BarError> {
        if self.is_started() {
            return Ok(self);
        }
        if options.total == Some(0) {
            return Err(BarError::zero_total());
        }
        if options.step == Some(0) {
            return Err(BarError::zero_step());
        }

        if let Some(total) = options.total {
            self.shared.counter.set_total(total)?;
        }
        if let Some(step) = options.step {
            self.shared.counter.set_step(step)?;
        }
        self.shared.style.write().apply(options);
        Ok(self)
    }

    fn configure(&mut self, edit: impl FnOnce(&mut Style)) -> &mut Self {
        if !self.is_started() {
            edit(&mut *self.shared.style.write());
        }
        self
    }

    /// Selects which fields are rendered.
    pub fn set_fields(&mut self, fields: Fields) -> &mut Self {
        self.configure(|style| style.fields = fields)
    }

    /// Sets the number of cells in the bar.
    pub fn set_bar_width(&mut self, width: usize) -> &mut Self {
        self.configure(|style| style.bar_width = width)
    }

    /// Sets the glyph for completed cells.
    pub fn set_done_glyph(&mut self, glyph: impl Into<CompactString>) -> &mut Self {
        let glyph = glyph.into();
        self.configure(|style| style.done_glyph = glyph)
    }

    /// Sets the glyph for remaining cells.
    pub fn set_todo_glyph(&mut self, glyph: impl Into<CompactString>) -> &mut Self {
        let glyph = glyph.into();
        self.configure(|style| style.todo_glyph = glyph)
    }

    /// Sets the opening bracket of the bar.
    pub fn set_bar_start(&mut self, start: impl Into<CompactString>) -> &mut Self {
        let start = start.into();
        self.configure(|style| style.bar_start = start)
    }

    /// Sets the closing bracket of the bar.
    pub fn set_bar_end(&mut self, end: impl Into<CompactString>) -> &mut Self {
        let end = end.into();
        self.configure(|style| style.bar_end = end)
    }

    /// Sets the opening bracket of the status segment.
    pub fn set_status_left(&mut self, left: impl Into<CompactString>) -> &mut Self {
        let left = left.into();
        self.configure(|style| style.status_left = left)
    }

    /// Sets the closing bracket of the status segment.
    pub fn set_status_right(&mut self, right: impl Into<CompactString>) -> &mut Self {
        let right = right.into();
        self.configure(|style| style.status_right = right)
    }

    /// Sets the color token of completed cells.
    pub fn set_done_color(&mut self, color: impl Into<CompactString>) -> &mut Self {
        let color = color.into();
        self.configure(|style| style.done_color = color)
    }

    /// Sets the color token of remaining cells.
    pub fn set_todo_color(&mut self, color: impl Into<CompactString>) -> &mut Self {
        let color = color.into();
        self.configure(|style| style.todo_color = color)
    }

    /// Sets the color token of the status segment.
    pub fn set_status_color(&mut self, color: impl Into<CompactString>) -> &mut Self {
        let color = color.into();
        self.configure(|style| style.status_color = color)
    }
}

/// A plain-data view of a bar's counter and lifecycle.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BarSnapshot {
    position: u64,
    total: u64,
    step: u64,
    started: bool,
    finished: bool,
}

impl BarSnapshot {
    /// Returns the number of tasks done.
    #[must_use]
    pub const fn position(&self) -> u64 {
        self.position
    }

    /// Returns the total number of tasks.
    #[must_use]
    pub const fn total(&self) -> u64 {
        self.total
    }

    /// Returns the configured step.
    #[must_use]
    pub const fn step(&self) -> u64 {
        self.step
    }

    /// Returns whether the bar has rendered its first frame.
    #[must_use]
    pub const fn started(&self) -> bool {
        self.started
    }

    /// Returns whether the bar has finished.
    #[must_use]
    pub const fn finished(&self) -> bool {
        self.finished
    }

    /// Returns the completed fraction in `[0, 1]`, or zero for an empty total.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.position as f64 / self.total as f64
        }
    }
}
