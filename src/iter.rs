//! Iterator adapters that drive a bar.
//!
//! [`ProgressIteratorExt`] attaches a [`ProgressBar`] to any [`Iterator`]: every yielded
//! item completes one task. When no bar is supplied, one is created on standard error
//! with its total taken from [`Iterator::size_hint`].
//!
//! # Example
//!
//! ```no_run
//! use stepbar::ProgressIteratorExt;
//!
//! for item in (0..500).progress() {
//!     // ...
//! #   let _ = item;
//! }
//! ```

use std::io::Stderr;

use crate::{
    progress::ProgressBar,
    sink::{Sink, StreamSink},
};

/// An iterator adapter that updates a bar once per yielded item.
pub struct ProgressIter<I, S: Sink> {
    iter: I,
    bar: ProgressBar<S>,
}

impl<I, S: Sink> ProgressIter<I, S> {
    /// Creates a new `ProgressIter`.
    ///
    /// Note: This is usually constructed via [`ProgressIteratorExt`] methods.
    pub const fn new(iter: I, bar: ProgressBar<S>) -> Self {
        Self { iter, bar }
    }

    /// Returns the bar being driven.
    pub const fn bar(&self) -> &ProgressBar<S> {
        &self.bar
    }

    /// Stops iterating and hands back the bar.
    pub fn into_bar(self) -> ProgressBar<S> {
        self.bar
    }
}

impl<I: Iterator, S: Sink> Iterator for ProgressIter<I, S> {
    type Item = I::Item;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.iter.next()?;
        // More items than tasks, or an unknown total: keep yielding, stop counting.
        if let Err(err) = self.bar.update() {
            tracing::trace!(%err, "progress iterator outran its bar");
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.iter.size_hint()
    }
}

/// Extension trait to attach a progress bar to any iterator.
pub trait ProgressIteratorExt: Sized {
    /// Wraps the iterator in a new standard-error bar sized from `size_hint`.
    fn progress(self) -> ProgressIter<Self, StreamSink<Stderr>>;

    /// Wraps the iterator using an existing bar.
    fn progress_with<S: Sink>(self, bar: ProgressBar<S>) -> ProgressIter<Self, S>;

    /// Total inferred from `size_hint`: the exact length when known, else zero.
    fn total_from_size_hint(&self) -> u64;
}

impl<I: Iterator> ProgressIteratorExt for I {
    fn progress(self) -> ProgressIter<Self, StreamSink<Stderr>> {
        let bar = ProgressBar::new(self.total_from_size_hint());
        ProgressIter::new(self, bar)
    }

    fn progress_with<S: Sink>(self, bar: ProgressBar<S>) -> ProgressIter<Self, S> {
        ProgressIter::new(self, bar)
    }

    fn total_from_size_hint(&self) -> u64 {
        match self.size_hint() {
            (lower, Some(upper)) if lower == upper => lower as u64,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::ProgressIteratorExt as _;
    use crate::{MemorySink, ProgressBar, RefreshMode};

    fn bar(total: u64, sink: &MemorySink) -> ProgressBar<MemorySink> {
        ProgressBar::builder(total)
            .sink(sink.clone())
            .mode(RefreshMode::Synchronous)
            .build()
            .unwrap()
    }

    /// Iterator Integration
    /// Each item completes one task and exhaustion finishes the bar.
    #[test]
    fn test_iterator_drives_bar() {
        let data = [1, 2, 3, 4, 5];
        let sink = MemorySink::terminal();

        let mut iter = data.iter().progress_with(bar(5, &sink));
        let sum: i32 = iter.by_ref().sum();
        let bar = iter.into_bar();

        assert_eq!(sum, 15);
        assert_eq!(bar.position(), 5);
        assert!(bar.is_finished());
        assert!(sink.contents().ends_with('\n'));
    }

    /// Overrun
    /// Items beyond the total are still yielded.
    #[test]
    fn test_iterator_outruns_bar() {
        let sink = MemorySink::piped();
        let collected: Vec<u8> = (0u8..6).progress_with(bar(3, &sink)).collect();
        assert_eq!(collected.len(), 6);
    }

    /// Size Hint
    /// Exact sizes become the total, open-ended iterators get none.
    #[test]
    fn test_total_from_size_hint() {
        assert_eq!(vec![1, 2, 3].into_iter().total_from_size_hint(), 3);
        assert_eq!((0..).total_from_size_hint(), 0);
        assert_eq!((0..10).filter(|n| n % 2 == 0).total_from_size_hint(), 0);
    }
}
