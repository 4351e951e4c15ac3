//! # `stepbar`
//!
//! A single-line, in-place terminal progress bar driven by caller-issued steps.
//!
//! ```text
//! [-----------                   ] [  36.00% |  36/100 |  27.77 Hz  |  1.2m < 2.3m ]
//! ```
//!
//! `stepbar` is designed to be:
//!
//! * **Decoupled**: Advancing the counter never waits on the terminal. A background worker
//!   (or a rate limiter on the caller's thread) decides when the line is redrawn.
//! * **Stable**: Every status field has a fixed width, so frames overwrite each other
//!   exactly. The bar segment is only repainted when progress moves by at least 1%.
//! * **Quiet when piped**: When the destination is not an interactive terminal nothing is
//!   written, while the bar keeps counting.
//!
//! ## Modules
//!
//! * [`builder`]: Fluent construction of a [`ProgressBar`].
//! * [`counter`]: The saturating task [`Counter`].
//! * [`error`]: The [`BarError`] type.
//! * [`format`]: Fixed-width field formatters.
//! * [`iter`]: Extension traits for driving a bar from an Iterator.
//! * [`line`]: Assembly of one output line and its erase prefix.
//! * [`progress`]: The [`ProgressBar`] controller and its lifecycle.
//! * [`refresh`]: Background and synchronous refresh strategies.
//! * [`sink`]: Output destinations.
//! * [`style`]: Visual configuration.

#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod builder;
pub mod counter;
pub mod error;
pub mod format;
pub mod iter;
pub mod line;
pub mod progress;
pub mod refresh;
pub mod sink;
pub mod style;

pub use builder::BarBuilder;
pub use counter::Counter;
pub use error::BarError;
pub use iter::{ProgressIter, ProgressIteratorExt};
pub use progress::{BarSnapshot, ProgressBar};
pub use refresh::{REFRESH_INTERVAL, RefreshMode};
pub use sink::{MemorySink, Sink, StreamSink};
pub use style::{Fields, Style, StyleOptions};
