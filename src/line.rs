//! Line assembly.
//!
//! Builds one output line from the enabled fields, left to right: bar, status opener,
//! percentage, counter, rate, countdown, status closer. Adjacent status fields are
//! separated by [`DIVIDER`]. When a previous line is still on screen the frame also
//! carries an erase prefix: one backspace per printed column being repainted, which
//! moves the cursor back over the old text so the new text overwrites it in place.

use std::{iter, time::Duration};

use crate::{
    format,
    style::{DIVIDER, Fields, Style},
};

/// Backspace, used for the erase prefix.
pub const BACKSPACE: char = '\x08';

/// The measurements a frame is rendered from.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Readings {
    /// Tasks done.
    pub done: u64,
    /// Total tasks.
    pub total: u64,
    /// Mean time per completed task. `None` until the first measurement.
    pub interval: Option<Duration>,
    /// Smoothed interval driving the rate field. `None` until the first measurement.
    pub rate_interval: Option<Duration>,
}

impl Readings {
    /// Readings before anything was measured; every status field shows its sentinel.
    #[must_use]
    pub const fn pending(total: u64) -> Self {
        Self {
            done: 0,
            total,
            interval: None,
            rate_interval: None,
        }
    }

    /// Returns `done / total`, or zero for an empty total.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            self.done as f64 / self.total as f64
        }
    }
}

/// A composed line and the number of columns to erase before printing it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    /// Backspaces to emit before `line`.
    pub erase: usize,
    /// The line itself, color tokens included.
    pub line: String,
}

impl Frame {
    /// Returns the bytes to write: erase prefix, line, and an optional line break.
    #[must_use]
    pub fn output(&self, newline: bool) -> String {
        let mut out = String::with_capacity(self.erase + self.line.len() + 1);
        out.extend(iter::repeat_n(BACKSPACE, self.erase));
        out.push_str(&self.line);
        if newline {
            out.push('\n');
        }
        out
    }
}

/// Printed width of the status segment for `fields`, brackets and dividers included.
///
/// Zero when no status field is enabled; the brackets are dropped in that case.
#[must_use]
pub fn status_width(style: &Style, fields: Fields, total: u64) -> usize {
    let parts = [
        (Fields::PERCENTAGE, format::PERCENTAGE_WIDTH),
        (Fields::COUNTER, format::counter_width(total)),
        (Fields::RATE, format::RATE_WIDTH),
        (Fields::COUNTDOWN, format::COUNTDOWN_WIDTH),
    ];
    let (count, width) = parts
        .iter()
        .filter(|(field, _)| fields.contains(*field))
        .fold((0, 0), |(count, sum), (_, width)| (count + 1, sum + width));

    if count == 0 {
        return 0;
    }
    width
        + style.status_left.chars().count()
        + style.status_right.chars().count()
        + (count - 1) * DIVIDER.len()
}

/// Printed width of a line rendering `fields`, color tokens excluded.
#[must_use]
pub fn width(style: &Style, fields: Fields, total: u64) -> usize {
    let bar = if fields.contains(Fields::BAR) {
        format::bar_width(style)
    } else {
        0
    };
    bar + status_width(style, fields, total)
}

/// Composes a frame rendering `fields` from `readings`.
///
/// With `repaint` set, the frame erases the columns it is about to rewrite. Fields left
/// out of `fields` are neither erased nor rewritten, so whatever is on screen for them
/// stays there.
#[must_use]
pub fn compose(style: &Style, fields: Fields, readings: &Readings, repaint: bool) -> Frame {
    let status = fields & Fields::STATUS;
    let measured = readings.interval.is_some();

    let mut line = String::new();
    if fields.contains(Fields::BAR) {
        line.push_str(&format::bar(style, readings.fraction()));
    }

    if !status.is_empty() {
        line.push_str(&style.status_font);
        line.push_str(&style.status_color);
        line.push_str(&style.status_left);

        let segments = status.iter().map(|field| {
            if field == Fields::PERCENTAGE {
                format::percentage(measured.then(|| readings.fraction()))
            } else if field == Fields::COUNTER {
                format::counter(readings.done, readings.total)
            } else if field == Fields::RATE {
                format::rate(readings.rate_interval)
            } else {
                format::countdown(readings.interval, readings.done, readings.total)
            }
        });
        for (index, segment) in segments.enumerate() {
            if index > 0 {
                line.push_str(DIVIDER);
            }
            line.push_str(&segment);
        }

        line.push_str(&style.status_right);
        line.push_str(&style.reset);
    }

    let erase = if repaint {
        width(style, fields, readings.total)
    } else {
        0
    };
    Frame { erase, line }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::{BACKSPACE, Readings, compose, status_width, width};
    use crate::style::{Fields, Style};

    fn plain(bar_width: usize) -> Style {
        Style {
            bar_width,
            ..Style::plain()
        }
    }

    fn measured(done: u64, total: u64) -> Readings {
        Readings {
            done,
            total,
            interval: Some(Duration::from_secs(1)),
            rate_interval: Some(Duration::from_secs(1)),
        }
    }

    /// Pending Frame
    /// The first frame shows sentinels and erases nothing.
    #[test]
    fn test_pending_frame() {
        let style = plain(4);
        let frame = compose(&style, Fields::all(), &Readings::pending(10), false);

        assert_eq!(frame.erase, 0);
        assert_eq!(
            frame.line,
            "[    ] [ 0.00%   |  0/10 |   0.00 Hz  |   0s < 99h  ]"
        );
        assert_eq!(frame.line.chars().count(), width(&style, Fields::all(), 10));
    }

    /// Field Order
    /// Dividers only appear between two enabled fields.
    #[test]
    fn test_dividers_between_enabled_fields() {
        let style = plain(4);
        let frame = compose(
            &style,
            Fields::PERCENTAGE | Fields::RATE,
            &measured(5, 10),
            false,
        );
        assert_eq!(frame.line, "[  50.00% |   1.00 Hz  ]");

        let frame = compose(&style, Fields::COUNTER, &measured(5, 10), false);
        assert_eq!(frame.line, "[  5/10 ]");
    }

    /// Bar Only
    /// Without status fields the status brackets disappear.
    #[test]
    fn test_bar_only() {
        let style = plain(4);
        let frame = compose(&style, Fields::BAR, &measured(2, 4), false);
        assert_eq!(frame.line, "[--  ] ");
        assert_eq!(status_width(&style, Fields::BAR, 4), 0);
    }

    /// Erase Prefix
    /// A repaint erases exactly the width printed by the previous frame.
    #[test]
    fn test_erase_matches_previous_width() {
        let style = plain(8);
        let first = compose(&style, Fields::all(), &Readings::pending(100), false);
        let second = compose(&style, Fields::all(), &measured(40, 100), true);

        assert_eq!(second.erase, first.line.chars().count());
        assert_eq!(second.line.chars().count(), first.line.chars().count());

        let output = second.output(true);
        assert!(output.starts_with(&BACKSPACE.to_string().repeat(second.erase)));
        assert!(output.ends_with("]\n"));
    }

    /// Suppressed Bar
    /// Leaving the bar out shrinks the erase prefix to the status segment.
    #[test]
    fn test_suppressed_bar_erases_status_only() {
        let style = plain(8);
        let frame = compose(&style, Fields::STATUS, &measured(1, 100), true);
        assert_eq!(frame.erase, status_width(&style, Fields::all(), 100));
        assert!(frame.line.starts_with('['));
        assert!(!frame.line.contains('-'));
    }

    /// Color Framing
    /// The status segment is wrapped in the font, color and reset tokens.
    #[test]
    fn test_status_tokens() {
        let style = Style {
            fields: Fields::PERCENTAGE,
            ..Style::default()
        };
        let frame = compose(&style, style.fields, &measured(1, 1), true);
        assert_eq!(frame.line, "\x1b[1m\x1b[36m[ 100.00% ]\x1b[0m");
        assert_eq!(frame.erase, 11);
    }
}
