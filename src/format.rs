//! Field formatters.
//!
//! Pure functions that turn raw readings into the fixed-width strings drawn on the line.
//! Every status field has a constant width so consecutive frames line up exactly and the
//! erase prefix of the next frame can be computed without looking at the text.
//!
//! Formatters that take an `Option` render a sentinel for `None`: the value shown before
//! the first measurement exists, which is distinct from a measured zero.

use std::{iter, time::Duration};

use crate::style::Style;

/// Width of the percentage field, `"100.00%"`.
pub const PERCENTAGE_WIDTH: usize = "100.00%".len();
/// Width of the rate field, `"999.99 kHz"`.
pub const RATE_WIDTH: usize = "999.99 kHz".len();
/// Width of the countdown field, `"9.9m < 9.9m"`.
pub const COUNTDOWN_WIDTH: usize = "9.9m < 9.9m".len();

const PERCENTAGE_SENTINEL: &str = "0.00%";
const RATE_SENTINEL: &str = "0.00 Hz";
const RATE_SATURATED: &str = "> 1.00 GHz";
const COUNTDOWN_SENTINEL: &str = "0s < 99h";

const NANOS_PER_SEC: u128 = 1_000_000_000;

/// Pads `text` with spaces on the right up to `width` chars.
#[must_use]
pub fn align_left(width: usize, text: &str) -> String {
    let pad = width.saturating_sub(text.chars().count());
    let mut out = String::with_capacity(text.len() + pad);
    out.push_str(text);
    out.extend(iter::repeat_n(' ', pad));
    out
}

/// Pads `text` with spaces on the left up to `width` chars.
#[must_use]
pub fn align_right(width: usize, text: &str) -> String {
    let pad = width.saturating_sub(text.chars().count());
    let mut out = String::with_capacity(text.len() + pad);
    out.extend(iter::repeat_n(' ', pad));
    out.push_str(text);
    out
}

/// Centers `text` within `width` chars. An odd pad leaves the extra space on the left.
#[must_use]
pub fn center(width: usize, text: &str) -> String {
    let pad = width.saturating_sub(text.chars().count());
    let right = pad / 2;
    let mut out = String::with_capacity(text.len() + pad);
    out.extend(iter::repeat_n(' ', pad - right));
    out.push_str(text);
    out.extend(iter::repeat_n(' ', right));
    out
}

/// Formats `value` keeping `places` decimals, truncated rather than rounded.
fn truncated(value: f64, places: usize) -> String {
    let mut text = format!("{value:.6}");
    if let Some(dot) = text.find('.') {
        text.truncate(dot + 1 + places);
    }
    text
}

/// Renders the bar: brackets around `round(width * fraction)` done glyphs followed by
/// todo glyphs, each run prefixed by its color token, then the reset token and one space.
#[must_use]
pub fn bar(style: &Style, fraction: f64) -> String {
    let width = style.bar_width;
    let filled = (width as f64 * fraction.clamp(0.0, 1.0)).round() as usize;
    let filled = filled.min(width);

    let mut out = String::with_capacity(
        style.bar_start.len()
            + style.bar_end.len()
            + style.done_color.len()
            + style.todo_color.len()
            + style.reset.len()
            + width * style.done_glyph.len().max(style.todo_glyph.len())
            + 1,
    );
    out.push_str(&style.bar_start);
    out.push_str(&style.done_color);
    out.extend(iter::repeat_n(style.done_glyph.as_str(), filled));
    out.push_str(&style.todo_color);
    out.extend(iter::repeat_n(style.todo_glyph.as_str(), width - filled));
    out.push_str(&style.reset);
    out.push_str(&style.bar_end);
    out.push(' ');
    out
}

/// Printed width of [`bar`] for `style`, color tokens excluded.
#[must_use]
pub fn bar_width(style: &Style) -> usize {
    style.bar_width + style.bar_start.chars().count() + style.bar_end.chars().count() + 1
}

/// Renders the completion percentage, right-aligned to [`PERCENTAGE_WIDTH`].
///
/// `None` yields the left-aligned `"0.00%"` sentinel.
#[must_use]
pub fn percentage(fraction: Option<f64>) -> String {
    match fraction {
        None => align_left(PERCENTAGE_WIDTH, PERCENTAGE_SENTINEL),
        Some(fraction) => {
            let mut text = truncated(fraction * 100.0, 2);
            text.push('%');
            align_right(PERCENTAGE_WIDTH, &text)
        }
    }
}

/// Renders `done/total`, with `done` right-aligned to the digit count of `total`.
#[must_use]
pub fn counter(done: u64, total: u64) -> String {
    let total = total.to_string();
    let mut out = align_right(total.len(), &done.to_string());
    out.push('/');
    out.push_str(&total);
    out
}

/// Printed width of [`counter`] for a given total.
#[must_use]
pub fn counter_width(total: u64) -> usize {
    digits(total) * 2 + 1
}

fn digits(value: u64) -> usize {
    value.checked_ilog10().map_or(1, |log| log as usize + 1)
}

/// Two-tap smoothing of the per-step interval: the mean of the previous average and the
/// latest sample.
#[must_use]
pub fn smooth(previous: Duration, latest: Duration) -> Duration {
    let nanos = (previous.as_nanos() + latest.as_nanos()) / 2;
    Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
}

/// Renders the update frequency for an averaged per-step `interval`, centered to
/// [`RATE_WIDTH`].
///
/// A zero interval is too fast to measure and reports the saturated maximum.
/// `None` yields the `"0.00 Hz"` sentinel.
#[must_use]
pub fn rate(interval: Option<Duration>) -> String {
    let Some(interval) = interval else {
        return center(RATE_WIDTH, RATE_SENTINEL);
    };

    let hertz = match interval.as_nanos() {
        0 => u64::MAX,
        nanos => u64::try_from(NANOS_PER_SEC / nanos).unwrap_or(u64::MAX),
    };
    let frequency = hertz as f64;

    let text = if frequency < 1e3 {
        format!("{} Hz", truncated(frequency, 2))
    } else if frequency < 1e6 {
        format!("{} kHz", truncated(frequency / 1e3, 2))
    } else if frequency < 1e9 {
        format!("{} MHz", truncated(frequency / 1e6, 2))
    } else {
        let giga = frequency / 1e9;
        if giga > 999.99 {
            RATE_SATURATED.to_owned()
        } else {
            format!("{} GHz", truncated(giga, 2))
        }
    };
    center(RATE_WIDTH, &text)
}

/// Renders a whole number of seconds compactly, with precision depending on magnitude:
/// `59s`, `8.9m`, `59m`, `8.9h`, `42h`, capped at `99h`.
#[must_use]
pub fn duration(secs: u64) -> String {
    const MINUTE: u64 = 60;
    const HOUR: u64 = 60 * MINUTE;

    if secs < MINUTE {
        format!("{secs}s")
    } else if secs < 9 * MINUTE {
        format!("{}m", truncated(secs as f64 / MINUTE as f64, 1))
    } else if secs < HOUR {
        format!("{}m", secs / MINUTE)
    } else if secs < 9 * HOUR {
        format!("{}h", truncated(secs as f64 / HOUR as f64, 1))
    } else if secs > 99 * HOUR {
        "99h".to_owned()
    } else {
        format!("{}h", secs / HOUR)
    }
}

/// Renders `elapsed < remaining` for a per-step `interval`, centered to
/// [`COUNTDOWN_WIDTH`].
///
/// Elapsed time is `interval * done`, the estimate is `interval * (total - done)`.
/// `None` yields the `"0s < 99h"` sentinel.
#[must_use]
pub fn countdown(interval: Option<Duration>, done: u64, total: u64) -> String {
    let Some(interval) = interval else {
        return center(COUNTDOWN_WIDTH, COUNTDOWN_SENTINEL);
    };

    let secs = |steps: u64| {
        let nanos = interval.as_nanos().saturating_mul(u128::from(steps));
        u64::try_from(nanos / NANOS_PER_SEC).unwrap_or(u64::MAX)
    };
    let text = format!(
        "{} < {}",
        duration(secs(done)),
        duration(secs(total.saturating_sub(done)))
    );
    center(COUNTDOWN_WIDTH, &text)
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    /// Alignment
    /// Odd padding puts the spare space on the left when centering.
    #[test]
    fn test_alignment() {
        assert_eq!(align_left(5, "ab"), "ab   ");
        assert_eq!(align_right(5, "ab"), "   ab");
        assert_eq!(center(5, "ab"), "  ab ");
        assert_eq!(center(2, "abcd"), "abcd");
    }

    /// Bar Fill
    /// The fill length is rounded and the cell count stays constant.
    #[test]
    fn test_bar_fill() {
        let style = Style {
            bar_width: 10,
            ..Style::plain()
        };
        assert_eq!(bar(&style, 0.0), "[          ] ");
        assert_eq!(bar(&style, 0.25), "[---       ] ");
        assert_eq!(bar(&style, 1.0), "[----------] ");
        assert_eq!(bar(&style, 1.0).chars().count(), bar_width(&style));
    }

    /// Bar Colors
    /// Color tokens are inserted verbatim before each run.
    #[test]
    fn test_bar_colors() {
        let style = Style {
            bar_width: 2,
            done_color: "<d>".into(),
            todo_color: "<t>".into(),
            reset: "<r>".into(),
            ..Style::plain()
        };
        assert_eq!(bar(&style, 0.5), "[<d>-<t> <r>] ");
    }

    /// Percentage
    /// Full completion and the pre-start sentinel have the documented shapes.
    #[test]
    fn test_percentage() {
        assert_eq!(percentage(Some(1.0)), "100.00%");
        assert_eq!(percentage(None), "0.00%  ");
        assert_eq!(percentage(Some(0.0)), "  0.00%");
        assert_eq!(percentage(Some(0.123_456)), " 12.34%");
        assert_eq!(percentage(Some(2.0 / 3.0)), " 66.66%");
    }

    /// Task Counter
    /// The done count is padded to the width of the total.
    #[test]
    fn test_counter() {
        assert_eq!(counter(7, 100), "  7/100");
        assert_eq!(counter(100, 100), "100/100");
        assert_eq!(counter(0, 9), "0/9");
        assert_eq!(counter_width(100), 7);
        assert_eq!(counter_width(9), 3);
        assert_eq!(counter_width(0), 3);
    }

    /// Rate Units
    /// Frequencies pick a unit and two truncated decimals.
    #[test]
    fn test_rate_units() {
        assert_eq!(rate(Some(Duration::from_secs(1))).trim(), "1.00 Hz");
        assert_eq!(rate(Some(Duration::from_micros(500))).trim(), "2.00 kHz");
        assert_eq!(rate(Some(Duration::from_nanos(400))).trim(), "2.50 MHz");
        assert_eq!(rate(Some(Duration::from_nanos(1))).trim(), "1.00 GHz");
        assert_eq!(rate(Some(Duration::ZERO)), "> 1.00 GHz");
        assert_eq!(rate(None), "  0.00 Hz ");
        assert_eq!(rate(Some(Duration::from_secs(1))).len(), RATE_WIDTH);
    }

    /// Smoothing
    /// The smoother averages the previous value with the latest sample.
    #[test]
    fn test_smooth() {
        let avg = smooth(Duration::ZERO, Duration::from_secs(2));
        assert_eq!(avg, Duration::from_secs(1));
        assert_eq!(smooth(avg, Duration::from_secs(3)), Duration::from_secs(2));
    }

    /// Duration Text
    /// Each magnitude uses its own precision.
    #[test]
    fn test_duration() {
        assert_eq!(duration(0), "0s");
        assert_eq!(duration(59), "59s");
        assert_eq!(duration(90), "1.5m");
        assert_eq!(duration(539), "8.9m");
        assert_eq!(duration(600), "10m");
        assert_eq!(duration(3599), "59m");
        assert_eq!(duration(5400), "1.5h");
        assert_eq!(duration(36_000), "10h");
        assert_eq!(duration(99 * 3600 + 1), "99h");
    }

    /// Countdown
    /// Elapsed and remaining are derived from the per-step interval.
    #[test]
    fn test_countdown() {
        let interval = Some(Duration::from_secs(45));
        assert_eq!(countdown(interval, 1, 2), " 45s < 45s ");
        assert_eq!(countdown(Some(Duration::from_secs(60)), 10, 10).trim(), "10m < 0s");
        assert_eq!(countdown(None, 0, 10), "  0s < 99h ");
        assert_eq!(
            countdown(Some(Duration::from_secs(u64::MAX)), u64::MAX, u64::MAX).trim(),
            "99h < 0s"
        );
    }
}
