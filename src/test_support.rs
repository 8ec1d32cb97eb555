// Fixtures shared by unit tests across modules.

use chrono::{Duration, NaiveDate};

use crate::types::OhlcBar;

pub fn day(n: i64) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap() + Duration::days(n)
}

/// Build a bar dated `2024-01-01`; tests that only need prices use this.
pub fn bar(open: f64, high: f64, low: f64, close: f64) -> OhlcBar {
    OhlcBar::new(day(0), open, high, low, close, 1_000.0)
}

/// Consecutive daily bars built from closes, each with a 1.0 high/low spread.
pub fn bars_from_closes(closes: &[f64]) -> Vec<OhlcBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| OhlcBar::new(day(i as i64), c, c + 0.5, c - 0.5, c, 1_000.0))
        .collect()
}

/// A gently oscillating series with `n` bars around `base`.
pub fn wavy_bars(n: usize, base: f64) -> Vec<OhlcBar> {
    let closes: Vec<f64> = (0..n)
        .map(|i| base + (i as f64 * 0.4).sin() * base * 0.02)
        .collect();
    bars_from_closes(&closes)
}

/// Re-date `bars` onto consecutive days so the last one falls on `day(last)`.
pub fn ending_on(bars: Vec<OhlcBar>, last: i64) -> Vec<OhlcBar> {
    let first = last - bars.len() as i64 + 1;
    bars.into_iter()
        .enumerate()
        .map(|(i, bar)| OhlcBar {
            date: day(first + i as i64),
            ..bar
        })
        .collect()
}
