// =============================================================================
// Stage evaluators
// =============================================================================
//
// Pure functions turning one symbol's bar history into a stage score. The
// orchestrator fetches the bars (the only suspension point) and decides what to
// do with a `StageError`:
//
//   LookupMiss / InsufficientData / StaleHistory → neutral default (recoverable)
//   Computation                                  → symbol left out of the stage output
//
// A symbol is only scored when its last bar falls on the market date, the
// date of the benchmark's last bar.

use chrono::NaiveDate;

use crate::analysis::model::{Stage, StageDetail};
use crate::analysis::params::AnalysisParams;
use crate::error::StageError;
use crate::indicators::{calculate_adx, calculate_atr, calculate_bollinger, calculate_macd};
use crate::scoring::volatility::last_return_magnitude;
use crate::scoring::{
    detect_crossover, fallback_volatility_score, momentum_score, percent_return,
    relative_strength_score, trend_strength_score, volatility_score, Direction,
    MIN_VOLATILITY_BARS,
};
use crate::types::OhlcBar;

/// Read-only inputs shared by every stage of a run.
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub params: &'a AnalysisParams,
    pub date: NaiveDate,
    pub direction: Direction,
    /// Benchmark return over the relative-strength lookback, in percent.
    pub index_return: f64,
    /// Date of the benchmark bar the index return starts from.
    pub window_start: NaiveDate,
    /// Date of the benchmark's last bar on or before `date`.
    pub market_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub score: u8,
    pub detail: StageDetail,
}

pub fn evaluate(
    stage: Stage,
    symbol: &str,
    bars: &[OhlcBar],
    ctx: &RunContext<'_>,
) -> Result<Evaluation, StageError> {
    let Some(last) = bars.last() else {
        return Err(StageError::LookupMiss {
            symbol: symbol.to_string(),
        });
    };
    if last.date < ctx.market_date {
        return Err(StageError::StaleHistory {
            symbol: symbol.to_string(),
            last: last.date,
            expected: ctx.market_date,
        });
    }
    if !last.close.is_finite() || last.close <= 0.0 {
        return Err(StageError::Computation(format!(
            "unusable latest close {} on {}",
            last.close, last.date
        )));
    }

    match stage {
        Stage::RelativeStrength => relative_strength(bars, ctx),
        Stage::Volatility => volatility(bars, ctx),
        Stage::Momentum => momentum(bars, ctx),
        Stage::Trend => trend(bars, ctx),
    }
}

fn require(bars: &[OhlcBar], required: usize) -> Result<(), StageError> {
    if bars.len() < required {
        return Err(StageError::InsufficientData {
            required,
            available: bars.len(),
        });
    }
    Ok(())
}

fn relative_strength(bars: &[OhlcBar], ctx: &RunContext<'_>) -> Result<Evaluation, StageError> {
    let lookback = ctx.params.relative_strength_lookback;
    require(bars, lookback + 1)?;

    // Measure over the same dates as the benchmark: from the last bar on or
    // before the benchmark's first bar.
    let start = bars
        .iter()
        .rposition(|b| b.date <= ctx.window_start)
        .ok_or(StageError::InsufficientData {
            required: lookback + 1,
            available: bars.len(),
        })?;
    let stock_return = percent_return(&bars[start..])
        .ok_or_else(|| StageError::Computation("stock return is not finite".into()))?;
    let excess_return = stock_return - ctx.index_return;

    Ok(Evaluation {
        score: relative_strength_score(stock_return, ctx.index_return, ctx.direction),
        detail: StageDetail::RelativeStrength {
            stock_return,
            index_return: ctx.index_return,
            excess_return,
        },
    })
}

fn volatility(bars: &[OhlcBar], ctx: &RunContext<'_>) -> Result<Evaluation, StageError> {
    let params = ctx.params;
    let full_history = MIN_VOLATILITY_BARS
        .max(params.bb_period)
        .max(params.atr_period + 1);

    if bars.len() < full_history {
        return Ok(Evaluation {
            score: fallback_volatility_score(bars),
            detail: StageDetail::VolatilityFallback {
                return_magnitude: last_return_magnitude(bars),
            },
        });
    }

    let price = bars[bars.len() - 1].close;
    let atr = calculate_atr(bars, params.atr_period);
    let bands = calculate_bollinger(bars, params.bb_period, params.bb_std_dev);
    if bands.is_empty() {
        return Err(StageError::Computation("bollinger bands unavailable".into()));
    }
    let atr_ratio = atr / price * 100.0;

    Ok(Evaluation {
        score: volatility_score(atr_ratio, bands.width, bands.position, ctx.direction),
        detail: StageDetail::Volatility {
            atr,
            atr_ratio,
            bb_width: bands.width,
            bb_position: bands.position,
        },
    })
}

fn momentum(bars: &[OhlcBar], ctx: &RunContext<'_>) -> Result<Evaluation, StageError> {
    let params = ctx.params;
    require(bars, params.sma_long.max(params.sma_short) + 1)?;

    let reading = detect_crossover(bars, params.sma_short, params.sma_long)
        .ok_or_else(|| StageError::Computation("moving averages unavailable".into()))?;
    if !(reading.short.is_finite() && reading.long.is_finite()) {
        return Err(StageError::Computation("moving averages are not finite".into()));
    }

    let macd = calculate_macd(bars, params.macd_fast, params.macd_slow, params.macd_signal);
    let histogram = macd.last_histogram().filter(|h| h.is_finite());

    Ok(Evaluation {
        score: momentum_score(reading.crossover, histogram.unwrap_or(0.0), ctx.direction),
        detail: StageDetail::Momentum {
            sma_short: reading.short,
            sma_long: reading.long,
            crossover: reading.crossover,
            macd_histogram: histogram,
        },
    })
}

fn trend(bars: &[OhlcBar], ctx: &RunContext<'_>) -> Result<Evaluation, StageError> {
    let period = ctx.params.adx_period;
    require(bars, period + 1)?;

    let reading = calculate_adx(bars, period)
        .ok_or_else(|| StageError::Computation("ADX is not finite".into()))?;
    let (score, strength) = trend_strength_score(reading.adx, ctx.direction);

    Ok(Evaluation {
        score,
        detail: StageDetail::Trend {
            adx: reading.adx,
            strength,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{Crossover, TrendStrength};
    use crate::test_support::{bars_from_closes, day, wavy_bars};

    // Fixture bars start on day 0, so every series counts as current.
    fn ctx(params: &AnalysisParams) -> RunContext<'_> {
        RunContext {
            params,
            date: day(100),
            direction: Direction::Short,
            index_return: 0.0,
            window_start: day(0),
            market_date: day(0),
        }
    }

    #[test]
    fn empty_history_is_lookup_miss() {
        let params = AnalysisParams::default();
        for stage in Stage::ALL {
            let err = evaluate(stage, "NOPE", &[], &ctx(&params)).unwrap_err();
            assert_eq!(err, StageError::LookupMiss { symbol: "NOPE".into() });
        }
    }

    #[test]
    fn nan_close_is_computation_error() {
        let params = AnalysisParams::default();
        let mut bars = wavy_bars(30, 100.0);
        bars.last_mut().unwrap().close = f64::NAN;
        let err = evaluate(Stage::Trend, "X", &bars, &ctx(&params)).unwrap_err();
        assert!(!err.is_recoverable());
    }

    #[test]
    fn relative_strength_underperformer() {
        let params = AnalysisParams::default();
        let mut run = ctx(&params);
        run.index_return = 5.0;
        // 100 → 90 over the lookback: -10% vs +5% index.
        let mut closes = vec![100.0; 21];
        closes[20] = 90.0;
        let eval =
            evaluate(Stage::RelativeStrength, "X", &bars_from_closes(&closes), &run).unwrap();
        assert_eq!(eval.score, 95);
        match eval.detail {
            StageDetail::RelativeStrength { excess_return, .. } => {
                assert!((excess_return + 15.0).abs() < 1e-9)
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn history_ending_before_market_date_is_stale() {
        let params = AnalysisParams::default();
        let mut run = ctx(&params);
        run.market_date = day(40);
        let bars = wavy_bars(30, 50.0);
        for stage in Stage::ALL {
            let err = evaluate(stage, "OLD", &bars, &run).unwrap_err();
            assert_eq!(
                err,
                StageError::StaleHistory {
                    symbol: "OLD".into(),
                    last: day(29),
                    expected: day(40),
                }
            );
            assert!(err.is_recoverable());
        }
    }

    #[test]
    fn relative_strength_measures_over_benchmark_dates() {
        let params = AnalysisParams::default();
        let mut run = ctx(&params);
        run.window_start = day(10);
        run.market_date = day(30);
        // Flat at 100 through day 10, then down to 80 on the last bar. The
        // stock return starts from day 10, not from the first fetched bar.
        let mut closes = vec![50.0; 5];
        closes.extend(vec![100.0; 25]);
        closes.push(80.0);
        let eval =
            evaluate(Stage::RelativeStrength, "X", &bars_from_closes(&closes), &run).unwrap();
        match eval.detail {
            StageDetail::RelativeStrength { stock_return, .. } => {
                assert!((stock_return + 20.0).abs() < 1e-9)
            }
            other => panic!("unexpected detail {other:?}"),
        }
    }

    #[test]
    fn relative_strength_needs_bar_at_window_start() {
        let params = AnalysisParams::default();
        let mut run = ctx(&params);
        run.window_start = day(-5);
        let err = evaluate(Stage::RelativeStrength, "X", &wavy_bars(30, 50.0), &run).unwrap_err();
        assert_eq!(err, StageError::InsufficientData { required: 21, available: 30 });
    }

    #[test]
    fn relative_strength_needs_full_lookback() {
        let params = AnalysisParams::default();
        let err = evaluate(Stage::RelativeStrength, "X", &wavy_bars(10, 50.0), &ctx(&params))
            .unwrap_err();
        assert_eq!(err, StageError::InsufficientData { required: 21, available: 10 });
    }

    #[test]
    fn short_history_uses_volatility_fallback() {
        let params = AnalysisParams::default();
        let eval =
            evaluate(Stage::Volatility, "X", &wavy_bars(10, 100.0), &ctx(&params)).unwrap();
        assert!([30, 50, 70].contains(&eval.score));
        assert!(matches!(eval.detail, StageDetail::VolatilityFallback { .. }));
    }

    #[test]
    fn full_volatility_uses_bands() {
        let params = AnalysisParams::default();
        let eval =
            evaluate(Stage::Volatility, "X", &wavy_bars(30, 100.0), &ctx(&params)).unwrap();
        match eval.detail {
            StageDetail::Volatility { atr, bb_position, .. } => {
                assert!(atr > 0.0);
                assert!(bb_position.is_finite());
            }
            other => panic!("unexpected detail {other:?}"),
        }
        assert!((1..=100).contains(&eval.score));
    }

    #[test]
    fn momentum_without_macd_history_scores_on_crossover() {
        let params = AnalysisParams::default();
        let mut closes: Vec<f64> = (0..15).map(|i| 100.0 + i as f64).collect();
        closes.push(80.0);
        let eval =
            evaluate(Stage::Momentum, "X", &bars_from_closes(&closes), &ctx(&params)).unwrap();
        match eval.detail {
            StageDetail::Momentum { crossover, macd_histogram, .. } => {
                assert_eq!(crossover, Crossover::Bearish);
                assert_eq!(macd_histogram, None);
            }
            other => panic!("unexpected detail {other:?}"),
        }
        // Bearish with a zero histogram stand-in.
        assert_eq!(eval.score, 75);
    }

    #[test]
    fn momentum_needs_long_sma_window() {
        let params = AnalysisParams::default();
        let err = evaluate(Stage::Momentum, "X", &wavy_bars(12, 10.0), &ctx(&params)).unwrap_err();
        assert!(err.is_recoverable());
    }

    #[test]
    fn flat_market_is_range_bound() {
        let params = AnalysisParams::default();
        let eval =
            evaluate(Stage::Trend, "X", &bars_from_closes(&[20.0; 30]), &ctx(&params)).unwrap();
        assert_eq!(eval.score, 85);
        assert_eq!(
            eval.detail,
            StageDetail::Trend { adx: 15.0, strength: TrendStrength::NoTrend }
        );
    }
}
