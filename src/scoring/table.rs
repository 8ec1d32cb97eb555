// =============================================================================
// Piecewise band tables
// =============================================================================
//
// Thresholds for every scorer live in static band tables. A table is a list of
// half-open bands `[previous upper, upper)` in ascending order plus the level
// used at and above the last upper bound. A band either holds a flat level or
// ramps linearly from one level to another across its width.

/// Level assigned inside a band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Level {
    Flat(f64),
    /// Linear from `.0` at the band's lower bound to `.1` at its upper bound.
    Ramp(f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub upper: f64,
    pub level: Level,
}

impl Band {
    pub const fn flat(upper: f64, level: f64) -> Self {
        Self {
            upper,
            level: Level::Flat(level),
        }
    }

    pub const fn ramp(upper: f64, from: f64, to: f64) -> Self {
        Self {
            upper,
            level: Level::Ramp(from, to),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct BandTable {
    pub bands: &'static [Band],
    pub above: f64,
}

impl BandTable {
    /// Look up the level for `value`. NaN falls through to `above`.
    ///
    /// A ramp in the first band has no lower bound and reads as its start
    /// level.
    pub fn lookup(&self, value: f64) -> f64 {
        let mut lower = f64::NEG_INFINITY;
        for band in self.bands {
            if value < band.upper {
                return match band.level {
                    Level::Flat(level) => level,
                    Level::Ramp(from, _) if !lower.is_finite() => from,
                    Level::Ramp(from, to) => {
                        let t = (value - lower) / (band.upper - lower);
                        from + (to - from) * t
                    }
                };
            }
            lower = band.upper;
        }
        self.above
    }
}
