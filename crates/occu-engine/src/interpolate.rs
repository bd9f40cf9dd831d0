//! Per-camera continuous reconstruction of irregular samples.
//!
//! A camera's samples within the lookback window become an evaluable
//! function of elapsed seconds since the window start. Evaluation is a pure
//! function of the construction-time data.

/// Continuous-time reconstruction of one camera's samples.
#[derive(Debug, Clone, PartialEq)]
pub enum Interpolator {
    /// Single-sample camera: the one observed count holds for all times.
    Constant { value: f64 },
    /// Piecewise-linear between samples; outside the observed range the
    /// nearest segment's slope is extended (no clamping to boundary values).
    Linear { xs: Vec<f64>, ys: Vec<f64> },
}

impl Interpolator {
    /// Build an interpolator from parallel offset/count slices.
    ///
    /// `offsets` must be strictly increasing (the repository enforces this
    /// when parsing query results). Returns `None` for an empty series;
    /// cameras without data are classified upstream and never reach here.
    pub fn from_samples(offsets: &[f64], counts: &[i64]) -> Option<Self> {
        debug_assert_eq!(offsets.len(), counts.len());

        match offsets.len() {
            0 => None,
            1 => Some(Interpolator::Constant {
                value: counts[0] as f64,
            }),
            _ => Some(Interpolator::Linear {
                xs: offsets.to_vec(),
                ys: counts.iter().map(|&c| c as f64).collect(),
            }),
        }
    }

    /// Evaluate at a single instant (elapsed seconds since window start).
    pub fn evaluate(&self, t: f64) -> f64 {
        match self {
            Interpolator::Constant { value } => *value,
            Interpolator::Linear { xs, ys } => evaluate_linear(xs, ys, t),
        }
    }

    /// Evaluate at every grid instant.
    pub fn evaluate_many(&self, grid: &[f64]) -> Vec<f64> {
        grid.iter().map(|&t| self.evaluate(t)).collect()
    }
}

fn evaluate_linear(xs: &[f64], ys: &[f64], t: f64) -> f64 {
    let n = xs.len();

    // Segment index: before the first sample the first segment's slope is
    // extended, past the last sample the last segment's.
    let seg = if t <= xs[0] {
        0
    } else if t >= xs[n - 1] {
        n - 2
    } else {
        // partition_point yields the first x > t; the segment starts one left.
        xs.partition_point(|&x| x <= t) - 1
    };

    let (x0, x1) = (xs[seg], xs[seg + 1]);
    let (y0, y1) = (ys[seg], ys[seg + 1]);

    // Exact at the nodes; slope arithmetic would otherwise leak float error
    // into values that truncation turns into off-by-one counts.
    if t == x0 {
        return y0;
    }
    if t == x1 {
        return y1;
    }

    let slope = (y1 - y0) / (x1 - x0);
    y0 + slope * (t - x0)
}
