use biquad::{Coefficients, ToHertz, Type, Q_BUTTERWORTH_F64};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::error::InsufficientDataError;
use crate::types::{ChannelSeries, TimeGrid};

/// Only second order sections are designed.
pub const FILTER_ORDER: u8 = 2;

/// Edge padding is this many times the coefficient vector length.
const PAD_FACTOR: usize = 3;

#[derive(Debug, Error)]
pub enum FilterError {
    #[error(transparent)]
    InsufficientData(#[from] InsufficientDataError),
    #[error("cutoff period {0} must be a finite number of grid units greater than 1")]
    InvalidPeriod(f64),
    #[error("filter order {0} is not supported; only order 2 is available")]
    UnsupportedOrder(u8),
    #[error("low-pass design failed: {0}")]
    Design(String),
}

fn default_order() -> u8 {
    FILTER_ORDER
}

/// Cutoff periods are counted in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    pub short_period: f64,
    pub long_period: f64,
    #[serde(default = "default_order")]
    pub order: u8,
}

impl FilterConfig {
    pub fn new(short_period: f64, long_period: f64) -> Self {
        Self {
            short_period,
            long_period,
            order: FILTER_ORDER,
        }
    }

    pub fn validate(&self) -> Result<(), FilterError> {
        if self.order != FILTER_ORDER {
            return Err(FilterError::UnsupportedOrder(self.order));
        }
        for period in [self.short_period, self.long_period] {
            if !period.is_finite() || period <= 1.0 {
                return Err(FilterError::InvalidPeriod(period));
            }
        }
        Ok(())
    }
}

/// Second order Butterworth low-pass in transfer-function form, `a[0] == 1`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LowPassDesign {
    b: [f64; 3],
    a: [f64; 3],
}

impl LowPassDesign {
    /// Designs the filter for a cutoff of `1 / period` relative to Nyquist.
    /// With one sample per grid unit that is `1 / (2 * period)` cycles per unit.
    pub fn butterworth(period: f64) -> Result<Self, FilterError> {
        if !period.is_finite() || period <= 1.0 {
            return Err(FilterError::InvalidPeriod(period));
        }

        let sample_rate_hz: f64 = 1.0;
        let cutoff_hz = 0.5 / period;
        let coeffs = Coefficients::<f64>::from_params(
            Type::LowPass,
            sample_rate_hz.hz(),
            cutoff_hz.hz(),
            Q_BUTTERWORTH_F64,
        )
        .map_err(|err| FilterError::Design(format!("{err:?}")))?;

        Ok(Self {
            b: [coeffs.b0, coeffs.b1, coeffs.b2],
            a: [1.0, coeffs.a1, coeffs.a2],
        })
    }

    pub fn numerator(&self) -> [f64; 3] {
        self.b
    }

    pub fn denominator(&self) -> [f64; 3] {
        self.a
    }

    pub fn dc_gain(&self) -> f64 {
        self.b.iter().sum::<f64>() / self.a.iter().sum::<f64>()
    }

    /// Samples of odd extension added at each end before filtering.
    pub fn padding(&self) -> usize {
        PAD_FACTOR * self.b.len().max(self.a.len())
    }

    /// Shortest signal that can be filtered with the padding in place.
    pub fn minimum_len(&self) -> usize {
        self.padding() + 1
    }

    /// Filter state for a unit step input that has been running forever.
    fn steady_state(&self) -> [f64; 2] {
        let gain = self.dc_gain();
        [gain - self.b[0], self.b[2] - self.a[2] * gain]
    }

    /// One causal pass in transposed direct form II, starting from `state`.
    fn run(&self, input: &[f64], mut state: [f64; 2]) -> Vec<f64> {
        let [b0, b1, b2] = self.b;
        let [_, a1, a2] = self.a;
        input
            .iter()
            .map(|&x| {
                let y = b0 * x + state[0];
                state[0] = b1 * x - a1 * y + state[1];
                state[1] = b2 * x - a2 * y;
                y
            })
            .collect()
    }

    /// Zero-phase filtering: forward pass, then a pass over the reversed
    /// output, on a copy extended by odd reflection at both ends. Each pass
    /// starts from the steady state scaled by its first sample.
    pub fn filtfilt(&self, signal: &[f64]) -> Result<Vec<f64>, InsufficientDataError> {
        let pad = self.padding();
        if signal.len() < self.minimum_len() {
            return Err(InsufficientDataError {
                stage: "dual-band filter",
                available: signal.len(),
                minimum: self.minimum_len(),
            });
        }

        let extended = odd_extension(signal, pad);
        let zi = self.steady_state();

        let x0 = extended[0];
        let mut forward = self.run(&extended, [zi[0] * x0, zi[1] * x0]);

        forward.reverse();
        let y0 = forward[0];
        let mut backward = self.run(&forward, [zi[0] * y0, zi[1] * y0]);
        backward.reverse();

        Ok(backward[pad..backward.len() - pad].to_vec())
    }
}

/// Reflects `pad` samples about each endpoint value: `2 * x[0] - x[pad..1]`
/// before the signal and `2 * x[n-1] - x[n-2..n-1-pad]` after it.
fn odd_extension(signal: &[f64], pad: usize) -> Vec<f64> {
    let n = signal.len();
    let first = signal[0];
    let last = signal[n - 1];

    let mut extended = Vec::with_capacity(n + 2 * pad);
    extended.extend((1..=pad).rev().map(|i| 2.0 * first - signal[i]));
    extended.extend_from_slice(signal);
    extended.extend((1..=pad).map(|i| 2.0 * last - signal[n - 1 - i]));
    extended
}

/// Applies one design to every channel of `grid`.
pub fn filter_grid(
    grid: &TimeGrid,
    design: &LowPassDesign,
) -> Result<TimeGrid, InsufficientDataError> {
    if grid.len() < design.minimum_len() {
        return Err(InsufficientDataError {
            stage: "dual-band filter",
            available: grid.len(),
            minimum: design.minimum_len(),
        });
    }

    let channels = grid
        .channels
        .iter()
        .map(|channel| {
            Ok(ChannelSeries {
                field: channel.field,
                values: design.filtfilt(&channel.values)?,
            })
        })
        .collect::<Result<Vec<_>, InsufficientDataError>>()?;

    Ok(TimeGrid {
        step: grid.step,
        index: grid.index.clone(),
        channels,
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct DualBandOutput {
    pub short: TimeGrid,
    pub long: TimeGrid,
}

/// Smooths the resampled grid with the short and the long cutoff.
pub fn apply_dual_band(
    grid: &TimeGrid,
    config: &FilterConfig,
) -> Result<DualBandOutput, FilterError> {
    config.validate()?;
    let short_design = LowPassDesign::butterworth(config.short_period)?;
    let long_design = LowPassDesign::butterworth(config.long_period)?;

    let short = filter_grid(grid, &short_design)?;
    let long = filter_grid(grid, &long_design)?;

    info!(
        points = grid.len(),
        channels = grid.channels.len(),
        short_period = config.short_period,
        long_period = config.long_period,
        "Applied dual-band zero-phase filter"
    );

    Ok(DualBandOutput { short, long })
}
