use serde::Serialize;

/// Daily closing prices for one coin, strictly oldest first.
pub type PriceSeries = Vec<f64>;

/// Daily percentage returns derived from a price series; one element
/// shorter than the prices it came from.
pub type ReturnSeries = Vec<f64>;

/// One rolling-correlation sample. `day` is the right edge of the trailing
/// window within the returns series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RollingCorrelationPoint {
    pub day: usize,
    pub correlation: f64,
}
