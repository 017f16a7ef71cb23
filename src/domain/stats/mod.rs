//! Descriptive statistics over feature columns.
//!
//! Same contract as the indicator engine: degenerate input (empty,
//! all-non-finite, zero variance) produces a neutral default, never an
//! error, so chart rendering cannot be interrupted by bad data.

pub mod correlation;
pub mod distribution;

pub use correlation::{
    correlation_matrix, forward_returns, information_coefficient, pearson, CorrelationMatrix,
};
pub use distribution::{boxplot, histogram, BoxplotSummary, HistogramBin};
