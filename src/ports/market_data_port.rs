//! Market data access port trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::error::QuantdeskError;
use crate::domain::ohlcv::OhlcvBar;
use crate::domain::platform::{CurvePoint, FactorTable};

#[async_trait]
pub trait MarketDataPort {
    async fn fetch_ohlcv(
        &self,
        symbol: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<Vec<OhlcvBar>, QuantdeskError>;

    async fn list_symbols(&self) -> Result<Vec<String>, QuantdeskError>;

    async fn fetch_factor_table(&self) -> Result<FactorTable, QuantdeskError>;

    async fn fetch_benchmark(&self, code: &str) -> Result<Vec<CurvePoint>, QuantdeskError>;
}
