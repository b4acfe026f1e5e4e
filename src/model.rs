use chrono::{DateTime, Local};

use crate::error::AppError;

/// One listed security as published by the exchange directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Company {
    pub code: String,
    pub name: String,
}

impl Company {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// Point-in-time snapshot of one security's trading statistics.
///
/// Every numeric field is optional: the upstream summary omits fields for
/// halted or freshly listed issues, and absence must stay distinguishable
/// from zero. `observed_at` is stamped locally when the fetch completes, so
/// it reflects fetch time rather than market time.
#[derive(Debug, Clone)]
pub struct StockQuote {
    pub code: String,
    pub company_name: String,
    pub market_cap: Option<i64>,
    pub last_price: Option<i64>,
    pub change: Option<i64>,
    pub change_rate: Option<f64>,
    pub volume: Option<i64>,
    pub high: Option<i64>,
    pub low: Option<i64>,
    pub observed_at: DateTime<Local>,
}

/// Per-company result of one fetch attempt. A batch run yields exactly one
/// outcome per submitted company; failures carry the company and the cause
/// instead of disappearing from the result set.
#[derive(Debug)]
pub enum FetchOutcome {
    Quote(StockQuote),
    Failed { company: Company, cause: AppError },
}

impl FetchOutcome {
    pub fn code(&self) -> &str {
        match self {
            FetchOutcome::Quote(quote) => &quote.code,
            FetchOutcome::Failed { company, .. } => &company.code,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, FetchOutcome::Quote(_))
    }

    pub fn quote(&self) -> Option<&StockQuote> {
        match self {
            FetchOutcome::Quote(quote) => Some(quote),
            FetchOutcome::Failed { .. } => None,
        }
    }
}
