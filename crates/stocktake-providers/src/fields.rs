//! Kind-specific record columns shared across providers

use serde::Serialize;

/// A `Cost` column in dollars per month, empty when unknown
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CostFields {
    #[serde(rename = "Cost")]
    pub cost: Option<f64>,
}

impl CostFields {
    /// Costs are stored rounded to cents
    pub fn new(cost: Option<f64>) -> Self {
        Self {
            cost: cost.map(round_cents),
        }
    }

    pub fn unknown() -> Self {
        Self { cost: None }
    }
}

/// Columns of a registered domain
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DomainFields {
    /// Expiry date as `yyyy-mm-dd`
    #[serde(rename = "Expires")]
    pub expires: Option<String>,

    /// Outcome of an HTTP probe, e.g. `OK - 200` or `Error - Timeout`
    #[serde(rename = "HttpResponse")]
    pub http_response: String,
}

/// Round a dollar amount to the nearest cent
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}
