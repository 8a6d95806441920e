//! # Checkout Request Files
//!
//! The JSON document `register checkout --request` reads. Money is written
//! as a decimal string so nothing passes through floating point:
//!
//! ```json
//! {
//!   "customer_email": "asha@example.in",
//!   "cash_paid": "2400.00",
//!   "lines": [
//!     { "product_code": "RICE-5KG", "quantity": 2 }
//!   ],
//!   "till": [
//!     { "value": 500, "count": 2 },
//!     { "value": 100, "count": 3 }
//!   ]
//! }
//! ```
//!
//! `till` is optional; without it the persisted counts are used.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use till_core::{CartLine, Denomination, Money};
use till_db::CheckoutRequest;

/// Request file contents as written by the operator.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CheckoutFile {
    pub customer_email: String,
    pub cash_paid: String,
    pub lines: Vec<CartLine>,
    pub till: Option<Vec<TillCount>>,
}

/// One physically counted denomination.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TillCount {
    pub value: i64,
    pub count: i64,
}

impl CheckoutFile {
    /// Reads and parses a request file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read request file {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("invalid request file {}", path.display()))
    }

    pub fn parse(text: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Converts to the commit request.
    pub fn into_request(self) -> anyhow::Result<CheckoutRequest> {
        let cash_paid: Money = self
            .cash_paid
            .parse()
            .with_context(|| format!("cash_paid {:?}", self.cash_paid))?;

        let mut request = CheckoutRequest::new(self.customer_email, self.lines, cash_paid);
        if let Some(till) = self.till {
            request = request.with_till_counts(
                till.into_iter()
                    .map(|t| Denomination::new(t.value, t.count))
                    .collect(),
            );
        }
        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_request() {
        let file = CheckoutFile::parse(
            r#"{
                "customer_email": "asha@example.in",
                "cash_paid": "2400.50",
                "lines": [{ "product_code": "TV-STAND", "quantity": 1 }],
                "till": [{ "value": 20, "count": 2 }]
            }"#,
        )
        .unwrap();

        let request = file.into_request().unwrap();
        assert_eq!(request.cash_paid, Money::from_paise(240_050));
        assert_eq!(request.lines, vec![CartLine::new("TV-STAND", 1)]);
        assert_eq!(request.till_counts, Some(vec![Denomination::new(20, 2)]));
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_till_is_optional() {
        let file = CheckoutFile::parse(
            r#"{ "customer_email": "a@b.in", "cash_paid": "100", "lines": [] }"#,
        )
        .unwrap();

        let request = file.into_request().unwrap();
        assert!(request.till_counts.is_none());
        assert_eq!(request.cash_paid, Money::from_rupees(100));
    }

    #[test]
    fn test_bad_money_rejected() {
        for cash in ["12.345", "-5", "₹100", ""] {
            let file = CheckoutFile {
                customer_email: "a@b.in".to_string(),
                cash_paid: cash.to_string(),
                lines: vec![],
                till: None,
            };
            assert!(file.into_request().is_err(), "accepted {:?}", cash);
        }
    }

    #[test]
    fn test_unknown_field_rejected() {
        let err = CheckoutFile::parse(
            r#"{ "customer_email": "a@b.in", "cash_paid": "1", "lines": [], "discount": "5" }"#,
        );
        assert!(err.is_err());
    }

    #[test]
    fn test_sample_request_parses() {
        let text = include_str!("../../../demos/checkout_request.json");
        let request = CheckoutFile::parse(text).unwrap().into_request().unwrap();
        assert!(request.validate().is_ok());
    }
}
