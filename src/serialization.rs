/// json request decoding for the calculator's input contract
use std::collections::BTreeMap;

use hourglass_rs::SafeTimeProvider;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{LoanCalculator, LoanResult};
use crate::config::{CalculatorConfig, LoanParameters};
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::{EarlyPayment, EarlyPaymentMode, EarlyPayments};

/// loan calculation request as received over the wire
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CalculationRequest {
    pub principal: Decimal,
    /// annual rate in percent
    #[serde(alias = "annual_rate_percent")]
    pub rate: Decimal,
    pub term_months: i64,
    #[serde(default)]
    pub start_date: Option<String>,
    /// keyed by month number as a string, e.g. `"6"`
    #[serde(default)]
    pub early_payments: Option<BTreeMap<String, EarlyPaymentRequest>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EarlyPaymentRequest {
    pub amount: Decimal,
    #[serde(default)]
    pub mode: Option<String>,
}

impl CalculationRequest {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// validated engine inputs; a missing start date means today
    pub fn into_parameters(self, time_provider: &SafeTimeProvider) -> Result<(LoanParameters, EarlyPayments)> {
        let term_months = term_months(self.term_months)?;

        let mut builder = LoanParameters::builder()
            .principal(Money::from_decimal(self.principal))
            .annual_rate_percent(self.rate)
            .term_months(term_months);
        if let Some(date) = self.start_date {
            builder = builder.start_date_str(date);
        }
        let params = builder.build_with_time(time_provider)?;

        let early_payments = self
            .early_payments
            .unwrap_or_default()
            .into_iter()
            .map(|(key, request)| -> Result<(u32, EarlyPayment)> {
                let month = month_key(&key)?;
                let payment = request.into_early_payment()?;
                payment.validate(month)?;
                Ok((month, payment))
            })
            .collect::<Result<EarlyPayments>>()?;

        Ok((params, early_payments))
    }
}

impl EarlyPaymentRequest {
    fn into_early_payment(self) -> Result<EarlyPayment> {
        let mode = match self.mode {
            Some(mode) => mode.parse()?,
            None => EarlyPaymentMode::default(),
        };
        Ok(EarlyPayment::new(Money::from_decimal(self.amount), mode))
    }
}

fn term_months(value: i64) -> Result<u32> {
    if value <= 0 {
        return Err(LoanError::invalid_input(
            "term_months",
            format!("must be positive, got {}", value),
        ));
    }
    u32::try_from(value)
        .map_err(|_| LoanError::invalid_input("term_months", format!("{} is too large", value)))
}

fn month_key(key: &str) -> Result<u32> {
    key.trim().parse::<u32>().map_err(|_| {
        LoanError::invalid_input(
            "early_payments",
            format!("month key {:?} is not a positive integer", key),
        )
    })
}

/// decode a request, run the calculation and return the result
pub fn calculate_from_json(
    json: &str,
    time_provider: &SafeTimeProvider,
    config: &CalculatorConfig,
) -> Result<LoanResult> {
    let request = CalculationRequest::from_json(json)?;
    let (params, early_payments) = request.into_parameters(time_provider)?;
    LoanCalculator::new(config.clone())?.calculate(&params, &early_payments)
}
