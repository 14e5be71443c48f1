use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::decimal::Money;
use crate::errors::{LoanError, Result};

/// what happens to future scheduled payments after an early payment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EarlyPaymentMode {
    /// extra principal only, the scheduled payment stays as it is
    #[default]
    ReducePayment,
    /// extra principal, then the payment is re-amortised over the remaining term
    ReduceTerm,
}

impl EarlyPaymentMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            EarlyPaymentMode::ReducePayment => "reduce_payment",
            EarlyPaymentMode::ReduceTerm => "reduce_term",
        }
    }
}

impl fmt::Display for EarlyPaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EarlyPaymentMode {
    type Err = LoanError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "reduce_payment" => Ok(EarlyPaymentMode::ReducePayment),
            "reduce_term" => Ok(EarlyPaymentMode::ReduceTerm),
            other => Err(LoanError::InvalidEarlyPaymentMode {
                mode: other.to_string(),
            }),
        }
    }
}

/// extra principal payment made in a given month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EarlyPayment {
    pub amount: Money,
    #[serde(default)]
    pub mode: EarlyPaymentMode,
}

impl EarlyPayment {
    pub fn new(amount: Money, mode: EarlyPaymentMode) -> Self {
        Self { amount, mode }
    }

    pub fn reduce_payment(amount: Money) -> Self {
        Self::new(amount, EarlyPaymentMode::ReducePayment)
    }

    pub fn reduce_term(amount: Money) -> Self {
        Self::new(amount, EarlyPaymentMode::ReduceTerm)
    }

    /// zero-amount entries are accepted and have no effect
    pub fn is_effective(&self) -> bool {
        self.amount.is_positive()
    }

    pub fn validate(&self, month: u32) -> Result<()> {
        if month == 0 {
            return Err(LoanError::invalid_input(
                "early_payments",
                "month numbers start at 1",
            ));
        }

        if self.amount.is_negative() {
            return Err(LoanError::invalid_input(
                "early_payments",
                format!("amount for month {} is negative: {}", month, self.amount),
            ));
        }

        if self.amount > Money::MAX_AMOUNT {
            return Err(LoanError::invalid_input(
                "early_payments",
                format!(
                    "amount for month {} exceeds {}: {}",
                    month,
                    Money::MAX_AMOUNT,
                    self.amount
                ),
            ));
        }

        Ok(())
    }
}

/// sparse early payments keyed by 1-based month number
pub type EarlyPayments = BTreeMap<u32, EarlyPayment>;

/// validate every entry of an early payment map
pub fn validate_early_payments(early_payments: &EarlyPayments) -> Result<()> {
    early_payments
        .iter()
        .try_for_each(|(month, payment)| payment.validate(*month))
}

/// one simulated month of the schedule
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentEntry {
    pub month: u32,
    pub payment_date: NaiveDate,
    /// annuity payment in effect for this month
    #[serde(rename = "monthly_payment")]
    pub scheduled_payment: Money,
    pub early_payment: Money,
    /// total principal retired this month, early amount included
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub remaining_balance: Money,
}
