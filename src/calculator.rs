use chrono::NaiveDate;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::config::{CalculatorConfig, LoanParameters};
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::payments::{generate_payment_schedule, ScheduleGenerator};
use crate::types::{validate_early_payments, EarlyPayments, PaymentEntry};

/// aggregate result of a loan calculation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanResult {
    /// payment from the original full-term annuity, before any recalculation
    pub monthly_payment: Money,
    pub total_interest: Money,
    /// principal + total interest + total early payments
    pub total_amount: Money,
    pub total_early_payment: Money,
    /// baseline total cost minus this run's total cost
    pub final_savings: Money,
    /// baseline total interest minus this run's total interest
    pub interest_savings: Money,
    pub payment_schedule: Vec<PaymentEntry>,
    pub principal: Money,
}

impl LoanResult {
    /// number of months actually simulated
    pub fn months(&self) -> u32 {
        self.payment_schedule.len() as u32
    }

    /// months cut from the contractual term
    pub fn term_reduction_months(&self, params: &LoanParameters) -> u32 {
        params.term_months.saturating_sub(self.months())
    }

    pub fn last_payment_date(&self) -> Option<NaiveDate> {
        self.payment_schedule.last().map(|entry| entry.payment_date)
    }

    pub fn totals(&self) -> Result<ScheduleTotals> {
        ScheduleTotals::from_entries(&self.payment_schedule)
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// column sums over a schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScheduleTotals {
    pub scheduled_payments: Money,
    pub early_payments: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
}

impl ScheduleTotals {
    pub fn from_entries(entries: &[PaymentEntry]) -> Result<Self> {
        entries.iter().try_fold(Self::default(), |totals, entry| {
            Ok(Self {
                scheduled_payments: add(totals.scheduled_payments, entry.scheduled_payment, "scheduled payments")?,
                early_payments: add(totals.early_payments, entry.early_payment, "early payments")?,
                principal_paid: add(totals.principal_paid, entry.principal_paid, "principal paid")?,
                interest_paid: add(totals.interest_paid, entry.interest_paid, "interest paid")?,
            })
        })
    }
}

pub(crate) fn add(left: Money, right: Money, what: &str) -> Result<Money> {
    left.checked_add(right).ok_or_else(|| total_overflow(what))
}

pub(crate) fn sub(left: Money, right: Money, what: &str) -> Result<Money> {
    left.checked_sub(right).ok_or_else(|| total_overflow(what))
}

fn total_overflow(what: &str) -> LoanError {
    LoanError::CalculationError {
        message: format!("total {} overflows", what),
    }
}

/// loan calculator
#[derive(Debug, Clone, Default)]
pub struct LoanCalculator {
    config: CalculatorConfig,
}

impl LoanCalculator {
    pub fn new(config: CalculatorConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CalculatorConfig {
        &self.config
    }

    /// schedule only, no totals or baseline comparison
    pub fn generate_payment_schedule(
        &self,
        params: &LoanParameters,
        early_payments: &EarlyPayments,
    ) -> Result<Vec<PaymentEntry>> {
        generate_payment_schedule(params, early_payments, &self.config)
    }

    /// schedule, totals and savings against a run without early payments
    pub fn calculate(&self, params: &LoanParameters, early_payments: &EarlyPayments) -> Result<LoanResult> {
        params.validate()?;
        validate_early_payments(early_payments)?;

        debug!(
            "calculating loan: principal {} rate {} term {} months, {} early payments",
            params.principal,
            params.annual_rate,
            params.term_months,
            early_payments.len()
        );

        let generator = ScheduleGenerator::new(params, &self.config);
        let monthly_payment = generator.base_payment()?;
        let payment_schedule = generator.generate(early_payments)?;

        let totals = ScheduleTotals::from_entries(&payment_schedule)?;
        let total_interest = totals.interest_paid;
        let total_early_payment = totals.early_payments;
        let total_amount = add(
            add(params.principal, total_interest, "amount")?,
            total_early_payment,
            "amount",
        )?;

        let (final_savings, interest_savings) = if early_payments.is_empty() {
            (Money::ZERO, Money::ZERO)
        } else {
            let baseline = generator.generate(&EarlyPayments::new())?;
            let baseline_interest = ScheduleTotals::from_entries(&baseline)?.interest_paid;
            debug!(
                "baseline run: {} months, total interest {}",
                baseline.len(),
                baseline_interest
            );
            let baseline_amount = add(params.principal, baseline_interest, "baseline amount")?;
            (
                sub(baseline_amount, total_amount, "savings")?,
                sub(baseline_interest, total_interest, "interest savings")?,
            )
        };

        debug!(
            "loan calculated: {} months, total interest {}, final savings {}",
            payment_schedule.len(),
            total_interest,
            final_savings
        );

        Ok(LoanResult {
            monthly_payment,
            total_interest,
            total_amount,
            total_early_payment,
            final_savings,
            interest_savings,
            payment_schedule,
            principal: params.principal,
        })
    }
}

/// calculate a loan with the default configuration
pub fn calculate_loan(params: &LoanParameters, early_payments: &EarlyPayments) -> Result<LoanResult> {
    LoanCalculator::default().calculate(params, early_payments)
}

/// schedule a loan with the default configuration
pub fn generate_schedule(params: &LoanParameters, early_payments: &EarlyPayments) -> Result<Vec<PaymentEntry>> {
    LoanCalculator::default().generate_payment_schedule(params, early_payments)
}
