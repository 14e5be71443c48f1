use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::calculator::{add, LoanResult, ScheduleTotals};
use crate::config::{CalculatorConfig, LoanParameters};
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::PaymentEntry;

/// three-section report: inputs, full schedule with totals, summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoanReport {
    pub parameters: ParametersSection,
    pub schedule: ScheduleSection,
    pub summary: SummarySection,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParametersSection {
    pub principal: Money,
    pub annual_rate_percent: Decimal,
    pub term_months: u32,
    pub start_date: NaiveDate,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleSection {
    pub rows: Vec<PaymentEntry>,
    pub totals: TotalsRow,
}

/// column sums; the balance column of a fully repaid loan totals to zero
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TotalsRow {
    pub scheduled_payments: Money,
    pub early_payments: Money,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub remaining_balance: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummarySection {
    pub monthly_payment: Money,
    pub total_interest: Money,
    pub total_early_payment: Money,
    pub total_principal_paid: Money,
    pub total_to_pay: Money,
    /// rough monthly income needed to carry the payment
    pub required_monthly_income: Money,
}

impl LoanReport {
    pub fn build(params: &LoanParameters, result: &LoanResult, config: &CalculatorConfig) -> Result<Self> {
        let totals = ScheduleTotals::from_entries(&result.payment_schedule)?;
        let total_to_pay = add(
            add(totals.principal_paid, totals.interest_paid, "to pay")?,
            totals.early_payments,
            "to pay",
        )?;
        let required_monthly_income = required_income(result, config)?;

        let monthly_payment = first_payment(result);

        Ok(LoanReport {
            parameters: ParametersSection {
                principal: params.principal,
                annual_rate_percent: params.annual_rate.as_percentage().normalize(),
                term_months: params.term_months,
                start_date: params.start_date,
            },
            schedule: ScheduleSection {
                rows: result.payment_schedule.clone(),
                totals: TotalsRow {
                    scheduled_payments: totals.scheduled_payments,
                    early_payments: totals.early_payments,
                    principal_paid: totals.principal_paid,
                    interest_paid: totals.interest_paid,
                    remaining_balance: Money::ZERO,
                },
            },
            summary: SummarySection {
                monthly_payment,
                total_interest: totals.interest_paid,
                total_early_payment: totals.early_payments,
                total_principal_paid: totals.principal_paid,
                total_to_pay,
                required_monthly_income,
            },
        })
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn first_payment(result: &LoanResult) -> Money {
    result
        .payment_schedule
        .first()
        .map(|entry| entry.scheduled_payment)
        .unwrap_or(Money::ZERO)
}

fn required_income(result: &LoanResult, config: &CalculatorConfig) -> Result<Money> {
    first_payment(result)
        .checked_mul(config.affordability_multiplier)
        .ok_or_else(|| LoanError::CalculationError {
            message: "required monthly income overflows".to_string(),
        })
}
