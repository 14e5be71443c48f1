use chrono::{Days, NaiveDate};
use log::{debug, trace, warn};
use rust_decimal::Decimal;

use crate::config::{CalculatorConfig, LoanParameters, MAX_TERM_MONTHS};
use crate::decimal::Money;
use crate::errors::{LoanError, Result};
use crate::types::{validate_early_payments, EarlyPayment, EarlyPaymentMode, EarlyPayments, PaymentEntry};

use super::annuity::annuity_payment;

/// payment dates step by fixed 30-day months
pub const DAYS_PER_PERIOD: u64 = 30;

/// loop state carried from one simulated month to the next
#[derive(Debug, Clone, PartialEq)]
struct ScheduleState {
    month: u32,
    remaining_balance: Money,
    current_payment: Money,
    remaining_term: u32,
}

/// per-period simulation of an annuity loan with early payments
pub struct ScheduleGenerator<'a> {
    params: &'a LoanParameters,
    config: &'a CalculatorConfig,
    monthly_rate: Decimal,
}

impl<'a> ScheduleGenerator<'a> {
    pub fn new(params: &'a LoanParameters, config: &'a CalculatorConfig) -> Self {
        Self {
            params,
            config,
            monthly_rate: params.monthly_rate(),
        }
    }

    /// payment over the full term with no early payments
    pub fn base_payment(&self) -> Result<Money> {
        annuity_payment(self.params.principal, self.monthly_rate, self.params.term_months)
    }

    /// run the simulation until the balance is settled
    pub fn generate(&self, early_payments: &EarlyPayments) -> Result<Vec<PaymentEntry>> {
        let state = ScheduleState {
            month: 1,
            remaining_balance: self.params.principal,
            current_payment: self.base_payment()?,
            remaining_term: self.params.term_months,
        };

        let schedule = self.run(state, early_payments)?;

        let last_month = schedule.last().map(|entry| entry.month).unwrap_or(0);
        let unused: Vec<u32> = early_payments
            .range(last_month.saturating_add(1)..)
            .filter(|(_, payment)| payment.is_effective())
            .map(|(month, _)| *month)
            .collect();
        if !unused.is_empty() {
            warn!(
                "early payments for months {:?} fall after the loan is repaid in month {}",
                unused, last_month
            );
        }

        Ok(schedule)
    }

    fn run(&self, mut state: ScheduleState, early_payments: &EarlyPayments) -> Result<Vec<PaymentEntry>> {
        let epsilon = self.config.settlement_epsilon;
        let limit = self.config.iteration_limit(self.params.term_months);

        let mut schedule = Vec::with_capacity(self.params.term_months.min(MAX_TERM_MONTHS) as usize);
        let mut iterations = 0;

        while state.remaining_balance > epsilon {
            if iterations >= limit {
                warn!(
                    "schedule stopped after {} months with {} still outstanding",
                    iterations, state.remaining_balance
                );
                return Err(LoanError::NonConvergent {
                    iterations,
                    remaining_balance: state.remaining_balance,
                });
            }
            iterations += 1;

            let early = early_payments
                .get(&state.month)
                .filter(|payment| payment.is_effective());

            let entry = self.apply_month(&mut state, early)?;
            schedule.push(entry);

            if state.remaining_balance.is_zero() {
                break;
            }

            self.advance(&mut state, early)?;
        }

        Ok(schedule)
    }

    /// accrue interest, retire principal and emit the month's entry
    fn apply_month(&self, state: &mut ScheduleState, early: Option<&EarlyPayment>) -> Result<PaymentEntry> {
        let month = state.month;
        let payment_date = self.payment_date(month)?;
        let interest_paid = state
            .remaining_balance
            .checked_mul(self.monthly_rate)
            .ok_or_else(|| overflow("interest", month))?;

        let mut principal_paid = if self.monthly_rate.is_zero() {
            state.current_payment
        } else {
            state
                .current_payment
                .checked_sub(interest_paid)
                .ok_or_else(|| overflow("principal", month))?
        };

        // both modes retire the full early amount this month
        let early_payment = early.map(|payment| payment.amount).unwrap_or(Money::ZERO);
        principal_paid = principal_paid
            .checked_add(early_payment)
            .ok_or_else(|| overflow("principal", month))?;

        if principal_paid > state.remaining_balance {
            principal_paid = state.remaining_balance;
        }

        state.remaining_balance = state
            .remaining_balance
            .checked_sub(principal_paid)
            .ok_or_else(|| overflow("remaining balance", month))?;
        if state.remaining_balance <= self.config.settlement_epsilon {
            state.remaining_balance = Money::ZERO;
        }

        trace!(
            "month {}: payment {} early {} principal {} interest {} balance {}",
            state.month,
            state.current_payment,
            early_payment,
            principal_paid,
            interest_paid,
            state.remaining_balance
        );

        Ok(PaymentEntry {
            month: state.month,
            payment_date,
            scheduled_payment: state.current_payment,
            early_payment,
            principal_paid,
            interest_paid,
            remaining_balance: state.remaining_balance,
        })
    }

    /// move to the next month, re-amortising after a term-reducing early payment
    fn advance(&self, state: &mut ScheduleState, early: Option<&EarlyPayment>) -> Result<()> {
        state.month += 1;
        state.remaining_term = state.remaining_term.saturating_sub(1);

        let Some(early) = early else {
            return Ok(());
        };

        match early.mode {
            EarlyPaymentMode::ReduceTerm => {
                if state.remaining_balance > self.config.settlement_epsilon {
                    let recalculated =
                        annuity_payment(state.remaining_balance, self.monthly_rate, state.remaining_term)?;
                    debug!(
                        "payment recalculated from {} to {} over {} remaining months",
                        state.current_payment, recalculated, state.remaining_term
                    );
                    state.current_payment = recalculated;
                }
            }
            // the nominal payment is left as it is
            EarlyPaymentMode::ReducePayment => {}
        }

        Ok(())
    }

    fn payment_date(&self, month: u32) -> Result<NaiveDate> {
        let offset = DAYS_PER_PERIOD * u64::from(month - 1);
        self.params
            .start_date
            .checked_add_days(Days::new(offset))
            .ok_or_else(|| LoanError::InvalidDate {
                message: format!(
                    "payment date for month {} is out of range from {}",
                    month, self.params.start_date
                ),
            })
    }
}

fn overflow(what: &str, month: u32) -> LoanError {
    LoanError::CalculationError {
        message: format!("{} overflows in month {}", what, month),
    }
}

/// generate the month-by-month schedule for a loan
pub fn generate_payment_schedule(
    params: &LoanParameters,
    early_payments: &EarlyPayments,
    config: &CalculatorConfig,
) -> Result<Vec<PaymentEntry>> {
    config.validate()?;
    params.validate()?;
    validate_early_payments(early_payments)?;
    ScheduleGenerator::new(params, config).generate(early_payments)
}
