use chrono::NaiveDate;
use hourglass_rs::{SafeTimeProvider, TimeSource};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::decimal::{Money, Rate};
use crate::errors::{LoanError, Result};

/// date format accepted for start dates and emitted for payment dates
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// longest accepted loan term, 100 years
pub const MAX_TERM_MONTHS: u32 = 1200;

/// calculator configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalculatorConfig {
    /// balances at or below this are treated as settled
    pub settlement_epsilon: Money,
    /// the loop gives up after `iteration_limit_factor * term_months` months
    pub iteration_limit_factor: u32,
    /// required monthly income as a multiple of the monthly payment
    pub affordability_multiplier: Decimal,
}

impl Default for CalculatorConfig {
    fn default() -> Self {
        Self {
            settlement_epsilon: Money::CENT,
            iteration_limit_factor: 3,
            affordability_multiplier: dec!(2.5),
        }
    }
}

impl CalculatorConfig {
    pub fn validate(&self) -> Result<()> {
        if self.settlement_epsilon.is_negative() {
            return Err(LoanError::InvalidConfiguration {
                message: format!("settlement epsilon must not be negative: {}", self.settlement_epsilon),
            });
        }

        if self.iteration_limit_factor == 0 {
            return Err(LoanError::InvalidConfiguration {
                message: "iteration limit factor must be at least 1".to_string(),
            });
        }

        if self.affordability_multiplier < Decimal::ZERO {
            return Err(LoanError::InvalidConfiguration {
                message: format!(
                    "affordability multiplier must not be negative: {}",
                    self.affordability_multiplier
                ),
            });
        }

        Ok(())
    }

    /// hard cap on simulated months for a loan of the given term
    pub fn iteration_limit(&self, term_months: u32) -> u32 {
        term_months.saturating_mul(self.iteration_limit_factor)
    }
}

/// immutable loan inputs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanParameters {
    pub principal: Money,
    pub annual_rate: Rate,
    pub term_months: u32,
    pub start_date: NaiveDate,
}

impl LoanParameters {
    /// create validated parameters
    pub fn new(
        principal: Money,
        annual_rate: Rate,
        term_months: u32,
        start_date: NaiveDate,
    ) -> Result<Self> {
        let params = Self {
            principal,
            annual_rate,
            term_months,
            start_date,
        };
        params.validate()?;
        Ok(params)
    }

    pub fn builder() -> LoanParametersBuilder {
        LoanParametersBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.principal.is_positive() {
            return Err(LoanError::invalid_input(
                "principal",
                format!("must be positive, got {}", self.principal),
            ));
        }

        if self.principal > Money::MAX_AMOUNT {
            return Err(LoanError::invalid_input(
                "principal",
                format!("must not exceed {}, got {}", Money::MAX_AMOUNT, self.principal),
            ));
        }

        if self.term_months == 0 {
            return Err(LoanError::invalid_input("term_months", "must be positive, got 0"));
        }

        if self.term_months > MAX_TERM_MONTHS {
            return Err(LoanError::invalid_input(
                "term_months",
                format!("must not exceed {}, got {}", MAX_TERM_MONTHS, self.term_months),
            ));
        }

        if self.annual_rate.is_negative() {
            return Err(LoanError::invalid_input(
                "annual_rate_percent",
                format!("must not be negative, got {}", self.annual_rate),
            ));
        }

        Ok(())
    }

    /// monthly rate as a fraction
    pub fn monthly_rate(&self) -> Decimal {
        self.annual_rate.monthly_rate().as_decimal()
    }
}

/// parse a `YYYY-MM-DD` date
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_FORMAT).map_err(|e| LoanError::InvalidDate {
        message: format!("{:?} is not a YYYY-MM-DD date: {}", value, e),
    })
}

/// builder for loan parameters
#[derive(Debug, Clone, Default)]
pub struct LoanParametersBuilder {
    principal: Option<Money>,
    annual_rate: Option<Rate>,
    term_months: Option<u32>,
    start_date: Option<NaiveDate>,
    start_date_str: Option<String>,
}

impl LoanParametersBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn principal(mut self, principal: Money) -> Self {
        self.principal = Some(principal);
        self
    }

    /// annual rate in percent, e.g. `dec!(12)` for 12%
    pub fn annual_rate_percent(mut self, percent: Decimal) -> Self {
        self.annual_rate = Some(Rate::from_percentage(percent));
        self
    }

    pub fn rate(mut self, rate: Rate) -> Self {
        self.annual_rate = Some(rate);
        self
    }

    pub fn term_months(mut self, months: u32) -> Self {
        self.term_months = Some(months);
        self
    }

    pub fn start_date(mut self, date: NaiveDate) -> Self {
        self.start_date = Some(date);
        self.start_date_str = None;
        self
    }

    /// start date as `YYYY-MM-DD`, parsed at build time
    pub fn start_date_str(mut self, date: impl Into<String>) -> Self {
        self.start_date_str = Some(date.into());
        self.start_date = None;
        self
    }

    /// build with system time as the default start date
    pub fn build(self) -> Result<LoanParameters> {
        let time = SafeTimeProvider::new(TimeSource::System);
        self.build_with_time(&time)
    }

    /// build with an explicit time provider for the default start date
    pub fn build_with_time(self, time_provider: &SafeTimeProvider) -> Result<LoanParameters> {
        let principal = self
            .principal
            .ok_or_else(|| LoanError::invalid_input("principal", "required"))?;

        let annual_rate = self.annual_rate.unwrap_or(Rate::ZERO);

        let term_months = self
            .term_months
            .ok_or_else(|| LoanError::invalid_input("term_months", "required"))?;

        let start_date = match (self.start_date, self.start_date_str) {
            (Some(date), _) => date,
            (None, Some(raw)) => parse_date(&raw)?,
            (None, None) => time_provider.now().date_naive(),
        };

        LoanParameters::new(principal, annual_rate, term_months, start_date)
    }
}
