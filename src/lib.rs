pub mod calculator;
pub mod config;
pub mod decimal;
pub mod errors;
pub mod payments;
pub mod report;
pub mod serialization;
pub mod types;

// re-export key types
pub use calculator::{calculate_loan, generate_schedule, LoanCalculator, LoanResult, ScheduleTotals};
pub use config::{parse_date, CalculatorConfig, LoanParameters, LoanParametersBuilder};
pub use decimal::{Money, Rate};
pub use errors::{LoanError, Result};
pub use payments::{annuity_payment, generate_payment_schedule, ScheduleGenerator};
pub use report::LoanReport;
pub use serialization::{calculate_from_json, CalculationRequest, EarlyPaymentRequest};
pub use types::{EarlyPayment, EarlyPaymentMode, EarlyPayments, PaymentEntry};

// re-export external dependencies that users will need
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
