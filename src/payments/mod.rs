pub mod annuity;
pub mod schedule;

pub use annuity::annuity_payment;
pub use schedule::{generate_payment_schedule, ScheduleGenerator, DAYS_PER_PERIOD};
