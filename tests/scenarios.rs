use loan_schedule_rs::chrono::{NaiveDate, TimeZone, Utc};
use loan_schedule_rs::{
    calculate_from_json, calculate_loan, CalculatorConfig, EarlyPayment, EarlyPayments,
    LoanError, LoanParameters, LoanReport, LoanResult, Money, SafeTimeProvider, TimeSource,
};
use rust_decimal_macros::dec;

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn scenario_loan() -> LoanParameters {
    LoanParameters::builder()
        .principal(Money::from_major(1_200_000))
        .annual_rate_percent(dec!(12))
        .term_months(12)
        .start_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
        .build()
        .unwrap()
}

fn close(actual: Money, expected: &str) -> bool {
    (actual - Money::from_str_exact(expected).unwrap()).abs() < Money::CENT
}

#[test]
fn test_twelve_month_loan_without_early_payments() {
    init_logging();
    let result = calculate_loan(&scenario_loan(), &EarlyPayments::new()).unwrap();

    assert!(close(result.monthly_payment, "106618.55"));
    assert!(close(result.total_interest, "79422.56"));
    assert_eq!(result.payment_schedule.len(), 12);
    assert_eq!(result.payment_schedule.last().unwrap().remaining_balance, Money::ZERO);
    assert_eq!(result.final_savings, Money::ZERO);
}

#[test]
fn test_reduce_term_early_payment_in_month_six() {
    init_logging();
    let params = scenario_loan();
    let baseline = calculate_loan(&params, &EarlyPayments::new()).unwrap();

    let mut early = EarlyPayments::new();
    early.insert(6, EarlyPayment::reduce_term(Money::from_major(200_000)));
    let result = calculate_loan(&params, &early).unwrap();

    // month 6 retires the scheduled principal plus the whole early amount
    let scheduled_principal = baseline.payment_schedule[5].principal_paid;
    let month_six = &result.payment_schedule[5];
    assert_eq!(month_six.month, 6);
    assert_eq!(month_six.principal_paid, scheduled_principal + Money::from_major(200_000));

    // re-amortised over the remaining term: same length, lower payment, less interest
    assert!(result.payment_schedule.len() <= 12);
    assert!(result.payment_schedule[6].scheduled_payment < result.monthly_payment);
    assert!(result.interest_savings > Money::ZERO);
    assert!(result.total_interest < baseline.total_interest);
    assert_eq!(result.payment_schedule.last().unwrap().remaining_balance, Money::ZERO);
}

#[test]
fn test_reduce_payment_finishes_no_later_than_reduce_term() {
    init_logging();
    let params = scenario_loan();

    let mut term_mode = EarlyPayments::new();
    term_mode.insert(6, EarlyPayment::reduce_term(Money::from_major(200_000)));
    let mut payment_mode = EarlyPayments::new();
    payment_mode.insert(6, EarlyPayment::reduce_payment(Money::from_major(200_000)));

    let reduce_term = calculate_loan(&params, &term_mode).unwrap();
    let reduce_payment = calculate_loan(&params, &payment_mode).unwrap();

    assert_eq!(reduce_term.payment_schedule.len(), 12);
    assert_eq!(reduce_payment.payment_schedule.len(), 11);
    assert!(reduce_payment.total_interest < reduce_term.total_interest);
    assert!(reduce_term.interest_savings > Money::ZERO);
    assert!(reduce_payment.interest_savings > reduce_term.interest_savings);
}

#[test]
fn test_early_payment_larger_than_balance() {
    init_logging();
    let params = scenario_loan();
    let mut early = EarlyPayments::new();
    early.insert(4, EarlyPayment::reduce_payment(Money::from_major(5_000_000)));

    let result = calculate_loan(&params, &early).unwrap();

    assert_eq!(result.payment_schedule.len(), 4);
    let before = result.payment_schedule[2].remaining_balance;
    let last = &result.payment_schedule[3];
    assert_eq!(last.principal_paid, before);
    assert_eq!(last.remaining_balance, Money::ZERO);
    assert!(result.payment_schedule.iter().all(|entry| !entry.remaining_balance.is_negative()));
}

#[test]
fn test_json_round_trip_through_calculator() {
    init_logging();
    let time = SafeTimeProvider::new(TimeSource::Test(
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    ));
    let json = r#"{
        "principal": 1200000,
        "rate": 12,
        "term_months": 12,
        "early_payments": {"6": {"amount": 200000, "mode": "reduce_term"}}
    }"#;

    let result = calculate_from_json(json, &time, &CalculatorConfig::default()).unwrap();

    assert_eq!(result.total_early_payment, Money::from_major(200_000));
    assert_eq!(
        result.payment_schedule[0].payment_date,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    );

    let output = result.to_json_pretty().unwrap();
    let decoded: LoanResult = serde_json::from_str(&output).unwrap();
    assert_eq!(decoded, result);
}

#[test]
fn test_json_rejects_invalid_input() {
    let time = SafeTimeProvider::new(TimeSource::System);
    let json = r#"{"principal": -5, "rate": 12, "term_months": 12}"#;

    let result = calculate_from_json(json, &time, &CalculatorConfig::default());
    assert!(matches!(result, Err(LoanError::InvalidInput { .. })));
}

#[test]
fn test_report_for_scenario_loan() {
    let params = scenario_loan();
    let result = calculate_loan(&params, &EarlyPayments::new()).unwrap();
    let report = LoanReport::build(&params, &result, &CalculatorConfig::default()).unwrap();

    assert_eq!(report.schedule.rows.len(), 12);
    assert!((report.schedule.totals.principal_paid - params.principal).abs() <= Money::CENT);
    assert!(close(report.summary.required_monthly_income, "266546.37"));
}
