use rust_decimal::Decimal;

use crate::decimal::Money;
use crate::errors::{LoanError, Result};

/// fixed payment that amortises `balance` over `remaining_term` months
///
/// `monthly_rate` is a fraction (0.01 for 1% a month). A zero rate falls back
/// to straight-line repayment, and a zero term asks for the whole balance.
pub fn annuity_payment(balance: Money, monthly_rate: Decimal, remaining_term: u32) -> Result<Money> {
    if remaining_term == 0 {
        return Ok(balance);
    }

    if monthly_rate.is_zero() {
        return Ok(balance / Decimal::from(remaining_term));
    }

    // payment = B * r * (1 + r)^n / ((1 + r)^n - 1)
    let r = monthly_rate;
    let compound = compound_factor(r, remaining_term)?;

    let numerator = balance
        .as_decimal()
        .checked_mul(r)
        .and_then(|x| x.checked_mul(compound))
        .ok_or_else(|| overflow(balance, r, remaining_term))?;
    let denominator = compound - Decimal::ONE;

    let payment = numerator
        .checked_div(denominator)
        .ok_or_else(|| overflow(balance, r, remaining_term))?;

    Ok(Money::from_decimal(payment))
}

/// (1 + r)^n by repeated multiplication
fn compound_factor(r: Decimal, n: u32) -> Result<Decimal> {
    let base = Decimal::ONE + r;
    let mut compound = Decimal::ONE;
    for _ in 0..n {
        compound = compound
            .checked_mul(base)
            .ok_or_else(|| LoanError::CalculationError {
                message: format!("compound factor (1 + {})^{} overflows", r, n),
            })?;
    }
    Ok(compound)
}

fn overflow(balance: Money, r: Decimal, n: u32) -> LoanError {
    LoanError::CalculationError {
        message: format!(
            "annuity payment for balance {} at monthly rate {} over {} months overflows",
            balance, r, n
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_annuity_payment() {
        let payment = annuity_payment(Money::from_major(1_200_000), dec!(0.01), 12).unwrap();
        assert_eq!(payment.round_dp(2), Money::from_str_exact("106618.55").unwrap());
    }

    #[test]
    fn test_annuity_small_loan() {
        let payment = annuity_payment(Money::from_major(100_000), dec!(0.01), 12).unwrap();

        // approximate payment for 100k at 12% for 12 months
        assert!(payment > Money::from_major(8800));
        assert!(payment < Money::from_major(8900));
    }

    #[test]
    fn test_zero_rate_is_straight_line() {
        let payment = annuity_payment(Money::from_major(12_000), Decimal::ZERO, 12).unwrap();
        assert_eq!(payment, Money::from_major(1000));
    }

    #[test]
    fn test_zero_term_pays_everything() {
        let balance = Money::from_str_exact("1234.56").unwrap();
        assert_eq!(annuity_payment(balance, dec!(0.01), 0).unwrap(), balance);
    }

    #[test]
    fn test_single_month_term() {
        // one month: the balance plus one month of interest
        let payment = annuity_payment(Money::from_major(1000), dec!(0.01), 1).unwrap();
        assert_eq!(payment, Money::from_major(1010));
    }

    #[test]
    fn test_pure_function() {
        let first = annuity_payment(Money::from_major(350_000), dec!(0.00625), 240).unwrap();
        let second = annuity_payment(Money::from_major(350_000), dec!(0.00625), 240).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_overflow_is_reported() {
        let result = annuity_payment(Money::from_major(1_000_000), dec!(10), 600);
        assert!(matches!(result, Err(LoanError::CalculationError { .. })));
    }
}
