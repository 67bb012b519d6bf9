use rust_decimal::{Decimal, RoundingStrategy};

/// Currency amounts are carried at full precision and only rounded for display.
pub type Money = Decimal;

/// Round an amount to cents, half away from zero.
pub fn round_currency(amount: Money) -> Money {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_round_currency_half_away_from_zero() {
        assert_eq!(round_currency(dec!(7.5)), dec!(7.50));
        assert_eq!(round_currency(dec!(2.345)), dec!(2.35));
        assert_eq!(round_currency(dec!(2.344)), dec!(2.34));
        assert_eq!(round_currency(dec!(49.995)), dec!(50.00));
    }
}
