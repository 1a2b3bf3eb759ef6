use rust_decimal::Decimal;

/// Monetary amounts are non-negative decimals with two-place precision.
pub type Price = Decimal;

/// Round to the two-place precision mandated by the data model (§3, amounts).
pub fn round_price(value: Price) -> Price {
    value.round_dp(2)
}
