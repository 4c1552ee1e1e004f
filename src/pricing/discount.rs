//! Percentage discount applied to beneficiary prices
//!
//! Discounts only affect what is displayed and charged; plan admission never
//! depends on them.

/// Round half away from zero to cents
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

/// Effective discount: None for absent, zero, negative or NaN percentages
pub fn effective_percent(discount_percent: Option<f64>) -> Option<f64> {
    discount_percent.filter(|d| *d > 0.0)
}

/// Discounted price, never negative: `max(0, p - p*d/100)`
pub fn apply_discount(price: f64, discount_percent: f64) -> f64 {
    (price - price * discount_percent / 100.0).max(0.0)
}

/// Gross/discount/net split of one amount
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscountBreakdown {
    pub gross: f64,
    pub discount: f64,
    pub net: f64,
}

impl DiscountBreakdown {
    pub fn of(price: f64, discount_percent: Option<f64>) -> Self {
        match effective_percent(discount_percent) {
            Some(pct) => {
                let net = apply_discount(price, pct);
                Self {
                    gross: price,
                    discount: price - net,
                    net,
                }
            }
            None => Self {
                gross: price,
                discount: 0.0,
                net: price,
            },
        }
    }

    /// Sum of per-line breakdowns
    pub fn total<I: IntoIterator<Item = DiscountBreakdown>>(lines: I) -> Self {
        lines.into_iter().fold(
            Self { gross: 0.0, discount: 0.0, net: 0.0 },
            |acc, line| Self {
                gross: acc.gross + line.gross,
                discount: acc.discount + line.discount,
                net: acc.net + line.net,
            },
        )
    }
}
