//! One-line calculators for common individual taxes.

use crate::model::{BusinessCategory, Vnd};
use crate::tax::hkd::{self, TaxQuote};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::Serialize;

pub const DIVIDEND_RATE: Decimal = dec!(0.05);
pub const SECURITIES_RATE: Decimal = dec!(0.001);
/// Proposed, not yet law.
pub const CRYPTO_RATE: Decimal = dec!(0.001);
pub const CAPITAL_TRANSFER_RATE: Decimal = dec!(0.20);
pub const REGISTRATION_FEE_RATE: Decimal = dec!(0.005);

/// A tax that is a single rate on a single base.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FlatTax {
    pub base: Vnd,
    pub rate: Decimal,
    pub tax: Vnd,
}

fn flat(base: Vnd, rate: Decimal) -> FlatTax {
    let tax = if base.is_positive() {
        base * rate
    } else {
        Vnd::ZERO
    };
    FlatTax { base, rate, tax }
}

/// VAT and PIT on individual business revenue.
pub fn business(revenue: Vnd, category: BusinessCategory) -> TaxQuote {
    hkd::quote(revenue, category)
}

/// VAT and PIT on rental income, at the asset rental rates.
pub fn rental(income: Vnd) -> TaxQuote {
    hkd::quote(income, BusinessCategory::AssetRental)
}

/// PIT on dividends and other capital investment income.
pub fn dividends(income: Vnd) -> FlatTax {
    flat(income, DIVIDEND_RATE)
}

/// PIT on the sale price of listed securities.
pub fn securities(sale_price: Vnd) -> FlatTax {
    flat(sale_price, SECURITIES_RATE)
}

/// Proposed tax on the sale price of digital assets.
pub fn crypto(sale_price: Vnd) -> FlatTax {
    flat(sale_price, CRYPTO_RATE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CapitalTransfer {
    pub profit: Vnd,
    pub tax: Vnd,
}

/// PIT on the profit from transferring a capital contribution. A loss owes nothing.
pub fn capital_transfer(sale_price: Vnd, cost_price: Vnd) -> CapitalTransfer {
    let profit = sale_price - cost_price;
    CapitalTransfer {
        profit,
        tax: flat(profit, CAPITAL_TRANSFER_RATE).tax,
    }
}

/// Registration fee on real estate, charged on the government price.
pub fn real_estate_fee(government_price: Vnd) -> FlatTax {
    flat(government_price, REGISTRATION_FEE_RATE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_rates() {
        assert_eq!(dividends(Vnd::from(10_000_000)).tax, Vnd::from(500_000));
        assert_eq!(securities(Vnd::from(100_000_000)).tax, Vnd::from(100_000));
        assert_eq!(crypto(Vnd::from(50_000_000)).tax, Vnd::from(50_000));
        assert_eq!(real_estate_fee(Vnd::from(2_000_000_000)).tax, Vnd::from(10_000_000));
    }

    #[test]
    fn test_non_positive_inputs() {
        assert_eq!(dividends(Vnd::ZERO).tax, Vnd::ZERO);
        assert_eq!(securities(Vnd::from(-10)).tax, Vnd::ZERO);
        assert_eq!(rental(Vnd::ZERO).total, Vnd::ZERO);
    }

    #[test]
    fn test_capital_transfer() {
        let gain = capital_transfer(Vnd::from(500_000_000), Vnd::from(300_000_000));
        assert_eq!(gain.profit, Vnd::from(200_000_000));
        assert_eq!(gain.tax, Vnd::from(40_000_000));

        let loss = capital_transfer(Vnd::from(100), Vnd::from(300));
        assert!(loss.profit.is_negative());
        assert_eq!(loss.tax, Vnd::ZERO);
    }

    #[test]
    fn test_rental_and_business() {
        let r = rental(Vnd::from(120_000_000));
        assert_eq!(r.vat, Vnd::from(6_000_000));
        assert_eq!(r.pit, Vnd::from(6_000_000));
        let b = business(Vnd::from(100_000_000), BusinessCategory::ConsumerServices);
        assert_eq!(b.total, Vnd::from(7_000_000));
    }
}
