use crate::args::{QuickArgs, QuickSubcommand};
use crate::commands::Out;
use crate::model::Vnd;
use crate::tax::hkd::TaxQuote;
use crate::tax::quick::{self, CapitalTransfer, FlatTax};
use crate::Result;
use rust_decimal::Decimal;
use serde::Serialize;

/// The outcome of one of the quick calculators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "result")]
pub enum QuickResult {
    Quote(TaxQuote),
    Flat(FlatTax),
    Capital(CapitalTransfer),
}

impl QuickResult {
    /// The amount payable, whichever calculator produced it.
    pub fn tax(&self) -> Vnd {
        match self {
            QuickResult::Quote(q) => q.total,
            QuickResult::Flat(f) => f.tax,
            QuickResult::Capital(c) => c.tax,
        }
    }
}

pub async fn quick(args: &QuickArgs) -> Result<Out<QuickResult>> {
    let (title, result) = match args.calculator() {
        QuickSubcommand::Business { revenue, category } => (
            format!("Thuế kinh doanh cá nhân ({})", category.label()),
            QuickResult::Quote(quick::business(*revenue, *category)),
        ),
        QuickSubcommand::Rental { income } => (
            "Thuế cho thuê tài sản".to_string(),
            QuickResult::Quote(quick::rental(*income)),
        ),
        QuickSubcommand::Dividends { income } => (
            "Thuế TNCN trên cổ tức".to_string(),
            QuickResult::Flat(quick::dividends(*income)),
        ),
        QuickSubcommand::Securities { sale_price } => (
            "Thuế TNCN chuyển nhượng chứng khoán".to_string(),
            QuickResult::Flat(quick::securities(*sale_price)),
        ),
        QuickSubcommand::Crypto { sale_price } => (
            "Thuế tài sản số (dự kiến)".to_string(),
            QuickResult::Flat(quick::crypto(*sale_price)),
        ),
        QuickSubcommand::Capital {
            sale_price,
            cost_price,
        } => (
            "Thuế TNCN chuyển nhượng vốn góp".to_string(),
            QuickResult::Capital(quick::capital_transfer(*sale_price, *cost_price)),
        ),
        QuickSubcommand::RealEstate { government_price } => (
            "Lệ phí trước bạ nhà đất".to_string(),
            QuickResult::Flat(quick::real_estate_fee(*government_price)),
        ),
    };

    let detail = match &result {
        QuickResult::Quote(q) => format!(
            "  Thuế GTGT:  {}\n  Thuế TNCN:  {}\n  Tổng thuế:  {}",
            q.vat.currency(),
            q.pit.currency(),
            q.total.currency()
        ),
        QuickResult::Flat(f) => format!(
            "  {} × {}% = {}",
            f.base.currency(),
            (f.rate * Decimal::ONE_HUNDRED).normalize(),
            f.tax.currency()
        ),
        QuickResult::Capital(c) => format!(
            "  Lợi nhuận:  {}\n  Thuế:       {}",
            c.profit.currency(),
            c.tax.currency()
        ),
    };
    Ok(Out::new(format!("{title}\n{detail}"), result))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BusinessCategory;

    async fn run(calculator: QuickSubcommand) -> Out<QuickResult> {
        quick(&QuickArgs::new(calculator)).await.unwrap()
    }

    #[tokio::test]
    async fn test_quick_calculators() {
        let out = run(QuickSubcommand::Business {
            revenue: Vnd::from(100_000_000),
            category: BusinessCategory::ConsumerServices,
        })
        .await;
        assert_eq!(out.structure().unwrap().tax(), Vnd::from(7_000_000));

        let out = run(QuickSubcommand::Securities {
            sale_price: Vnd::from(100_000_000),
        })
        .await;
        assert_eq!(out.structure().unwrap().tax(), Vnd::from(100_000));
        assert!(out.message().contains("× 0.1% = 100.000 ₫"));

        let out = run(QuickSubcommand::Capital {
            sale_price: Vnd::from(100),
            cost_price: Vnd::from(300),
        })
        .await;
        assert_eq!(out.structure().unwrap().tax(), Vnd::ZERO);
    }

    #[test]
    fn test_result_json_is_tagged() {
        let r = QuickResult::Flat(quick::dividends(Vnd::from(10_000_000)));
        let json = serde_json::to_value(r).unwrap();
        assert_eq!(json["kind"], "flat");
    }
}
