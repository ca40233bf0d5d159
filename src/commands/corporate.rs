use crate::args::CorporateEstimateArgs;
use crate::commands::Out;
use crate::model::Vnd;
use crate::tax::corporate::{self, CorporateEstimate, TaxIncentive, STANDARD_RATE};
use crate::Result;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CorporateReport {
    pub estimate: CorporateEstimate,
    pub year_of_income: Option<u32>,
    /// The estimate after exemptions and reductions for `year_of_income`, or the plain estimate.
    pub tax_due: Vnd,
}

/// Corporate income tax on revenue less expenses at the sector's rate.
pub async fn corporate_estimate(args: &CorporateEstimateArgs) -> Result<Out<CorporateReport>> {
    let estimate = corporate::estimate(args.revenue(), args.expenses(), args.sector());
    let tax_due = match args.year_of_income() {
        Some(year) => estimate.tax_for_year(year),
        None => estimate.tax,
    };

    let mut lines = vec![
        format!("Lĩnh vực:            {}", estimate.sector.label()),
        format!("Thu nhập tính thuế:  {}", estimate.taxable_income.currency()),
        format!("Thuế suất:           {}%", percent(estimate.rate)),
        format!("Thuế TNDN:           {}", estimate.tax.currency()),
    ];
    if let Some(year) = args.year_of_income() {
        lines.push(format!(
            "Năm có thu nhập thứ {year}, sau miễn giảm: {}",
            tax_due.currency()
        ));
    }
    if let Some(incentive) = &estimate.incentive {
        lines.push(format!("Ưu đãi: {}", incentive.conditions));
    }

    Ok(Out::new(
        lines.join("\n"),
        CorporateReport {
            year_of_income: args.year_of_income(),
            tax_due,
            estimate,
        },
    ))
}

/// The sectors with a preferential rate or an exemption schedule.
pub async fn corporate_incentives() -> Result<Out<Vec<TaxIncentive>>> {
    let incentives = corporate::incentives().to_vec();
    let mut lines = Vec::new();
    for i in &incentives {
        let rate = i.preferential_rate.unwrap_or(STANDARD_RATE);
        lines.push(format!(
            "{} [{}]: thuế suất {}%, miễn {} năm, giảm 50% trong {} năm\n  {}",
            i.sector.label(),
            i.sector,
            percent(rate),
            i.exemption_years,
            i.reduction_years,
            i.conditions
        ));
    }
    Ok(Out::new(lines.join("\n"), incentives))
}

fn percent(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).normalize()
}
