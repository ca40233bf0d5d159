use crate::args::{DependentsArgs, PitCalcArgs, PitCompareArgs};
use crate::commands::Out;
use crate::model::Vnd;
use crate::tax::pit::{self, Dependent, PitComparison, PitEstimate, DEPENDENT_INCOME_LIMIT};
use crate::Result;
use serde::Serialize;
use std::cmp::Ordering;

/// Monthly PIT under one year's rules.
pub async fn pit_calc(args: &PitCalcArgs) -> Result<Out<PitEstimate>> {
    let e = pit::estimate(args.year(), args.income(), args.dependents())?;
    let message = format!(
        "Thuế TNCN hàng tháng theo quy định {}\n{}",
        e.regime,
        estimate_lines(&e)
    );
    Ok(Out::new(message, e))
}

/// Monthly PIT under the 2025 and the 2026 rules side by side.
pub async fn pit_compare(args: &PitCompareArgs) -> Result<Out<PitComparison>> {
    let c = pit::compare(args.income(), args.dependents())?;
    let verdict = match c.savings.cmp(&Vnd::ZERO) {
        Ordering::Greater => format!(
            "Theo luật mới, bạn tiết kiệm được {} mỗi tháng.",
            c.savings.currency()
        ),
        Ordering::Less => format!(
            "Theo luật mới, bạn phải nộp thêm {} mỗi tháng.",
            (Vnd::ZERO - c.savings).currency()
        ),
        Ordering::Equal => "Số thuế phải nộp không thay đổi.".to_string(),
    };
    let message = format!(
        "Năm 2025\n{}\nNăm 2026\n{}\n{verdict}",
        estimate_lines(&c.current),
        estimate_lines(&c.proposed)
    );
    Ok(Out::new(message, c))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentReport {
    pub dependents: Vec<DependentCheck>,
    /// How many of the dependents can be claimed.
    pub eligible: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependentCheck {
    pub name: String,
    pub monthly_income: Vnd,
    pub eligible: bool,
}

/// Checks each dependent against the income limit.
pub async fn pit_dependents(args: &DependentsArgs) -> Result<Out<DependentReport>> {
    let dependents = args.dependents();
    let checks: Vec<DependentCheck> = dependents
        .iter()
        .map(|d| DependentCheck {
            name: d.name.clone(),
            monthly_income: d.monthly_income,
            eligible: d.is_eligible(),
        })
        .collect();
    let eligible = pit::eligible_count(dependents);

    let mut lines: Vec<String> = dependents.iter().map(dependent_line).collect();
    lines.push(format!(
        "{eligible}/{} người phụ thuộc đủ điều kiện giảm trừ.",
        dependents.len()
    ));
    Ok(Out::new(
        lines.join("\n"),
        DependentReport {
            dependents: checks,
            eligible,
        },
    ))
}

fn dependent_line(d: &Dependent) -> String {
    if d.is_eligible() {
        format!(
            "✓ {}: thu nhập {}/tháng, đủ điều kiện.",
            d.name,
            d.monthly_income.currency()
        )
    } else {
        format!(
            "✗ {}: thu nhập {}/tháng vượt mức {}. Không đủ điều kiện giảm trừ, có nguy cơ bị truy \
            thu thuế nếu vẫn đăng ký.",
            d.name,
            d.monthly_income.currency(),
            DEPENDENT_INCOME_LIMIT.currency()
        )
    }
}

fn estimate_lines(e: &PitEstimate) -> String {
    format!(
        "  Thu nhập:            {}\n  Giảm trừ gia cảnh:   {} ({} người phụ thuộc)\n  \
        Thu nhập tính thuế:  {}\n  Thuế phải nộp:       {}",
        e.income.currency(),
        e.deductions.currency(),
        e.dependents,
        e.taxable_income.currency(),
        e.tax.currency()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tax::pit::PitRegime;

    #[tokio::test]
    async fn test_pit_calc() {
        let args = PitCalcArgs::new(Vnd::from(50_000_000), 1, PitRegime::Y2026);
        let out = pit_calc(&args).await.unwrap();
        assert_eq!(out.structure().unwrap().tax, Vnd::from(3_245_000));
        assert!(out.message().contains("3.245.000 ₫"));
    }

    #[tokio::test]
    async fn test_pit_compare() {
        let out = pit_compare(&PitCompareArgs::new(Vnd::from(50_000_000), 1))
            .await
            .unwrap();
        let c = out.structure().unwrap();
        assert_eq!(c.savings, c.current.tax - c.proposed.tax);
        assert!(c.savings.is_positive());
        assert!(out.message().contains("tiết kiệm"));
    }

    #[tokio::test]
    async fn test_pit_dependents() {
        let args = DependentsArgs::new(vec![
            "Con=0".parse().unwrap(),
            "Mẹ=4.000.000".parse().unwrap(),
        ]);
        let out = pit_dependents(&args).await.unwrap();
        let report = out.structure().unwrap();
        assert_eq!(report.eligible, 1);
        assert!(!report.dependents[1].eligible);
        assert!(out.message().contains("truy thu"));
    }
}
