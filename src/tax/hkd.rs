//! Household business (HKD) taxation: group classification, per-category rates, the Group 1
//! threshold tracker, the Group 2 period summary and the 01/CNKD declaration aggregate.

use crate::model::{
    BusinessCategory, BusinessSector, InputInvoice, Period, Transaction, UserProfile, Vnd,
};
use crate::Result;
use anyhow::ensure;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Annual revenue at or below this is Group 1 and exempt from VAT and PIT.
pub const GROUP1_THRESHOLD: Vnd = Vnd::new(dec!(200000000));
/// Annual revenue above this is Group 3 and requires full accounting.
pub const GROUP2_THRESHOLD: Vnd = Vnd::new(dec!(3000000000));
/// Retail and restaurant businesses above this must issue e-invoices from cash registers.
pub const E_INVOICE_THRESHOLD: Vnd = Vnd::new(dec!(1000000000));
/// Percent of the Group 1 threshold at which the tracker starts warning.
const APPROACHING_PERCENT: Decimal = dec!(90);

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum HkdGroup {
    Group1,
    Group2,
    Group3,
    #[default]
    Undetermined,
}

serde_plain::derive_display_from_serialize!(HkdGroup);
serde_plain::derive_fromstr_from_deserialize!(HkdGroup);

impl HkdGroup {
    pub fn label(&self) -> &'static str {
        match self {
            HkdGroup::Group1 => "Nhóm 1 (≤ 200 triệu/năm)",
            HkdGroup::Group2 => "Nhóm 2 (200 triệu - 3 tỷ/năm)",
            HkdGroup::Group3 => "Nhóm 3 (> 3 tỷ/năm)",
            HkdGroup::Undetermined => "Chưa xác định",
        }
    }
}

/// Maps annual revenue to its group. Both thresholds belong to the lower group.
pub fn classify(revenue: Vnd) -> HkdGroup {
    if revenue <= GROUP1_THRESHOLD {
        HkdGroup::Group1
    } else if revenue <= GROUP2_THRESHOLD {
        HkdGroup::Group2
    } else {
        HkdGroup::Group3
    }
}

/// The VAT and PIT rates applied to revenue of one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rates {
    pub vat: Decimal,
    pub pit: Decimal,
}

impl Rates {
    pub fn total(&self) -> Decimal {
        self.vat + self.pit
    }
}

pub fn rates(category: BusinessCategory) -> Rates {
    let (vat, pit) = match category {
        BusinessCategory::Distribution => (dec!(0.01), dec!(0.005)),
        BusinessCategory::LodgingAndCatering
        | BusinessCategory::ConsumerServices
        | BusinessCategory::ConstructionNoMaterials
        | BusinessCategory::Brokerage => (dec!(0.05), dec!(0.02)),
        BusinessCategory::ConstructionWithMaterials | BusinessCategory::ProductionTransport => {
            (dec!(0.03), dec!(0.015))
        }
        BusinessCategory::AssetRental => (dec!(0.05), dec!(0.05)),
        BusinessCategory::Other => (dec!(0.02), dec!(0.01)),
    };
    Rates { vat, pit }
}

/// The revenue line of the 01/CNKD form that a category is reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Indicator {
    #[serde(rename = "28")]
    Ct28,
    #[serde(rename = "29")]
    Ct29,
    #[serde(rename = "30")]
    Ct30,
    #[serde(rename = "31")]
    Ct31,
}

serde_plain::derive_display_from_serialize!(Indicator);

impl Indicator {
    pub const ALL: [Indicator; 4] = [
        Indicator::Ct28,
        Indicator::Ct29,
        Indicator::Ct30,
        Indicator::Ct31,
    ];

    /// The bracketed code as printed on the form, e.g. `[28]`.
    pub fn code(&self) -> String {
        format!("[{self}]")
    }
}

pub fn indicator(category: BusinessCategory) -> Indicator {
    match category {
        BusinessCategory::Distribution => Indicator::Ct28,
        BusinessCategory::LodgingAndCatering
        | BusinessCategory::ConsumerServices
        | BusinessCategory::ConstructionNoMaterials
        | BusinessCategory::AssetRental
        | BusinessCategory::Brokerage => Indicator::Ct29,
        BusinessCategory::ConstructionWithMaterials | BusinessCategory::ProductionTransport => {
            Indicator::Ct30
        }
        BusinessCategory::Other => Indicator::Ct31,
    }
}

/// The tax due on some revenue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TaxQuote {
    pub vat: Vnd,
    pub pit: Vnd,
    pub total: Vnd,
}

impl TaxQuote {
    pub const ZERO: TaxQuote = TaxQuote {
        vat: Vnd::ZERO,
        pit: Vnd::ZERO,
        total: Vnd::ZERO,
    };
}

/// Applies the category's rates to `revenue`. Non-positive revenue owes nothing.
pub fn quote(revenue: Vnd, category: BusinessCategory) -> TaxQuote {
    if !revenue.is_positive() {
        return TaxQuote::ZERO;
    }
    let r = rates(category);
    let vat = revenue * r.vat;
    let pit = revenue * r.pit;
    TaxQuote {
        vat,
        pit,
        total: vat + pit,
    }
}

/// Where a Group 1 business stands relative to the tax-free threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThresholdStatus {
    Safe,
    Approaching,
    Over,
}

serde_plain::derive_display_from_serialize!(ThresholdStatus);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Group1Tracker {
    pub revenue: Vnd,
    /// Revenue as a percentage of the threshold, not capped at 100.
    pub progress_percent: Decimal,
    pub status: ThresholdStatus,
    /// How much more revenue fits under the threshold, never negative.
    pub remaining: Vnd,
}

impl Group1Tracker {
    pub fn new(revenue: Vnd) -> Self {
        let progress_percent =
            (revenue.value() / GROUP1_THRESHOLD.value() * dec!(100)).round_dp(2);
        let status = if revenue > GROUP1_THRESHOLD {
            ThresholdStatus::Over
        } else if progress_percent >= APPROACHING_PERCENT {
            ThresholdStatus::Approaching
        } else {
            ThresholdStatus::Safe
        };
        Self {
            revenue,
            progress_percent,
            status,
            remaining: (GROUP1_THRESHOLD - revenue).non_negative(),
        }
    }

    pub fn message(&self) -> String {
        match self.status {
            ThresholdStatus::Over => {
                "Bạn đã vượt ngưỡng miễn thuế. Cần kê khai theo Nhóm 2.".to_string()
            }
            ThresholdStatus::Approaching => format!(
                "Cảnh báo: Doanh thu sắp chạm ngưỡng miễn thuế. Bạn còn cách ngưỡng {} đồng.",
                self.remaining
            ),
            ThresholdStatus::Safe => format!(
                "Bạn còn cách ngưỡng phải nộp thuế (Nhóm 2) {} đồng.",
                self.remaining
            ),
        }
    }
}

/// Revenue, cost and tax over one period for a Group 2 business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodSummary {
    pub revenue: Vnd,
    pub expenses: Vnd,
    pub profit_before_tax: Vnd,
    pub tax: Vnd,
    pub net_profit: Vnd,
}

impl PeriodSummary {
    /// Summarizes the given, already period-filtered, revenue and expenses.
    pub fn new<'a, 'b>(
        revenue: impl IntoIterator<Item = &'a Transaction>,
        expenses: impl IntoIterator<Item = &'b InputInvoice>,
    ) -> Self {
        let mut total_revenue = Vnd::ZERO;
        let mut tax = Vnd::ZERO;
        for t in revenue {
            total_revenue += t.amount();
            tax += t.amount() * rates(t.category()).total();
        }
        let expenses: Vnd = expenses.into_iter().map(InputInvoice::amount).sum();
        let profit_before_tax = total_revenue - expenses;
        Self {
            revenue: total_revenue,
            expenses,
            profit_before_tax,
            tax,
            net_profit: profit_before_tax - tax,
        }
    }
}

/// Compliance warnings shown on the HKD dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case", tag = "kind")]
pub enum Warning {
    /// Revenue is above the Group 2 ceiling.
    MoveToGroup3 { revenue: Vnd },
    /// A retail or restaurant business above the e-invoice threshold.
    EInvoiceRequired { annual_revenue: Vnd },
    /// The profile has no personal identification number.
    MissingPersonalId,
}

impl Warning {
    pub fn message(&self) -> String {
        match self {
            Warning::MoveToGroup3 { revenue } => format!(
                "Doanh thu {} đã vượt 3 tỷ đồng/năm. Từ 01/01/2026 bạn phải chuyển sang Nhóm 3 và vận hành như một doanh nghiệp siêu nhỏ với hệ thống kế toán đầy đủ.",
                revenue.currency()
            ),
            Warning::EInvoiceRequired { annual_revenue } => format!(
                "Doanh thu năm {} đã vượt 1 tỷ đồng. Hộ kinh doanh bán lẻ, ăn uống bắt buộc phải sử dụng hóa đơn điện tử khởi tạo từ máy tính tiền.",
                annual_revenue.currency()
            ),
            Warning::MissingPersonalId => "Từ 14/10/2025, mọi tờ khai HKD (bao gồm cả Q4/2025) bắt buộc phải có trường \"Định danh cá nhân\". Vui lòng cập nhật hồ sơ của bạn.".to_string(),
        }
    }
}

/// Collects the warnings that apply given the revenue of the calendar year, the business sector
/// and the stored profile.
pub fn warnings(
    annual_revenue: Vnd,
    sector: Option<BusinessSector>,
    profile: Option<&UserProfile>,
) -> Vec<Warning> {
    let mut out = Vec::new();
    if annual_revenue > GROUP2_THRESHOLD {
        out.push(Warning::MoveToGroup3 {
            revenue: annual_revenue,
        });
    }
    if annual_revenue > E_INVOICE_THRESHOLD && sector == Some(BusinessSector::RetailRestaurant) {
        out.push(Warning::EInvoiceRequired { annual_revenue });
    }
    if !profile.is_some_and(UserProfile::has_personal_id) {
        out.push(Warning::MissingPersonalId);
    }
    out
}

/// One category's row in the declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DeclarationLine {
    pub category: BusinessCategory,
    pub indicator: Indicator,
    pub revenue: Vnd,
    pub vat: Vnd,
    pub pit: Vnd,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Declaration {
    pub period: Period,
    pub lines: Vec<DeclarationLine>,
    pub total_revenue: Vnd,
    pub total_vat: Vnd,
    pub total_pit: Vnd,
}

impl Declaration {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Revenue reported on `indicator`, summed over the lines that map to it.
    pub fn indicator_revenue(&self, indicator: Indicator) -> Vnd {
        self.lines
            .iter()
            .filter(|l| l.indicator == indicator)
            .map(|l| l.revenue)
            .sum()
    }
}

/// Sums revenue, VAT and PIT per category over the transactions in `period`. Lines come out in
/// category order and categories with no revenue are left out.
pub fn declare(transactions: &[Transaction], period: Period) -> Declaration {
    let mut lines: Vec<DeclarationLine> = BusinessCategory::ALL
        .iter()
        .map(|&category| DeclarationLine {
            category,
            indicator: indicator(category),
            revenue: Vnd::ZERO,
            vat: Vnd::ZERO,
            pit: Vnd::ZERO,
        })
        .collect();

    for t in period.filter(transactions) {
        if let Some(line) = lines.iter_mut().find(|l| l.category == t.category()) {
            let r = rates(t.category());
            line.revenue += t.amount();
            line.vat += t.amount() * r.vat;
            line.pit += t.amount() * r.pit;
        }
    }

    lines.retain(|l| l.revenue.is_positive());
    Declaration {
        period,
        total_revenue: lines.iter().map(|l| l.revenue).sum(),
        total_vat: lines.iter().map(|l| l.vat).sum(),
        total_pit: lines.iter().map(|l| l.pit).sum(),
        lines,
    }
}

/// The persisted outcome of the HKD setup wizard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HkdSelection {
    pub group: HkdGroup,
    pub sector: Option<BusinessSector>,
    pub primary_category: Option<BusinessCategory>,
}

impl HkdSelection {
    /// Runs the wizard: validates the inputs and classifies the expected annual revenue.
    pub fn setup(revenue: Vnd, category: Option<BusinessCategory>) -> Result<Self> {
        let category = match category {
            Some(c) if revenue.is_positive() => c,
            _ => anyhow::bail!(
                "Vui lòng nhập doanh thu dự kiến và chọn một lĩnh vực kinh doanh."
            ),
        };
        Ok(Self {
            group: classify(revenue),
            sector: Some(category.sector()),
            primary_category: Some(category),
        })
    }

    /// A group without a sector cannot drive the dashboard and must be selected again.
    pub fn effective_group(&self) -> HkdGroup {
        match self.sector {
            Some(_) => self.group,
            None => HkdGroup::Undetermined,
        }
    }
}

/// Helper for validating a user-entered revenue before it reaches a calculator.
pub fn require_revenue(revenue: Vnd) -> Result<Vnd> {
    ensure!(revenue.is_positive(), "Vui lòng nhập doanh thu lớn hơn 0.");
    Ok(revenue)
}
