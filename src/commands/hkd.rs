use crate::args::{DeclareArgs, HkdQuoteArgs, HkdSetupArgs, PeriodArgs};
use crate::commands::{expenses, profile, transactions, write_export, Out};
use crate::error::{ErrorType, IntoResult};
use crate::export::xml;
use crate::model::{self, BusinessCategory, BusinessSector, Period};
use crate::store::{self, Key, Store};
use crate::tax::hkd::{
    self, Declaration, Group1Tracker, HkdGroup, HkdSelection, PeriodSummary, TaxQuote, Warning,
};
use crate::{Config, Result};
use anyhow::Context;
use rust_decimal::Decimal;
use serde::Serialize;
use tracing::debug;

/// Classifies the expected annual revenue and remembers the group, sector and main category.
pub async fn hkd_setup(config: &Config, args: &HkdSetupArgs) -> Result<Out<HkdSelection>> {
    let selection =
        HkdSelection::setup(args.revenue(), args.category()).pub_result(ErrorType::Validation)?;
    save_selection(config.store(), &selection)
        .await
        .pub_result(ErrorType::Database)?;

    let mut message = format!(
        "Doanh thu dự kiến {}: bạn thuộc {}.",
        args.revenue().currency(),
        selection.group.label()
    );
    if let Some(sector) = selection.sector {
        message.push_str(&format!("\nLĩnh vực: {}", sector.label()));
    }
    Ok(Out::new(message, selection))
}

/// Forgets the group and sector so that setup has to run again.
pub async fn hkd_reset(config: &Config) -> Result<Out<()>> {
    let store = config.store();
    store
        .remove(Key::HkdGroup)
        .await
        .pub_result(ErrorType::Database)?;
    store
        .remove(Key::HkdSector)
        .await
        .pub_result(ErrorType::Database)?;
    Ok("Đã xóa lựa chọn nhóm hộ kinh doanh. Chạy 'taxhelper hkd setup' để chọn lại.".into())
}

/// VAT and PIT on `revenue` in one category. Nothing is stored.
pub async fn hkd_quote(args: &HkdQuoteArgs) -> Result<Out<TaxQuote>> {
    let revenue = hkd::require_revenue(args.revenue()).pub_result(ErrorType::Validation)?;
    let category = args.category();
    let rates = hkd::rates(category);
    let quote = hkd::quote(revenue, category);
    let message = format!(
        "{} (GTGT {}% + TNCN {}%)\n  Thuế GTGT:  {}\n  Thuế TNCN:  {}\n  Tổng thuế:  {}",
        category.label(),
        percent(rates.vat),
        percent(rates.pit),
        quote.vat.currency(),
        quote.pit.currency(),
        quote.total.currency()
    );
    Ok(Out::new(message, quote))
}

/// What the HKD dashboard shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HkdStatus {
    pub group: HkdGroup,
    pub sector: Option<BusinessSector>,
    pub primary_category: Option<BusinessCategory>,
    pub period: Period,
    /// Present for Group 1 only, measured on the revenue of the whole year.
    pub tracker: Option<Group1Tracker>,
    pub summary: PeriodSummary,
    pub warnings: Vec<Warning>,
}

/// The dashboard for the stored group. The period defaults to the current year for Group 1 and to
/// the current month otherwise.
pub async fn hkd_status(config: &Config, args: &PeriodArgs) -> Result<Out<HkdStatus>> {
    let store = config.store();
    let selection = load_selection(store)
        .await
        .pub_result(ErrorType::Database)?;
    let group = selection.effective_group();
    if group == HkdGroup::Undetermined {
        return Err(anyhow::anyhow!(
            "Bạn chưa xác định nhóm hộ kinh doanh. Hãy chạy 'taxhelper hkd setup --revenue ... \
            --category ...' trước."
        ))
        .pub_result(ErrorType::Validation);
    }

    let period = args.period().unwrap_or_else(|| match group {
        HkdGroup::Group1 => Period::this_year(),
        _ => Period::this_month(),
    });
    let revenue = transactions(store).await.pub_result(ErrorType::Database)?;
    let costs = expenses(store).await.pub_result(ErrorType::Database)?;
    let profile = profile(store).await.pub_result(ErrorType::Database)?;
    debug!(
        "Status for {group} over {period} with {} transactions",
        revenue.len()
    );

    let annual_revenue = model::total(period.enclosing_year().filter(&revenue));
    let summary = PeriodSummary::new(period.filter(&revenue), period.filter(&costs));
    let tracker = (group == HkdGroup::Group1).then(|| Group1Tracker::new(annual_revenue));
    let warnings = hkd::warnings(annual_revenue, selection.sector, profile.as_ref());

    let mut lines = vec![group.label().to_string()];
    if let Some(tracker) = &tracker {
        lines.push(format!(
            "Doanh thu năm {}: {} ({}% ngưỡng 200 triệu)",
            period.year(),
            tracker.revenue.currency(),
            tracker.progress_percent.normalize()
        ));
        lines.push(tracker.message());
    }
    if group == HkdGroup::Group3 {
        lines.push(
            "Nhóm 3 phải thực hiện chế độ kế toán đầy đủ như doanh nghiệp. Số liệu dưới đây chỉ để \
            tham khảo."
                .to_string(),
        );
    }
    lines.push(format!("Tổng kết {period}:"));
    lines.push(format!("  Doanh thu:             {}", summary.revenue.currency()));
    lines.push(format!("  Chi phí:               {}", summary.expenses.currency()));
    lines.push(format!(
        "  Lợi nhuận trước thuế:  {}",
        summary.profit_before_tax.currency()
    ));
    lines.push(format!("  Thuế phải nộp:         {}", summary.tax.currency()));
    lines.push(format!("  Lợi nhuận ròng:        {}", summary.net_profit.currency()));
    for w in &warnings {
        lines.push(format!("⚠ {}", w.message()));
    }

    Ok(Out::new(
        lines.join("\n"),
        HkdStatus {
            group,
            sector: selection.sector,
            primary_category: selection.primary_category,
            period,
            tracker,
            summary,
            warnings,
        },
    ))
}

/// Aggregates the period's revenue per category into the declaration and, when asked, writes it
/// as 01/CNKD XML. The period defaults to the current month.
pub async fn hkd_declare(config: &Config, args: &DeclareArgs) -> Result<Out<Declaration>> {
    let store = config.store();
    let period = args.period().unwrap_or_else(Period::this_month);
    let revenue = transactions(store).await.pub_result(ErrorType::Database)?;
    let declaration = hkd::declare(&revenue, period);

    let mut lines = Vec::new();
    if declaration.is_empty() {
        lines.push(format!("Không có doanh thu trong {period}."));
    } else {
        lines.push(format!("Tờ khai 01/CNKD {period}"));
        for line in &declaration.lines {
            lines.push(format!(
                "{} {}: doanh thu {}, GTGT {}, TNCN {}",
                line.indicator.code(),
                line.category.label(),
                line.revenue.currency(),
                line.vat.currency(),
                line.pit.currency()
            ));
        }
        lines.push(format!(
            "Tổng: doanh thu {}, GTGT {}, TNCN {}",
            declaration.total_revenue.currency(),
            declaration.total_vat.currency(),
            declaration.total_pit.currency()
        ));
    }

    if args.xml() {
        let profile = profile(store)
            .await
            .pub_result(ErrorType::Database)?
            .unwrap_or_default();
        let contents =
            xml::declaration_xml(&declaration, &profile).pub_result(ErrorType::Validation)?;
        let path = write_export(
            config,
            args.out(),
            &xml::file_name(&profile, period),
            contents,
        )
        .await
        .context("Unable to write the declaration XML")
        .pub_result(ErrorType::Io)?;
        lines.push(format!("Đã xuất tờ khai XML: {}", path.display()));
    }

    Ok(Out::new(lines.join("\n"), declaration))
}

async fn save_selection(store: &dyn Store, selection: &HkdSelection) -> Result<()> {
    store::save(store, Key::HkdGroup, &selection.group).await?;
    match selection.sector {
        Some(sector) => store::save(store, Key::HkdSector, &sector).await?,
        None => store.remove(Key::HkdSector).await?,
    }
    match selection.primary_category {
        Some(category) => store::save(store, Key::HkdPrimaryCategory, &category).await?,
        None => store.remove(Key::HkdPrimaryCategory).await?,
    }
    Ok(())
}

async fn load_selection(store: &dyn Store) -> Result<HkdSelection> {
    let group = store::load_or_default(store, Key::HkdGroup)
        .await
        .context("Unable to load the HKD group")?;
    let sector = store::load(store, Key::HkdSector)
        .await
        .context("Unable to load the HKD sector")?;
    let primary_category = store::load(store, Key::HkdPrimaryCategory)
        .await
        .context("Unable to load the primary category")?;
    Ok(HkdSelection {
        group,
        sector,
        primary_category,
    })
}

/// `0.015` as `1.5`.
fn percent(rate: Decimal) -> Decimal {
    (rate * Decimal::ONE_HUNDRED).normalize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{Transaction, UserProfile, Vnd};
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    async fn add_revenue(config: &Config, date: NaiveDate, amount: i64, c: BusinessCategory) {
        let mut ledger = transactions(config.store()).await.unwrap();
        ledger.insert(0, Transaction::new(date, Vnd::from(amount), c, None).unwrap());
        store::save(config.store(), Key::HkdRevenue, &ledger)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_setup_and_reset() {
        let env = TestEnv::new().await;
        let config = env.config();

        let bad = hkd_setup(&config, &HkdSetupArgs::new(Vnd::ZERO, None))
            .await
            .unwrap_err();
        assert_eq!(error_type(&bad), Some(ErrorType::Validation));

        let args = HkdSetupArgs::new(Vnd::from(500_000_000), Some(BusinessCategory::AssetRental));
        let out = hkd_setup(&config, &args).await.unwrap();
        assert_eq!(out.structure().unwrap().group, HkdGroup::Group2);

        let loaded = load_selection(config.store()).await.unwrap();
        assert_eq!(loaded.group, HkdGroup::Group2);
        assert_eq!(loaded.sector, Some(BusinessSector::Services));
        assert_eq!(loaded.primary_category, Some(BusinessCategory::AssetRental));

        hkd_reset(&config).await.unwrap();
        let loaded = load_selection(config.store()).await.unwrap();
        assert_eq!(loaded.effective_group(), HkdGroup::Undetermined);
        assert!(hkd_status(&config, &PeriodArgs::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_group_without_sector_is_undetermined() {
        let env = TestEnv::new().await;
        let config = env.config();
        store::save(config.store(), Key::HkdGroup, &HkdGroup::Group2)
            .await
            .unwrap();
        let e = hkd_status(&config, &PeriodArgs::default())
            .await
            .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
    }

    #[tokio::test]
    async fn test_status_group1() {
        let env = TestEnv::new().await;
        let config = env.config();
        let args = HkdSetupArgs::new(Vnd::from(150_000_000), Some(BusinessCategory::Distribution));
        hkd_setup(&config, &args).await.unwrap();

        let d = |m, day| NaiveDate::from_ymd_opt(2025, m, day).unwrap();
        add_revenue(&config, d(3, 1), 100_000_000, BusinessCategory::Distribution).await;
        add_revenue(&config, d(9, 1), 85_000_000, BusinessCategory::Distribution).await;
        add_revenue(&config, d(9, 2), 1_000_000, BusinessCategory::Distribution).await;

        let out = hkd_status(&config, &PeriodArgs::new(Some(Period::Year(2025))))
            .await
            .unwrap();
        let status = out.structure().unwrap();
        let tracker = status.tracker.unwrap();
        assert_eq!(tracker.revenue, Vnd::from(186_000_000));
        assert_eq!(tracker.remaining, Vnd::from(14_000_000));
        assert_eq!(tracker.status, hkd::ThresholdStatus::Approaching);
        assert!(status.warnings.contains(&Warning::MissingPersonalId));

        // A month still tracks the whole year
        let month = Period::Month {
            year: 2025,
            month: 9,
        };
        let out = hkd_status(&config, &PeriodArgs::new(Some(month)))
            .await
            .unwrap();
        let status = out.structure().unwrap();
        assert_eq!(status.summary.revenue, Vnd::from(86_000_000));
        assert_eq!(status.tracker.unwrap().revenue, Vnd::from(186_000_000));
    }

    #[tokio::test]
    async fn test_declare_to_xml() {
        let env = TestEnv::new().await;
        let config = env.config();
        let oct = |day| NaiveDate::from_ymd_opt(2025, 10, day).unwrap();
        add_revenue(&config, oct(1), 20_000_000, BusinessCategory::Distribution).await;
        add_revenue(&config, oct(2), 5_000_000, BusinessCategory::LodgingAndCatering).await;
        add_revenue(&config, oct(3), 7_000_000, BusinessCategory::ConsumerServices).await;

        let period = Some(Period::Month {
            year: 2025,
            month: 10,
        });
        let out = hkd_declare(&config, &DeclareArgs::new(period, false, None))
            .await
            .unwrap();
        let declaration = out.structure().unwrap();
        assert_eq!(declaration.lines.len(), 3);
        assert_eq!(
            declaration.indicator_revenue(hkd::Indicator::Ct29),
            Vnd::from(12_000_000)
        );

        // No tax code yet
        let e = hkd_declare(&config, &DeclareArgs::new(period, true, None))
            .await
            .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));

        let profile = UserProfile {
            tax_code: "8009876543".to_string(),
            ..UserProfile::default()
        };
        store::save(config.store(), Key::UserProfile, &profile)
            .await
            .unwrap();
        let out = hkd_declare(&config, &DeclareArgs::new(period, true, None))
            .await
            .unwrap();
        let path = config.exports().join("01_CNKD_8009876543_2025.xml");
        assert!(out.message().contains("01_CNKD_8009876543_2025.xml"));
        let written = std::fs::read_to_string(path).unwrap();
        assert!(written.contains("<tongDoanhThu>32000000</tongDoanhThu>"));
    }

    #[tokio::test]
    async fn test_quote() {
        let args = HkdQuoteArgs::new(Vnd::from(100_000_000), BusinessCategory::Distribution);
        let out = hkd_quote(&args).await.unwrap();
        assert_eq!(out.structure().unwrap().total, Vnd::from(1_500_000));
        assert!(out.message().contains("GTGT 1% + TNCN 0.5%"));

        let zero = HkdQuoteArgs::new(Vnd::ZERO, BusinessCategory::Distribution);
        let e = hkd_quote(&zero).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
    }
}
