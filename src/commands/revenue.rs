use crate::args::{OutArgs, PeriodArgs, RevenueAddArgs};
use crate::commands::{transactions, write_export, Out};
use crate::error::{ErrorType, IntoResult};
use crate::export::{self, csv};
use crate::model::{self, today, Dated, Period, Transaction, Vnd};
use crate::store::{self, Key};
use crate::{Config, Result};
use serde::Serialize;
use tracing::debug;

/// Records one revenue transaction at the top of the ledger.
pub async fn revenue_add(config: &Config, args: &RevenueAddArgs) -> Result<Out<Transaction>> {
    let date = args.date().unwrap_or_else(today);
    let transaction = Transaction::new(date, args.amount(), args.category(), args.description())
        .pub_result(ErrorType::Validation)?;

    let store = config.store();
    let mut ledger = transactions(store).await.pub_result(ErrorType::Database)?;
    ledger.insert(0, transaction.clone());
    store::save(store, Key::HkdRevenue, &ledger)
        .await
        .pub_result(ErrorType::Database)?;
    debug!("The ledger now holds {} transactions", ledger.len());

    Ok(Out::new(
        format!(
            "Đã ghi nhận doanh thu {} ({}) ngày {}",
            transaction.amount().currency(),
            transaction.category().label(),
            date.format("%d/%m/%Y")
        ),
        transaction,
    ))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevenueList {
    /// `None` lists the whole ledger.
    pub period: Option<Period>,
    pub transactions: Vec<Transaction>,
    pub total: Vnd,
}

/// The ledger, newest first, optionally narrowed to a period.
pub async fn revenue_list(config: &Config, args: &PeriodArgs) -> Result<Out<RevenueList>> {
    let ledger = transactions(config.store())
        .await
        .pub_result(ErrorType::Database)?;
    let selected: Vec<Transaction> = match args.period() {
        Some(period) => period.filter(&ledger).into_iter().cloned().collect(),
        None => ledger,
    };
    let total = model::total(&selected);

    let mut lines: Vec<String> = selected
        .iter()
        .map(|t| {
            format!(
                "{}  {:>16}  {}  {}",
                t.date().format("%d/%m/%Y"),
                t.amount().currency(),
                t.category().label(),
                t.description()
            )
        })
        .collect();
    let scope = match args.period() {
        Some(period) => format!(" {period}"),
        None => String::new(),
    };
    if selected.is_empty() {
        lines.push(format!("Chưa có giao dịch doanh thu nào{scope}."));
    } else {
        lines.push(format!(
            "{} giao dịch{scope}, tổng doanh thu {}",
            selected.len(),
            total.currency()
        ));
    }

    Ok(Out::new(
        lines.join("\n"),
        RevenueList {
            period: args.period(),
            transactions: selected,
            total,
        },
    ))
}

/// Writes the whole ledger as CSV.
pub async fn revenue_export(config: &Config, args: &OutArgs) -> Result<Out<()>> {
    let ledger = transactions(config.store())
        .await
        .pub_result(ErrorType::Database)?;
    let contents = export::transactions_csv(&ledger).pub_result(ErrorType::Validation)?;
    let path = write_export(config, args.out(), csv::FILE_NAME, contents)
        .await
        .pub_result(ErrorType::Io)?;
    Ok(format!(
        "Đã xuất {} giao dịch ra {}",
        ledger.len(),
        path.display()
    )
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::BusinessCategory;
    use crate::test::TestEnv;
    use chrono::NaiveDate;

    fn add_args(amount: i64, date: NaiveDate) -> RevenueAddArgs {
        RevenueAddArgs::new(
            Vnd::from(amount),
            BusinessCategory::Distribution,
            Some(date),
            None,
        )
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let env = TestEnv::new().await;
        let config = env.config();
        let d = |m, day| NaiveDate::from_ymd_opt(2025, m, day).unwrap();

        revenue_add(&config, &add_args(1_000_000, d(1, 5))).await.unwrap();
        let out = revenue_add(&config, &add_args(2_500_000, d(2, 5)))
            .await
            .unwrap();
        assert_eq!(
            out.structure().unwrap().description(),
            format!("Doanh thu {}", BusinessCategory::Distribution.label())
        );

        let all = revenue_list(&config, &PeriodArgs::default()).await.unwrap();
        let list = all.structure().unwrap();
        assert_eq!(list.transactions.len(), 2);
        // Newest entry first
        assert_eq!(list.transactions[0].amount(), Vnd::from(2_500_000));
        assert_eq!(list.total, Vnd::from(3_500_000));

        let jan = Period::Month {
            year: 2025,
            month: 1,
        };
        let out = revenue_list(&config, &PeriodArgs::new(Some(jan)))
            .await
            .unwrap();
        assert_eq!(out.structure().unwrap().total, Vnd::from(1_000_000));
        assert!(out.message().contains("tháng 1/2025"));
    }

    #[tokio::test]
    async fn test_add_zero_is_rejected() {
        let env = TestEnv::new().await;
        let config = env.config();
        let e = revenue_add(&config, &add_args(0, today())).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
        let list = revenue_list(&config, &PeriodArgs::default()).await.unwrap();
        assert!(list.structure().unwrap().transactions.is_empty());
    }

    #[tokio::test]
    async fn test_export() {
        let env = TestEnv::new().await;
        let config = env.config();
        let e = revenue_export(&config, &OutArgs::default()).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));

        revenue_add(&config, &add_args(150_000, today())).await.unwrap();

        let out = revenue_export(&config, &OutArgs::default()).await.unwrap();
        assert!(out.message().contains(csv::FILE_NAME));
        let written = std::fs::read_to_string(config.exports().join(csv::FILE_NAME)).unwrap();
        assert!(written.starts_with('\u{feff}'));
        assert!(written.contains("150000"));
    }
}
