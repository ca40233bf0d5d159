//! Reconciles the tax an e-commerce platform withheld against the tax actually owed on completed
//! orders.

use crate::model::Vnd;
use crate::tax::hkd::GROUP1_THRESHOLD;
use crate::Result;
use anyhow::bail;
use clap::ValueEnum;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use tracing::debug;

/// A discrepancy below one dong counts as a match.
const MATCH_TOLERANCE: Decimal = dec!(1);

/// A sample platform sales report in the expected format.
pub const SAMPLE_CSV: &str = "OrderID,Revenue,Status
A,10000000,Completed
B,12000000,Completed
C,1500000,Cancelled
D,5000000,Completed
";

pub const SAMPLE_FILE_NAME: &str = "bao_cao_mau.csv";

/// What the seller sells, which decides the withholding rate.
#[derive(
    Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "kebab-case")]
pub enum RateKind {
    /// 1% VAT + 0.5% PIT.
    #[default]
    Goods,
    /// 5% VAT + 2% PIT.
    Services,
}

serde_plain::derive_display_from_serialize!(RateKind);

impl RateKind {
    pub fn vat(&self) -> Decimal {
        match self {
            RateKind::Goods => dec!(0.01),
            RateKind::Services => dec!(0.05),
        }
    }

    pub fn pit(&self) -> Decimal {
        match self {
            RateKind::Goods => dec!(0.005),
            RateKind::Services => dec!(0.02),
        }
    }

    pub fn total(&self) -> Decimal {
        self.vat() + self.pit()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SaleStatus {
    Completed,
    Cancelled,
}

serde_plain::derive_fromstr_from_deserialize!(SaleStatus);

/// One order row from the platform report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaleRecord {
    pub id: String,
    pub revenue: Vnd,
    pub status: SaleStatus,
}

/// Parses an `OrderID,Revenue,Status` report. The first row is a header and is skipped. Rows
/// with a missing id, a non-numeric revenue or an unknown status are dropped.
pub fn parse_report(content: &str) -> Result<Vec<SaleRecord>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(content.as_bytes());

    let mut records = Vec::new();
    for (ix, row) in reader.records().enumerate() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                debug!("Skipping unreadable row {}: {e}", ix + 2);
                continue;
            }
        };
        match parse_row(&row) {
            Some(record) => records.push(record),
            None => debug!("Skipping invalid row {}: {row:?}", ix + 2),
        }
    }

    if records.is_empty() {
        bail!(
            "Không tìm thấy dữ liệu hợp lệ trong tệp. Vui lòng kiểm tra định dạng cột: OrderID,Revenue,Status"
        );
    }
    Ok(records)
}

fn parse_row(row: &csv::StringRecord) -> Option<SaleRecord> {
    let id = row.get(0).filter(|s| !s.is_empty())?;
    let revenue = row.get(1).filter(|s| !s.is_empty())?;
    let revenue = Decimal::from_str(revenue)
        .or_else(|_| Decimal::from_scientific(revenue))
        .ok()?;
    let status = SaleStatus::from_str(row.get(2)?).ok()?;
    Some(SaleRecord {
        id: id.to_string(),
        revenue: Vnd::new(revenue),
        status,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    Match,
    Mismatch,
}

serde_plain::derive_display_from_serialize!(MatchStatus);

impl MatchStatus {
    fn of(discrepancy: Vnd) -> Self {
        if discrepancy.value() < MATCH_TOLERANCE {
            MatchStatus::Match
        } else {
            MatchStatus::Mismatch
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Reconciliation {
    pub kind: RateKind,
    pub orders: usize,
    pub completed_revenue: Vnd,
    pub reported_revenue: Vnd,
    /// Tax owed on completed orders only.
    pub calculated_tax: Vnd,
    /// Tax the platform withholds on every order, cancelled ones included.
    pub platform_tax: Vnd,
    pub discrepancy: Vnd,
    pub status: MatchStatus,
    /// The amount the seller can reclaim when annual e-commerce revenue stays in Group 1.
    pub refund: Option<Vnd>,
}

pub fn reconcile(records: &[SaleRecord], kind: RateKind) -> Reconciliation {
    let completed_revenue: Vnd = records
        .iter()
        .filter(|r| r.status == SaleStatus::Completed)
        .map(|r| r.revenue)
        .sum();
    let reported_revenue: Vnd = records.iter().map(|r| r.revenue).sum();

    let calculated_tax = completed_revenue * kind.total();
    let platform_tax = reported_revenue * kind.total();
    let discrepancy = platform_tax - calculated_tax;
    let status = MatchStatus::of(discrepancy);
    let refund = (completed_revenue.is_positive() && completed_revenue <= GROUP1_THRESHOLD)
        .then_some(calculated_tax);

    Reconciliation {
        kind,
        orders: records.len(),
        completed_revenue,
        reported_revenue,
        calculated_tax,
        platform_tax,
        discrepancy,
        status,
        refund,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_report_mismatch() {
        let records = parse_report(SAMPLE_CSV).unwrap();
        assert_eq!(records.len(), 4);
        let r = reconcile(&records, RateKind::Goods);
        assert_eq!(r.completed_revenue, Vnd::from(27_000_000));
        assert_eq!(r.calculated_tax, Vnd::from(405_000));
        assert_eq!(r.platform_tax, Vnd::from(427_500));
        assert_eq!(r.discrepancy, Vnd::from(22_500));
        assert_eq!(r.status, MatchStatus::Mismatch);
        assert_eq!(r.refund, Some(Vnd::from(405_000)));
    }

    #[test]
    fn test_all_completed_matches() {
        let csv = "OrderID,Revenue,Status\nX,1000000,Completed\nY,2000000,Completed\n";
        let r = reconcile(&parse_report(csv).unwrap(), RateKind::Services);
        assert_eq!(r.calculated_tax, Vnd::from(210_000));
        assert_eq!(r.discrepancy, Vnd::ZERO);
        assert_eq!(r.status, MatchStatus::Match);
    }

    #[test]
    fn test_match_tolerance() {
        assert_eq!(MatchStatus::of(Vnd::new(dec!(0.99))), MatchStatus::Match);
        assert_eq!(MatchStatus::of(Vnd::new(dec!(1.00))), MatchStatus::Mismatch);
        assert_eq!(MatchStatus::of(Vnd::new(dec!(-5))), MatchStatus::Match);
    }

    #[test]
    fn test_small_cancelled_order_within_tolerance() {
        // 66 × 1.5% = 0.99
        let csv = "OrderID,Revenue,Status\nA,1000000,Completed\nB,66,Cancelled\n";
        let r = reconcile(&parse_report(csv).unwrap(), RateKind::Goods);
        assert_eq!(r.discrepancy, Vnd::new(dec!(0.99)));
        assert_eq!(r.status, MatchStatus::Match);

        // 67 × 1.5% = 1.005
        let csv = "OrderID,Revenue,Status\nA,1000000,Completed\nB,67,Cancelled\n";
        let r = reconcile(&parse_report(csv).unwrap(), RateKind::Goods);
        assert_eq!(r.discrepancy, Vnd::new(dec!(1.005)));
        assert_eq!(r.status, MatchStatus::Mismatch);
    }

    #[test]
    fn test_invalid_rows_are_dropped() {
        let csv = "OrderID,Revenue,Status\r\n\
                   A,100,Completed\r\n\
                   ,200,Completed\r\n\
                   B,abc,Completed\r\n\
                   C,300,Refunded\r\n\
                   D,,Completed\r\n\
                   E,400\r\n\
                   \r\n\
                   F, 500 , Cancelled \r\n";
        let records = parse_report(csv).unwrap();
        let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["A", "F"]);
        assert_eq!(records[1].status, SaleStatus::Cancelled);
        assert_eq!(records[1].revenue, Vnd::from(500));
    }

    #[test]
    fn test_empty_report_is_an_error() {
        let e = parse_report("OrderID,Revenue,Status\n").unwrap_err();
        assert!(e.to_string().contains("OrderID,Revenue,Status"));
        assert!(parse_report("").is_err());
    }

    #[test]
    fn test_no_refund_above_threshold() {
        let records = vec![SaleRecord {
            id: "big".to_string(),
            revenue: Vnd::from(250_000_000),
            status: SaleStatus::Completed,
        }];
        assert_eq!(reconcile(&records, RateKind::Goods).refund, None);
    }

    #[test]
    fn test_rate_kinds() {
        assert_eq!(RateKind::Goods.total(), dec!(0.015));
        assert_eq!(RateKind::Services.total(), dec!(0.07));
    }
}
