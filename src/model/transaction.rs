use crate::model::{BusinessCategory, Dated, Vnd};
use crate::Result;
use anyhow::ensure;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single revenue entry in the household business ledger. Transactions are immutable once
/// created and are never deleted individually.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    id: String,
    date: NaiveDate,
    amount: Vnd,
    category: BusinessCategory,
    description: String,
}

impl Transaction {
    /// Creates a transaction with a fresh id. When `description` is missing or blank it defaults
    /// to "Doanh thu" followed by the category label.
    pub fn new(
        date: NaiveDate,
        amount: Vnd,
        category: BusinessCategory,
        description: Option<&str>,
    ) -> Result<Self> {
        ensure!(amount.is_positive(), "Vui lòng nhập số tiền doanh thu lớn hơn 0.");
        let description = match description.map(str::trim) {
            Some(d) if !d.is_empty() => d.to_string(),
            _ => format!("Doanh thu {}", category.label()),
        };
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            date,
            amount,
            category,
            description,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn amount(&self) -> Vnd {
        self.amount
    }

    pub fn category(&self) -> BusinessCategory {
        self.category
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl Dated for Transaction {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

/// Sums the amounts of `transactions`.
pub fn total<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Vnd {
    transactions.into_iter().map(Transaction::amount).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 2).unwrap()
    }

    #[test]
    fn test_new_defaults_description() {
        let t = Transaction::new(
            day(),
            Vnd::from(1_500_000),
            BusinessCategory::Brokerage,
            None,
        )
        .unwrap();
        assert_eq!(t.description(), "Doanh thu Đại lý, môi giới");
        assert_eq!(t.date(), day());
        assert!(!t.id().is_empty());
    }

    #[test]
    fn test_new_keeps_description() {
        let t = Transaction::new(
            day(),
            Vnd::from(10),
            BusinessCategory::Other,
            Some("  Bán hàng online "),
        )
        .unwrap();
        assert_eq!(t.description(), "Bán hàng online");
    }

    #[test]
    fn test_new_rejects_non_positive() {
        assert!(Transaction::new(day(), Vnd::ZERO, BusinessCategory::Other, None).is_err());
        assert!(Transaction::new(day(), Vnd::from(-1), BusinessCategory::Other, None).is_err());
    }

    #[test]
    fn test_ids_are_unique() {
        let a = Transaction::new(day(), Vnd::from(1), BusinessCategory::Other, None).unwrap();
        let b = Transaction::new(day(), Vnd::from(1), BusinessCategory::Other, None).unwrap();
        assert_ne!(a.id(), b.id());
        assert_eq!(total([&a, &b]), Vnd::from(2));
    }

    #[test]
    fn test_serde_shape() {
        let t = Transaction::new(day(), Vnd::from(5), BusinessCategory::AssetRental, None).unwrap();
        let json = serde_json::to_value(&t).unwrap();
        assert_eq!(json["date"], "2025-10-02");
        assert_eq!(json["category"], "asset-rental");
        let back: Transaction = serde_json::from_value(json).unwrap();
        assert_eq!(back, t);
    }
}
