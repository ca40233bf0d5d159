use crate::model::{Dated, ExpenseCategory, Vnd};
use crate::Result;
use anyhow::{ensure, Context};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// One line on a purchase invoice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    id: String,
    name: String,
    quantity: Decimal,
    unit_price: Vnd,
}

impl LineItem {
    pub fn new(name: impl Into<String>, quantity: Decimal, unit_price: Vnd) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            quantity,
            unit_price,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn quantity(&self) -> Decimal {
        self.quantity
    }

    pub fn unit_price(&self) -> Vnd {
        self.unit_price
    }

    pub fn subtotal(&self) -> Vnd {
        self.unit_price * self.quantity
    }
}

/// Parses `name:quantity:unit_price`. The name may itself contain colons.
impl FromStr for LineItem {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let mut parts = s.rsplitn(3, ':');
        let (price, quantity, name) = match (parts.next(), parts.next(), parts.next()) {
            (Some(p), Some(q), Some(n)) => (p, q, n),
            _ => anyhow::bail!("Invalid line item '{s}', expected name:quantity:price"),
        };
        let quantity = Decimal::from_str(quantity.trim())
            .with_context(|| format!("Invalid quantity in line item '{s}'"))?;
        let unit_price =
            Vnd::from_str(price).with_context(|| format!("Invalid price in line item '{s}'"))?;
        Ok(LineItem::new(name.trim(), quantity, unit_price))
    }
}

/// The user-entered fields of an expense invoice before it is validated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvoiceDraft {
    pub date: Option<NaiveDate>,
    pub supplier_name: String,
    pub supplier_tax_code: String,
    pub description: String,
    pub expense_category: ExpenseCategory,
    pub line_items: Vec<LineItem>,
    /// Path of the scanned invoice image, if there was one.
    pub image: Option<String>,
}

/// An expense (input) invoice. Its amount is always derived from the line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InputInvoice {
    id: String,
    date: NaiveDate,
    supplier_name: String,
    supplier_tax_code: String,
    description: String,
    expense_category: ExpenseCategory,
    line_items: Vec<LineItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    image: Option<String>,
}

impl InputInvoice {
    /// Validates the draft. A supplier name and a positive total are required. A missing date
    /// becomes `today`.
    pub fn new(draft: InvoiceDraft, today: NaiveDate) -> Result<Self> {
        let supplier_name = draft.supplier_name.trim().to_string();
        let total: Vnd = draft.line_items.iter().map(LineItem::subtotal).sum();
        ensure!(
            !supplier_name.is_empty() && total.is_positive(),
            "Vui lòng điền tên Nhà cung cấp và ít nhất một chi tiết hạng mục."
        );
        Ok(Self {
            id: Uuid::new_v4().to_string(),
            date: draft.date.unwrap_or(today),
            supplier_name,
            supplier_tax_code: draft.supplier_tax_code.trim().to_string(),
            description: draft.description.trim().to_string(),
            expense_category: draft.expense_category,
            line_items: draft.line_items,
            image: draft.image,
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn supplier_name(&self) -> &str {
        &self.supplier_name
    }

    pub fn supplier_tax_code(&self) -> &str {
        &self.supplier_tax_code
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn expense_category(&self) -> ExpenseCategory {
        self.expense_category
    }

    pub fn line_items(&self) -> &[LineItem] {
        &self.line_items
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// Σ quantity × unit price over the line items.
    pub fn amount(&self) -> Vnd {
        self.line_items.iter().map(LineItem::subtotal).sum()
    }
}

impl Dated for InputInvoice {
    fn date(&self) -> NaiveDate {
        self.date
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, 20).unwrap()
    }

    fn draft() -> InvoiceDraft {
        InvoiceDraft {
            supplier_name: "Công ty TNHH ABC".to_string(),
            line_items: vec![
                LineItem::new("Cà phê hạt", dec!(2), Vnd::from(250_000)),
                LineItem::new("Sữa đặc", dec!(10), Vnd::from(27_500)),
            ],
            ..InvoiceDraft::default()
        }
    }

    #[test]
    fn test_amount_is_sum_of_line_items() {
        let invoice = InputInvoice::new(draft(), today()).unwrap();
        assert_eq!(invoice.amount(), Vnd::from(775_000));
        assert_eq!(invoice.date(), today());
        assert_eq!(invoice.expense_category(), ExpenseCategory::RawMaterials);
    }

    #[test]
    fn test_requires_supplier() {
        let mut d = draft();
        d.supplier_name = "   ".to_string();
        let e = InputInvoice::new(d, today()).unwrap_err();
        assert!(e.to_string().contains("Nhà cung cấp"));
    }

    #[test]
    fn test_requires_positive_total() {
        let mut d = draft();
        d.line_items = vec![LineItem::new("Mẫu thử", dec!(1), Vnd::ZERO)];
        assert!(InputInvoice::new(d, today()).is_err());
        let mut d = draft();
        d.line_items.clear();
        assert!(InputInvoice::new(d, today()).is_err());
    }

    #[test]
    fn test_amount_is_not_serialized() {
        let invoice = InputInvoice::new(draft(), today()).unwrap();
        let json = serde_json::to_value(&invoice).unwrap();
        assert!(json.get("amount").is_none());
        assert_eq!(json["lineItems"].as_array().unwrap().len(), 2);
        let back: InputInvoice = serde_json::from_value(json).unwrap();
        assert_eq!(back.amount(), invoice.amount());
    }

    #[test]
    fn test_parse_line_item() {
        let item = LineItem::from_str("Giấy A4: loại 1:3:55.000").unwrap();
        assert_eq!(item.name(), "Giấy A4: loại 1");
        assert_eq!(item.quantity(), dec!(3));
        assert_eq!(item.unit_price(), Vnd::from(55_000));
        assert_eq!(item.subtotal(), Vnd::from(165_000));
    }

    #[test]
    fn test_parse_line_item_errors() {
        assert!(LineItem::from_str("only-a-name").is_err());
        assert!(LineItem::from_str("name:many:1000").is_err());
        assert!(LineItem::from_str("name:1:lots").is_err());
    }

    #[test]
    fn test_line_item_price_with_decimal_separator_is_rejected() {
        let e = LineItem::from_str("x:1:12.5").unwrap_err();
        assert!(format!("{e:#}").contains("phân cách hàng nghìn"));
        assert_eq!(
            LineItem::from_str("x:2:12.500").unwrap().subtotal(),
            Vnd::from(25_000)
        );
    }
}
