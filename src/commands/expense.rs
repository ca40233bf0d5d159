use crate::api::{self, Assistant};
use crate::args::{ExpenseAddArgs, ExpenseScanArgs, PeriodArgs};
use crate::commands::{expenses, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::{today, Dated, InputInvoice, InvoiceDraft, Period, Vnd};
use crate::store::{self, Key};
use crate::{utils, Config, Result};
use anyhow::Context;
use serde::Serialize;
use tracing::debug;

/// Records an expense invoice entered by hand.
pub async fn expense_add(config: &Config, args: &ExpenseAddArgs) -> Result<Out<InputInvoice>> {
    let draft = InvoiceDraft {
        date: args.date(),
        supplier_name: args.supplier().to_string(),
        supplier_tax_code: args.tax_code().unwrap_or_default().to_string(),
        description: args.description().unwrap_or_default().to_string(),
        expense_category: args.category(),
        line_items: args.items().to_vec(),
        image: None,
    };
    save_invoice(config, draft).await
}

/// Reads an invoice photo with the assistant and records what it found.
pub async fn expense_scan(
    config: &Config,
    assistant: &dyn Assistant,
    args: &ExpenseScanArgs,
) -> Result<Out<InputInvoice>> {
    let image = args.image();
    let bytes = utils::read_bytes(image)
        .await
        .with_context(|| format!("Unable to read the invoice image {}", image.display()))
        .pub_result(ErrorType::Io)?;
    let file_name = image
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mime_type = api::mime_type(&file_name);
    debug!("Scanning {} ({mime_type}, {} bytes)", image.display(), bytes.len());

    let extracted = assistant
        .extract_invoice_fields(&bytes, mime_type)
        .await
        .pub_result(ErrorType::Request)?;
    let draft = extracted.into_draft(args.category(), Some(image.display().to_string()));
    save_invoice(config, draft).await
}

async fn save_invoice(config: &Config, draft: InvoiceDraft) -> Result<Out<InputInvoice>> {
    let invoice = InputInvoice::new(draft, today()).pub_result(ErrorType::Validation)?;

    let store = config.store();
    let mut invoices = expenses(store).await.pub_result(ErrorType::Database)?;
    invoices.insert(0, invoice.clone());
    store::save(store, Key::HkdExpenses, &invoices)
        .await
        .pub_result(ErrorType::Database)?;

    let mut lines = vec![format!(
        "Đã lưu hóa đơn đầu vào của {} ngày {}: {}",
        invoice.supplier_name(),
        invoice.date().format("%d/%m/%Y"),
        invoice.amount().currency()
    )];
    for item in invoice.line_items() {
        lines.push(format!(
            "  {} × {} @ {} = {}",
            item.name(),
            item.quantity().normalize(),
            item.unit_price().currency(),
            item.subtotal().currency()
        ));
    }
    Ok(Out::new(lines.join("\n"), invoice))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExpenseList {
    pub period: Option<Period>,
    pub invoices: Vec<InputInvoice>,
    pub total: Vnd,
}

/// Expense invoices, newest first, optionally narrowed to a period.
pub async fn expense_list(config: &Config, args: &PeriodArgs) -> Result<Out<ExpenseList>> {
    let all = expenses(config.store())
        .await
        .pub_result(ErrorType::Database)?;
    let invoices: Vec<InputInvoice> = match args.period() {
        Some(period) => period.filter(&all).into_iter().cloned().collect(),
        None => all,
    };
    let total: Vnd = invoices.iter().map(InputInvoice::amount).sum();

    let mut lines: Vec<String> = invoices
        .iter()
        .map(|i| {
            format!(
                "{}  {:>16}  {}  {}",
                i.date().format("%d/%m/%Y"),
                i.amount().currency(),
                i.supplier_name(),
                i.expense_category().label()
            )
        })
        .collect();
    lines.push(format!(
        "{} hóa đơn, tổng chi phí {}",
        invoices.len(),
        total.currency()
    ));

    Ok(Out::new(
        lines.join("\n"),
        ExpenseList {
            period: args.period(),
            invoices,
            total,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::{ExpenseCategory, LineItem};
    use crate::test::TestEnv;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    #[tokio::test]
    async fn test_add_and_list() {
        let env = TestEnv::new().await;
        let config = env.config();
        let date = NaiveDate::from_ymd_opt(2025, 11, 3).unwrap();
        let args = ExpenseAddArgs::new(
            "Chợ đầu mối",
            vec![
                LineItem::new("Gạo", dec!(2), Vnd::from(150_000)),
                LineItem::new("Dầu ăn", dec!(1.5), Vnd::from(40_000)),
            ],
        )
        .with_date(date)
        .with_category(ExpenseCategory::RawMaterials);
        let out = expense_add(&config, &args).await.unwrap();
        assert_eq!(out.structure().unwrap().amount(), Vnd::from(360_000));

        let nov = Period::Month {
            year: 2025,
            month: 11,
        };
        let list = expense_list(&config, &PeriodArgs::new(Some(nov)))
            .await
            .unwrap();
        assert_eq!(list.structure().unwrap().total, Vnd::from(360_000));

        let dec_period = Period::Month {
            year: 2025,
            month: 12,
        };
        let list = expense_list(&config, &PeriodArgs::new(Some(dec_period)))
            .await
            .unwrap();
        assert!(list.structure().unwrap().invoices.is_empty());
    }

    #[tokio::test]
    async fn test_add_without_supplier_fails() {
        let env = TestEnv::new().await;
        let config = env.config();
        let args = ExpenseAddArgs::new("  ", vec![LineItem::new("x", dec!(1), Vnd::from(1))]);
        let e = expense_add(&config, &args).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
    }

    #[tokio::test]
    async fn test_scan() {
        let env = TestEnv::new().await;
        let config = env.config();
        let image = env.dir().join("hoa_don.png");
        std::fs::write(&image, [0x89, b'P', b'N', b'G']).unwrap();

        let assistant = env.assistant();
        let assistant = assistant.as_ref();
        let args = ExpenseScanArgs::new(&image, ExpenseCategory::RawMaterials);
        let out = expense_scan(&config, assistant, &args).await.unwrap();
        let invoice = out.structure().unwrap();
        assert_eq!(invoice.amount(), Vnd::from(1_550_000));
        assert_eq!(invoice.image(), Some(image.display().to_string().as_str()));
        assert_eq!(invoice.date(), NaiveDate::from_ymd_opt(2026, 1, 10).unwrap());

        let empty = env.dir().join("empty.jpg");
        std::fs::write(&empty, b"").unwrap();
        let args = ExpenseScanArgs::new(&empty, ExpenseCategory::RawMaterials);
        let e = expense_scan(&config, assistant, &args).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Request));

        let missing = ExpenseScanArgs::new(env.dir().join("nope.jpg"), ExpenseCategory::Other);
        let e = expense_scan(&config, assistant, &missing).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Io));
    }
}
