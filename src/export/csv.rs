use crate::model::{Dated, Transaction};
use crate::Result;
use anyhow::{anyhow, ensure, Context};
use csv::{QuoteStyle, Terminator, WriterBuilder};

pub const FILE_NAME: &str = "lich_su_giao_dich.csv";

/// Spreadsheet apps need the byte order mark to pick UTF-8 for the Vietnamese headers.
const BOM: &str = "\u{feff}";

/// Renders the revenue ledger as CSV. Text fields are quoted, amounts are not.
pub fn transactions_csv(transactions: &[Transaction]) -> Result<String> {
    ensure!(
        !transactions.is_empty(),
        "Chưa có giao dịch nào để xuất."
    );

    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::NonNumeric)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(vec![]);

    wtr.write_record(["ID", "Ngày", "Ghi chú", "Số tiền (VND)"])
        .context("Unable to write CSV header")?;

    for t in transactions {
        wtr.write_record([
            t.id().to_string(),
            t.date().format("%d/%m/%Y").to_string(),
            t.description().to_string(),
            t.amount().value().normalize().to_string(),
        ])
        .with_context(|| format!("Unable to write CSV row for transaction {}", t.id()))?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| anyhow!("CSV writer error: {e}"))?;
    let body = String::from_utf8(data).context("CSV output is not valid UTF-8")?;
    Ok(format!("{BOM}{body}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BusinessCategory, Vnd};
    use chrono::NaiveDate;

    #[test]
    fn test_empty_ledger_is_an_error() {
        assert!(transactions_csv(&[]).is_err());
    }

    #[test]
    fn test_csv_layout() {
        let date = NaiveDate::from_ymd_opt(2025, 7, 1).unwrap();
        let t = Transaction::new(
            date,
            Vnd::from(1_500_000),
            BusinessCategory::Distribution,
            Some(r#"Bán "combo" tết"#),
        )
        .unwrap();
        let csv = transactions_csv(std::slice::from_ref(&t)).unwrap();

        assert!(csv.starts_with('\u{feff}'));
        let lines: Vec<&str> = csv.trim_start_matches('\u{feff}').lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], r#""ID","Ngày","Ghi chú","Số tiền (VND)""#);
        assert_eq!(
            lines[1],
            format!(r#""{}","01/07/2025","Bán ""combo"" tết",1500000"#, t.id())
        );
    }
}
