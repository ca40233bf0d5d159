use crate::args::{OutArgs, ReconcileArgs};
use crate::commands::{write_export, Out};
use crate::error::{ErrorType, IntoResult};
use crate::tax::ecommerce::{self, MatchStatus, Reconciliation, SAMPLE_CSV, SAMPLE_FILE_NAME};
use crate::{utils, Config, Result};
use anyhow::Context;
use tracing::debug;

/// Compares the tax a platform withheld on every order with the tax owed on completed orders.
pub async fn ecommerce_reconcile(args: &ReconcileArgs) -> Result<Out<Reconciliation>> {
    let file = args.file();
    let content = utils::read(file)
        .await
        .with_context(|| format!("Unable to read the sales report {}", file.display()))
        .pub_result(ErrorType::Io)?;
    let records = ecommerce::parse_report(&content).pub_result(ErrorType::Validation)?;
    debug!("Parsed {} orders from {}", records.len(), file.display());

    let r = ecommerce::reconcile(&records, args.kind());
    let mut lines = vec![
        format!("Số đơn hàng:                 {}", r.orders),
        format!(
            "Doanh thu thực tế (hoàn thành): {}",
            r.completed_revenue.currency()
        ),
        format!(
            "Doanh thu sàn báo cáo:       {}",
            r.reported_revenue.currency()
        ),
        format!("Thuế tính đúng:              {}", r.calculated_tax.currency()),
        format!("Thuế sàn đã khấu trừ:        {}", r.platform_tax.currency()),
    ];
    match r.status {
        MatchStatus::Match => lines.push("Số thuế sàn khấu trừ khớp với số thuế phải nộp.".into()),
        MatchStatus::Mismatch => lines.push(format!(
            "Chênh lệch {}: sàn đã khấu trừ thuế trên cả các đơn hàng bị hủy.",
            r.discrepancy.currency()
        )),
    }
    if let Some(refund) = r.refund {
        lines.push(format!(
            "Doanh thu dưới 200 triệu/năm: bạn có thể đề nghị hoàn {} tiền thuế đã bị khấu trừ.",
            refund.currency()
        ));
    }
    Ok(Out::new(lines.join("\n"), r))
}

/// Writes a sample sales report in the format `ecommerce reconcile` reads.
pub async fn ecommerce_sample(config: &Config, args: &OutArgs) -> Result<Out<()>> {
    let path = write_export(config, args.out(), SAMPLE_FILE_NAME, SAMPLE_CSV)
        .await
        .context("Unable to write the sample report")
        .pub_result(ErrorType::Io)?;
    Ok(format!("Đã tạo tệp mẫu {}", path.display()).into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::error_type;
    use crate::model::Vnd;
    use crate::tax::ecommerce::RateKind;
    use crate::test::TestEnv;

    #[tokio::test]
    async fn test_sample_then_reconcile() {
        let env = TestEnv::new().await;
        let config = env.config();
        let out = ecommerce_sample(&config, &OutArgs::default()).await.unwrap();
        let path = config.exports().join(SAMPLE_FILE_NAME);
        assert!(out.message().contains(SAMPLE_FILE_NAME));

        let out = ecommerce_reconcile(&ReconcileArgs::new(&path, RateKind::Goods))
            .await
            .unwrap();
        let r = out.structure().unwrap();
        assert_eq!(r.orders, 4);
        assert_eq!(r.calculated_tax, Vnd::from(405_000));
        assert_eq!(r.platform_tax, Vnd::from(427_500));
        assert_eq!(r.status, MatchStatus::Mismatch);
        assert_eq!(r.refund, Some(Vnd::from(405_000)));
        assert!(out.message().contains("22.500 ₫"));
    }

    #[tokio::test]
    async fn test_reconcile_errors() {
        let env = TestEnv::new().await;
        let missing = ReconcileArgs::new(env.dir().join("nope.csv"), RateKind::Goods);
        let e = ecommerce_reconcile(&missing).await.unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Io));

        let header_only = env.dir().join("header.csv");
        std::fs::write(&header_only, "OrderID,Revenue,Status\n").unwrap();
        let e = ecommerce_reconcile(&ReconcileArgs::new(&header_only, RateKind::Services))
            .await
            .unwrap_err();
        assert_eq!(error_type(&e), Some(ErrorType::Validation));
    }
}
