//! Renders the 01/CNKD household business declaration in the e-tax XML layout.

use crate::model::{Period, UserProfile, Vnd};
use crate::tax::hkd::{Declaration, Indicator};
use crate::Result;
use anyhow::{bail, ensure, Context};
use std::fmt::Write;

const FORM_CODE: &str = "01/CNKD";
const FORM_NAME: &str = "TỜ KHAI THUẾ ĐỐI VỚI HỘ KINH DOANH, CÁ NHÂN KINH DOANH";
const PROVIDER_TAX_CODE: &str = "0100243255";
const PROVIDER_NAME: &str = "TAX HELPER 2026";

/// `01_CNKD_{taxCode}_{year}.xml`
pub fn file_name(profile: &UserProfile, period: Period) -> String {
    format!("01_CNKD_{}_{}.xml", profile.tax_code.trim(), period.year())
}

/// The declaration period in the form's terms: kind, label, first and last month.
struct FilingPeriod {
    kind: &'static str,
    label: String,
    from: String,
    to: String,
}

impl FilingPeriod {
    fn new(period: Period) -> Result<Self> {
        match period {
            Period::Month { year, month } => {
                let month_str = format!("{month:02}/{year}");
                Ok(Self {
                    kind: "T",
                    label: format!("Q{}/{year}", (month - 1) / 3 + 1),
                    from: month_str.clone(),
                    to: month_str,
                })
            }
            Period::Year(year) => Ok(Self {
                kind: "N",
                label: year.to_string(),
                from: format!("01/{year}"),
                to: format!("12/{year}"),
            }),
            Period::Day(_) => {
                bail!("Tờ khai chỉ được lập theo tháng hoặc theo năm, hãy chọn kỳ dạng YYYY-MM hoặc YYYY.")
            }
        }
    }
}

/// Builds the declaration XML. The profile must carry a tax code.
pub fn declaration_xml(declaration: &Declaration, profile: &UserProfile) -> Result<String> {
    ensure!(
        profile.has_tax_code(),
        "Vui lòng cập nhật Mã số thuế trong hồ sơ (taxhelper profile set --tax-code ...) trước khi xuất tờ khai."
    );
    let period = FilingPeriod::new(declaration.period)?;

    let mut x = String::new();
    write_document(&mut x, declaration, profile, &period)
        .context("Không thể tạo nội dung tờ khai XML")?;
    Ok(x)
}

fn write_document<W: Write>(
    x: &mut W,
    declaration: &Declaration,
    profile: &UserProfile,
    period: &FilingPeriod,
) -> std::fmt::Result {
    writeln!(x, r#"<?xml version="1.0" encoding="UTF-8"?>"#)?;
    writeln!(x, "<HSoThueDTu>")?;
    writeln!(x, "  <HSoKhaiThue>")?;
    writeln!(x, "    <TTinChung>")?;
    writeln!(x, "      <TTinDVu>")?;
    writeln!(x, "        <maDVu>ETAX</maDVu>")?;
    writeln!(x, "        <tenDVu>ETAX 1.0</tenDVu>")?;
    writeln!(x, "        <pbanDVu>1.0</pbanDVu>")?;
    writeln!(x, "        <ttinNhaCCapDVu>")?;
    writeln!(x, "          <mst>{PROVIDER_TAX_CODE}</mst>")?;
    writeln!(x, "          <ten>{PROVIDER_NAME}</ten>")?;
    writeln!(x, "        </ttinNhaCCapDVu>")?;
    writeln!(x, "      </TTinDVu>")?;
    writeln!(x, "      <TTinTKhai>")?;
    writeln!(x, "        <maTKhai>{FORM_CODE}</maTKhai>")?;
    writeln!(x, "        <tenTKhai>{}</tenTKhai>", escape(FORM_NAME))?;
    writeln!(x, "        <kyKKhai>")?;
    writeln!(x, "          <kieuKy>{}</kieuKy>", period.kind)?;
    writeln!(x, "          <ky>{}</ky>", period.label)?;
    writeln!(x, "          <kyTuNgay>{}</kyTuNgay>", period.from)?;
    writeln!(x, "          <kyDenNgay>{}</kyDenNgay>", period.to)?;
    writeln!(x, "        </kyKKhai>")?;
    writeln!(x, "        <mstNNT>{}</mstNNT>", escape(profile.tax_code.trim()))?;
    writeln!(x, "        <tenNNT>{}</tenNNT>", escape(&profile.name))?;
    writeln!(x, "        <dchiNNT>{}</dchiNNT>", escape(&profile.full_address()))?;
    writeln!(
        x,
        "        <danhDanhCN>{}</danhDanhCN>",
        escape(profile.personal_id.as_deref().unwrap_or_default())
    )?;
    writeln!(x, "      </TTinTKhai>")?;
    writeln!(x, "    </TTinChung>")?;
    writeln!(x, "    <CTieuTKhai>")?;
    for line in &declaration.lines {
        writeln!(x, r#"      <ChiTieu ma="{}">"#, line.indicator)?;
        for indicator in Indicator::ALL {
            let value = if indicator == line.indicator {
                line.revenue
            } else {
                Vnd::ZERO
            };
            writeln!(x, "        <ct{indicator}>{}</ct{indicator}>", amount(value))?;
        }
        writeln!(x, "      </ChiTieu>")?;
    }
    writeln!(
        x,
        "      <tongDoanhThu>{}</tongDoanhThu>",
        amount(declaration.total_revenue)
    )?;
    writeln!(
        x,
        "      <tongThueGTGT>{}</tongThueGTGT>",
        amount(declaration.total_vat)
    )?;
    writeln!(
        x,
        "      <tongThueTNCN>{}</tongThueTNCN>",
        amount(declaration.total_pit)
    )?;
    writeln!(x, "    </CTieuTKhai>")?;
    writeln!(x, "  </HSoKhaiThue>")?;
    writeln!(x, "</HSoThueDTu>")?;
    Ok(())
}

/// Whole dong, no grouping.
fn amount(v: Vnd) -> String {
    v.round().value().normalize().to_string()
}

fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}
