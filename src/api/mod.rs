//! The generative AI collaborator: invoice extraction and the chat assistant.
//!
//! Commands only see the `Assistant` trait. `Gemini` talks to the Generative Language REST API and
//! `TestAssistant` returns canned answers so that the whole program can run without the network.

mod gemini;
mod test_client;

use crate::model::{ExpenseCategory, InvoiceDraft, LineItem, Vnd};
use crate::{Config, Result};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub use gemini::Gemini;
pub use test_client::TestAssistant;

/// When set to a non-empty value the program uses `TestAssistant` instead of the live service.
pub const TEST_MODE_ENV: &str = "TAX_HELPER_IN_TEST_MODE";

pub(crate) const MISSING_KEY_CHAT: &str = "API Key không được tìm thấy. Vui lòng cấu hình API Key \
    trong môi trường của bạn để sử dụng Trợ lý AI.";
pub(crate) const MISSING_KEY_INVOICE: &str =
    "API Key không được cấu hình. Không thể phân tích hình ảnh.";
pub(crate) const AUTH_FAILED: &str = "Lỗi xác thực: API Key không hợp lệ hoặc bị thiếu. Vui lòng \
    kiểm tra lại cấu hình môi trường của bạn.";
pub(crate) const CONNECTION_FAILED: &str = "Không thể kết nối với Trợ lý AI. Vui lòng thử lại sau.";
pub(crate) const UNREADABLE_INVOICE: &str = "Trợ lý AI không thể đọc được hóa đơn này. Vui lòng \
    thử lại hoặc nhập thủ công.";

/// Whether to use the live AI service or canned test responses.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Mode {
    #[default]
    Live,
    Test,
}

serde_plain::derive_display_from_serialize!(Mode);

impl Mode {
    /// `Mode::Test` when `TAX_HELPER_IN_TEST_MODE` is set and non-empty.
    pub fn from_env() -> Self {
        match std::env::var(TEST_MODE_ENV) {
            Ok(value) if !value.is_empty() => Mode::Test,
            _ => Mode::Live,
        }
    }
}

/// Who said something in a chat.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

serde_plain::derive_display_from_serialize!(Role);

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub text: String,
}

impl ChatTurn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            text: text.into(),
        }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self {
            role: Role::Model,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedItem {
    pub name: String,
    pub quantity: Decimal,
    pub unit_price: Vnd,
}

/// The fields the assistant read off an invoice photo.
#[derive(Debug, Clone, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedInvoice {
    pub supplier_name: String,
    pub supplier_tax_code: String,
    /// `None` when the date on the invoice could not be read.
    pub date: Option<NaiveDate>,
    pub line_items: Vec<ExtractedItem>,
}

impl ExtractedInvoice {
    /// Turns the extraction into a draft that the user can still review before it is saved.
    pub fn into_draft(self, category: ExpenseCategory, image: Option<String>) -> InvoiceDraft {
        InvoiceDraft {
            date: self.date,
            supplier_name: self.supplier_name,
            supplier_tax_code: self.supplier_tax_code,
            description: String::new(),
            expense_category: category,
            line_items: self
                .line_items
                .into_iter()
                .map(|i| LineItem::new(i.name, i.quantity, i.unit_price))
                .collect(),
            image,
        }
    }
}

/// Receives chat text as it streams in.
pub type OnChunk<'a> = &'a mut (dyn FnMut(&str) + Send);

#[async_trait::async_trait]
pub trait Assistant: Send + Sync {
    /// Reads supplier, date and line items off an invoice image.
    async fn extract_invoice_fields(&self, image: &[u8], mime_type: &str)
        -> Result<ExtractedInvoice>;

    /// Sends `message` after `history` and passes each piece of the reply to `on_chunk` as it
    /// arrives. Returns the full reply.
    async fn stream_chat_reply(
        &self,
        history: &[ChatTurn],
        message: &str,
        on_chunk: OnChunk<'_>,
    ) -> Result<String>;
}

/// Creates the assistant for `mode`.
pub fn assistant(config: &Config, mode: Mode) -> Box<dyn Assistant> {
    debug!("Using the {mode} assistant");
    match mode {
        Mode::Live => Box::new(Gemini::new(config)),
        Mode::Test => Box::new(TestAssistant::default()),
    }
}

/// Guesses the image MIME type from the file extension.
pub fn mime_type(file_name: &str) -> &'static str {
    let lower = file_name.to_lowercase();
    match lower.rsplit('.').next() {
        Some("png") => "image/png",
        Some("webp") => "image/webp",
        Some("heic") => "image/heic",
        Some("heif") => "image/heif",
        _ => "image/jpeg",
    }
}

/// The fixed system instruction for the chat assistant.
pub(crate) const SYSTEM_INSTRUCTION: &str = r#"You are an expert AI tax assistant for Vietnam's 2026 tax regulations.
Your knowledge is based on the new rules. Answer questions clearly, concisely, and in Vietnamese.
Do not provide financial advice, only explain the regulations.

Key Rules Summary:
1.  **Personal Income Tax (PIT) 2026:**
    *   Personal Deduction: 15.5 million VND/month.
    *   Dependent Deduction: 6.2 million VND/month.
    *   Dependent Income Limit: A dependent's average monthly income must NOT exceed 1 million VND. If it does, they are not eligible for deduction. This is a critical risk point.
    *   Tax Brackets: 5 new brackets starting at 5% for income up to 10M VND/month.
2.  **Household Business (HKD) Tax 2026:**
    *   Lump-sum tax is abolished. All HKDs must declare revenue.
    *   Group 1 (Revenue <= 200M VND/year): Exempt from VAT and PIT, but must still declare revenue.
    *   Group 2 (Revenue 200M - 3B VND/year): Pay VAT and PIT as a percentage of revenue, based on business category.
    *   Group 3 (Revenue > 3B VND/year): Must use complex accounting methods like a full enterprise.
3.  **E-commerce (TMĐT) Tax:**
    *   Marketplaces (Shopee, Lazada) are required to withhold and pay tax on behalf of sellers.
    *   Goods: 1% VAT + 0.5% PIT.
    *   Services: 5% VAT + 2% PIT.
    *   Sellers with total annual income under 200M VND can file for a tax refund for the amount withheld by marketplaces.

When asked a question, refer to these rules to provide an accurate answer. For example, if a user asks "Mẹ tôi lương hưu 4 triệu, tôi đăng ký NPT được không?", you should respond that based on the 1 million VND income limit, she is not eligible and explain the potential risk of tax recovery.
"#;
