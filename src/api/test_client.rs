//! Implements `Assistant` with canned answers for testing purposes.
//!
//! Note: this is compiled even in the "production" version of this app so that we can run the whole
//! app, top-to-bottom, without calling the AI service.

use crate::api::{
    Assistant, ChatTurn, ExtractedInvoice, ExtractedItem, OnChunk, UNREADABLE_INVOICE,
};
use crate::model::Vnd;
use crate::Result;
use anyhow::ensure;
use chrono::NaiveDate;
use rust_decimal::Decimal;

const CANNED_REPLY: &str = "Theo quy định năm 2026, người phụ thuộc phải có thu nhập bình quân \
    tháng không vượt quá 1 triệu đồng. Nếu vượt mức này, bạn không được giảm trừ và có thể bị truy \
    thu thuế.";

/// Returns the same invoice for every image and streams a fixed reply word by word.
#[derive(Debug, Clone)]
pub struct TestAssistant {
    invoice: ExtractedInvoice,
    reply: String,
}

impl TestAssistant {
    pub fn new(invoice: ExtractedInvoice, reply: impl Into<String>) -> Self {
        Self {
            invoice,
            reply: reply.into(),
        }
    }
}

impl Default for TestAssistant {
    fn default() -> Self {
        let invoice = ExtractedInvoice {
            supplier_name: "Công ty TNHH Thực phẩm Sài Gòn".to_string(),
            supplier_tax_code: "0301234567".to_string(),
            date: NaiveDate::from_ymd_opt(2026, 1, 10),
            line_items: vec![
                ExtractedItem {
                    name: "Thịt heo".to_string(),
                    quantity: Decimal::from(10),
                    unit_price: Vnd::from(120_000),
                },
                ExtractedItem {
                    name: "Rau củ".to_string(),
                    quantity: Decimal::ONE,
                    unit_price: Vnd::from(350_000),
                },
            ],
        };
        Self::new(invoice, CANNED_REPLY)
    }
}

#[async_trait::async_trait]
impl Assistant for TestAssistant {
    async fn extract_invoice_fields(
        &self,
        image: &[u8],
        _mime_type: &str,
    ) -> Result<ExtractedInvoice> {
        ensure!(!image.is_empty(), UNREADABLE_INVOICE);
        Ok(self.invoice.clone())
    }

    async fn stream_chat_reply(
        &self,
        _history: &[ChatTurn],
        _message: &str,
        on_chunk: OnChunk<'_>,
    ) -> Result<String> {
        for word in self.reply.split_inclusive(' ') {
            on_chunk(word);
        }
        Ok(self.reply.clone())
    }
}
