//! Implements `Assistant` with the Generative Language REST API.

use crate::api::{
    Assistant, ChatTurn, ExtractedInvoice, ExtractedItem, OnChunk, AUTH_FAILED,
    CONNECTION_FAILED, MISSING_KEY_CHAT, MISSING_KEY_INVOICE, SYSTEM_INSTRUCTION,
    UNREADABLE_INVOICE,
};
use crate::model::Vnd;
use crate::{Config, Result};
use anyhow::{anyhow, Context};
use base64::Engine;
use chrono::NaiveDate;
use reqwest::{Response, StatusCode};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value};
use std::fmt::{Display, Formatter};
use tracing::{debug, error, trace};
use url::Url;

const EXTRACTION_PROMPT: &str = "Phân tích hình ảnh hóa đơn này và trích xuất thông tin chi tiết \
    theo cấu trúc JSON đã cho. Ưu tiên các hạng mục chi tiết (tên hàng, số lượng, đơn giá).";

pub struct Gemini {
    client: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
}

impl Gemini {
    pub fn new(config: &Config) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: config.ai_base_url().to_string(),
            model: config.ai_model().to_string(),
            api_key: config.api_key(),
            api_key_env: config.api_key_env().to_string(),
        }
    }

    fn key(&self, missing: &str) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            error!("The environment variable {} is not set", self.api_key_env);
            anyhow!("{missing} ({})", self.api_key_env)
        })
    }

    /// `{base}/v1beta/models/{model}:{method}`
    fn endpoint(&self, method: &str) -> Result<Url> {
        let base = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid AI base URL '{}'", self.base_url))?;
        base.join(&format!("v1beta/models/{}:{method}", self.model))
            .context("Unable to build the AI endpoint URL")
    }

    async fn extract(&self, key: &str, image: &[u8], mime_type: &str) -> Result<ExtractedInvoice> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [
                    {
                        "inlineData": {
                            "mimeType": mime_type,
                            "data": base64::engine::general_purpose::STANDARD.encode(image),
                        }
                    },
                    { "text": EXTRACTION_PROMPT },
                ]
            }],
            "generationConfig": {
                "responseMimeType": "application/json",
                "responseSchema": invoice_schema(),
            }
        });

        let url = self.endpoint("generateContent")?;
        debug!("Sending {} image bytes to {url}", image.len());
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .context("Failed to send the invoice extraction request")?;
        let response: GenerateResponse = check(response)
            .await?
            .json()
            .await
            .context("Failed to parse the invoice extraction response")?;

        let text = response.text();
        if text.trim().is_empty() {
            anyhow::bail!("Trợ lý AI không trả về nội dung JSON hợp lệ.");
        }
        parse_invoice(text.trim())
    }

    async fn chat(
        &self,
        key: &str,
        history: &[ChatTurn],
        message: &str,
        on_chunk: OnChunk<'_>,
    ) -> Result<String> {
        let mut contents: Vec<Value> = history
            .iter()
            .map(|turn| json!({ "role": turn.role, "parts": [{ "text": turn.text }] }))
            .collect();
        contents.push(json!({ "role": "user", "parts": [{ "text": message }] }));
        let body = json!({
            "systemInstruction": { "parts": [{ "text": SYSTEM_INSTRUCTION }] },
            "contents": contents,
        });

        let mut url = self.endpoint("streamGenerateContent")?;
        url.query_pairs_mut().append_pair("alt", "sse");
        debug!("Streaming chat reply from {url}");
        let response = self
            .client
            .post(url)
            .header("x-goog-api-key", key)
            .json(&body)
            .send()
            .await
            .context("Failed to send the chat request")?;
        let mut response = check(response).await?;

        let mut lines = SseLines::default();
        let mut reply = String::new();
        while let Some(bytes) = response
            .chunk()
            .await
            .context("Failed to read the chat stream")?
        {
            for line in lines.push(&bytes) {
                if let Some(text) = event_text(&line)? {
                    on_chunk(&text);
                    reply.push_str(&text);
                }
            }
        }
        if let Some(line) = lines.finish() {
            if let Some(text) = event_text(&line)? {
                on_chunk(&text);
                reply.push_str(&text);
            }
        }
        trace!("Chat reply finished after {} characters", reply.chars().count());
        Ok(reply)
    }
}

#[async_trait::async_trait]
impl Assistant for Gemini {
    async fn extract_invoice_fields(
        &self,
        image: &[u8],
        mime_type: &str,
    ) -> Result<ExtractedInvoice> {
        let key = self.key(MISSING_KEY_INVOICE)?;
        self.extract(key, image, mime_type).await.map_err(|e| {
            error!("Lỗi khi phân tích hóa đơn bằng AI: {e:#}");
            anyhow!(UNREADABLE_INVOICE)
        })
    }

    async fn stream_chat_reply(
        &self,
        history: &[ChatTurn],
        message: &str,
        on_chunk: OnChunk<'_>,
    ) -> Result<String> {
        let key = self.key(MISSING_KEY_CHAT)?;
        self.chat(key, history, message, on_chunk)
            .await
            .map_err(|e| {
                error!("Error streaming chat response: {e:#}");
                match e.downcast_ref::<StatusError>() {
                    Some(status) if status.is_auth() => anyhow!(AUTH_FAILED),
                    _ => anyhow!(CONNECTION_FAILED),
                }
            })
    }
}

/// A non-success HTTP status from the service.
#[derive(Debug)]
struct StatusError {
    status: StatusCode,
    body: String,
}

impl StatusError {
    fn is_auth(&self) -> bool {
        matches!(
            self.status,
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN
        )
    }
}

impl Display for StatusError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "AI service returned {}: {}", self.status, self.body)
    }
}

impl std::error::Error for StatusError {}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read response body".to_string());
    Err(anyhow::Error::new(StatusError { status, body }))
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Default, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Default, Deserialize)]
struct Part {
    #[serde(default)]
    text: String,
}

impl GenerateResponse {
    /// The text of the first candidate.
    fn text(&self) -> String {
        self.candidates
            .first()
            .map(|c| c.content.parts.iter().map(|p| p.text.as_str()).collect())
            .unwrap_or_default()
    }
}

/// Splits a byte stream into lines. Bytes are held until a full line arrives so that multi-byte
/// characters split across chunks are decoded whole.
#[derive(Debug, Default)]
struct SseLines {
    buf: Vec<u8>,
}

impl SseLines {
    fn push(&mut self, bytes: &[u8]) -> Vec<String> {
        self.buf.extend_from_slice(bytes);
        let mut lines = Vec::new();
        while let Some(pos) = self.buf.iter().position(|&b| b == b'\n') {
            let line: Vec<u8> = self.buf.drain(..=pos).collect();
            lines.push(String::from_utf8_lossy(&line).trim_end().to_string());
        }
        lines
    }

    fn finish(&mut self) -> Option<String> {
        if self.buf.is_empty() {
            return None;
        }
        let line = String::from_utf8_lossy(&self.buf).trim_end().to_string();
        self.buf.clear();
        Some(line)
    }
}

/// The reply text carried by one `data:` line of the event stream.
fn event_text(line: &str) -> Result<Option<String>> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(None);
    };
    let event: GenerateResponse =
        serde_json::from_str(data.trim()).context("Invalid event in the chat stream")?;
    let text = event.text();
    Ok((!text.is_empty()).then_some(text))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InvoiceJson {
    #[serde(default)]
    supplier_name: String,
    #[serde(default)]
    supplier_tax_code: String,
    #[serde(default)]
    date: String,
    #[serde(default)]
    line_items: Vec<ItemJson>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemJson {
    #[serde(default)]
    name: String,
    quantity: Option<Decimal>,
    unit_price: Option<Decimal>,
}

/// Missing quantities become 1 and missing prices become 0. An unreadable date is left empty.
fn parse_invoice(json: &str) -> Result<ExtractedInvoice> {
    let raw: InvoiceJson =
        serde_json::from_str(json).context("The invoice extraction is not the expected JSON")?;
    Ok(ExtractedInvoice {
        supplier_name: raw.supplier_name.trim().to_string(),
        supplier_tax_code: raw.supplier_tax_code.trim().to_string(),
        date: NaiveDate::parse_from_str(raw.date.trim(), "%Y-%m-%d").ok(),
        line_items: raw
            .line_items
            .into_iter()
            .map(|i| ExtractedItem {
                name: i.name.trim().to_string(),
                quantity: i.quantity.unwrap_or(Decimal::ONE),
                unit_price: Vnd::from(i.unit_price.unwrap_or_default()),
            })
            .collect(),
    })
}

fn invoice_schema() -> Value {
    json!({
        "type": "OBJECT",
        "properties": {
            "supplierName": {
                "type": "STRING",
                "description": "Tên nhà cung cấp hoặc người bán.",
            },
            "supplierTaxCode": {
                "type": "STRING",
                "description": "Mã số thuế của nhà cung cấp. Nếu không có, trả về chuỗi rỗng.",
            },
            "date": {
                "type": "STRING",
                "description": "Ngày trên hóa đơn, định dạng YYYY-MM-DD. Nếu không rõ, trả về ngày hôm nay.",
            },
            "lineItems": {
                "type": "ARRAY",
                "description": "Danh sách các hạng mục chi tiết trên hóa đơn.",
                "items": {
                    "type": "OBJECT",
                    "properties": {
                        "name": { "type": "STRING", "description": "Tên sản phẩm hoặc dịch vụ." },
                        "quantity": {
                            "type": "NUMBER",
                            "description": "Số lượng. Mặc định là 1 nếu không rõ.",
                        },
                        "unitPrice": {
                            "type": "NUMBER",
                            "description": "Đơn giá của sản phẩm/dịch vụ. Nếu chỉ có tổng thành tiền cho hạng mục, hãy coi đó là đơn giá và số lượng là 1.",
                        },
                    },
                    "required": ["name", "quantity", "unitPrice"],
                },
            },
        },
        "required": ["supplierName", "date", "lineItems"],
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_invoice_defaults() {
        let json = r#"{
            "supplierName": " Tạp hóa Bình ",
            "date": "2026-02-30",
            "lineItems": [
                { "name": "Nước mắm", "quantity": 3, "unitPrice": 45000 },
                { "name": "Phí giao hàng", "unitPrice": 20000 },
                { "name": "Quà tặng", "quantity": 1 }
            ]
        }"#;
        let invoice = parse_invoice(json).unwrap();
        assert_eq!(invoice.supplier_name, "Tạp hóa Bình");
        assert_eq!(invoice.supplier_tax_code, "");
        assert_eq!(invoice.date, None);
        assert_eq!(invoice.line_items[0].quantity, dec!(3));
        assert_eq!(invoice.line_items[1].quantity, Decimal::ONE);
        assert_eq!(invoice.line_items[2].unit_price, Vnd::ZERO);
    }

    #[test]
    fn test_parse_invoice_rejects_garbage() {
        assert!(parse_invoice("xin chào").is_err());
    }

    #[test]
    fn test_sse_lines_keep_split_characters() {
        let event = "data: {\"candidates\":[{\"content\":{\"parts\":[{\"text\":\"Thuế\"}]}}]}\n\n";
        let bytes = event.as_bytes();
        // split inside the multi-byte 'ế'
        let cut = event.find('ế').unwrap() + 1;
        let mut lines = SseLines::default();
        assert!(lines.push(&bytes[..cut]).is_empty());
        let got = lines.push(&bytes[cut..]);
        assert_eq!(got.len(), 2);
        assert_eq!(event_text(&got[0]).unwrap().as_deref(), Some("Thuế"));
        assert_eq!(event_text(&got[1]).unwrap(), None);
        assert!(lines.finish().is_none());
    }

    #[test]
    fn test_event_text_ignores_other_fields() {
        assert_eq!(event_text("event: ping").unwrap(), None);
        assert_eq!(event_text(r#"data: {"candidates":[]}"#).unwrap(), None);
        assert!(event_text("data: {").is_err());
    }

    #[test]
    fn test_status_error_classification() {
        let e = StatusError {
            status: StatusCode::FORBIDDEN,
            body: String::new(),
        };
        assert!(e.is_auth());
        let e = StatusError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: String::new(),
        };
        assert!(!e.is_auth());
    }
}
