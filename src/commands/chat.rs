use crate::api::{Assistant, ChatTurn};
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::Result;
use anyhow::Context;
use serde::Serialize;
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::debug;

const GREETING: &str = "Xin chào! Tôi là trợ lý thuế AI. Bạn có câu hỏi nào về các quy định thuế \
    mới năm 2026 không? Gõ 'exit' để thoát.";
const PROMPT: &str = "> ";
const EXIT_WORDS: [&str; 3] = ["exit", "quit", "thoát"];

/// The turns of one chat session. A failed reply is kept as a model turn holding the error
/// message, and later questions are sent with it as history.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatLog {
    pub turns: Vec<ChatTurn>,
    pub failures: u32,
}

impl ChatLog {
    /// Asks one question, streaming the reply into `out`. A failure becomes the model's turn.
    async fn ask<W>(&mut self, assistant: &dyn Assistant, message: &str, out: &mut W) -> Result<()>
    where
        W: Write + Send,
    {
        let mut write_error = None;
        let mut on_chunk = |chunk: &str| {
            if write_error.is_none() {
                if let Err(e) = out.write_all(chunk.as_bytes()).and_then(|_| out.flush()) {
                    write_error = Some(e);
                }
            }
        };
        let reply = assistant
            .stream_chat_reply(&self.turns, message, &mut on_chunk)
            .await;
        if let Some(e) = write_error {
            return Err(e).context("Unable to write the chat reply");
        }

        self.turns.push(ChatTurn::user(message));
        let text = match reply {
            Ok(text) => text,
            Err(e) => {
                self.failures += 1;
                let text = e.to_string();
                write!(out, "{text}").context("Unable to write the chat reply")?;
                text
            }
        };
        writeln!(out).context("Unable to write the chat reply")?;
        self.turns.push(ChatTurn::model(text));
        Ok(())
    }
}

/// Asks a single question. The reply is streamed into `out` as it arrives.
pub async fn chat<W>(assistant: &dyn Assistant, message: &str, out: &mut W) -> Result<Out<ChatLog>>
where
    W: Write + Send,
{
    let mut log = ChatLog::default();
    log.ask(assistant, message, out)
        .await
        .pub_result(ErrorType::Io)?;
    if log.failures > 0 {
        let reason = log
            .turns
            .last()
            .map(|t| t.text.clone())
            .unwrap_or_default();
        return Err(anyhow::anyhow!(reason)).pub_result(ErrorType::Request);
    }
    Ok(Out::new("Trợ lý AI đã trả lời.", log))
}

/// Runs an interactive session: one question per line from `input` until EOF or an exit word.
/// A failed turn shows the error and the session continues.
pub async fn chat_session<R, W>(
    assistant: &dyn Assistant,
    input: R,
    out: &mut W,
) -> Result<Out<ChatLog>>
where
    R: AsyncBufRead + Unpin,
    W: Write + Send,
{
    let mut log = ChatLog::default();
    writeln!(out, "{GREETING}")
        .context("Unable to write to the terminal")
        .pub_result(ErrorType::Io)?;

    let mut lines = input.lines();
    loop {
        write!(out, "{PROMPT}")
            .and_then(|_| out.flush())
            .context("Unable to write to the terminal")
            .pub_result(ErrorType::Io)?;
        let Some(line) = lines
            .next_line()
            .await
            .context("Unable to read from the terminal")
            .pub_result(ErrorType::Io)?
        else {
            break;
        };
        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if EXIT_WORDS.contains(&message.to_lowercase().as_str()) {
            break;
        }
        log.ask(assistant, message, out)
            .await
            .pub_result(ErrorType::Io)?;
        debug!("Chat turn {} done", log.turns.len() / 2);
    }

    let asked = log.turns.len() / 2;
    Ok(Out::new(
        format!("Kết thúc trò chuyện sau {asked} câu hỏi."),
        log,
    ))
}
