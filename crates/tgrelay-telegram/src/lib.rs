//! Telegram adapter (teloxide) and the webhook receiver.
//!
//! `TelegramDestination` implements the `tgrelay-core` DestinationPort over the
//! Bot API; `SourceBot` only registers the webhook the receiver listens on.

use std::time::Duration;

use async_trait::async_trait;

use teloxide::{prelude::*, types::InputFile, RequestError};

pub mod router;
pub mod webhook;

use tgrelay_core::{
    domain::{ChatId, FileRef},
    errors::Error,
    messaging::port::DestinationPort,
    Result,
};

/// Bot handle whose HTTP client gives up after `timeout`; the resulting error is
/// reported as transient.
pub fn build_bot(token: &str, timeout: Duration) -> Result<Bot> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(5))
        .tcp_nodelay(true)
        .build()
        .map_err(|e| Error::Config(format!("http client build failed: {e}")))?;
    Ok(Bot::with_client(token, client))
}

/// Network and transport failures are worth retrying; API answers are not.
/// `RetryAfter` (flood control) counts as transient: the worker backs off.
pub fn map_request_error(e: RequestError) -> Error {
    match &e {
        RequestError::Network(_) | RequestError::Io(_) | RequestError::RetryAfter(_) => {
            Error::Transient(format!("telegram error: {e}"))
        }
        _ => Error::External(format!("telegram error: {e}")),
    }
}

/// `@username` of the bot behind `bot`.
async fn username_of(bot: &Bot) -> Result<String> {
    let me = bot.get_me().await.map_err(map_request_error)?;
    Ok(me.username().to_string())
}

#[derive(Clone)]
pub struct TelegramDestination {
    bot: Bot,
}

impl TelegramDestination {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub async fn username(&self) -> Result<String> {
        username_of(&self.bot).await
    }

    fn tg_chat(chat_id: ChatId) -> teloxide::types::ChatId {
        teloxide::types::ChatId(chat_id.0)
    }

    fn tg_file(file: &FileRef) -> InputFile {
        InputFile::file_id(file.0.clone())
    }
}

#[async_trait]
impl DestinationPort for TelegramDestination {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.bot
            .send_message(Self::tg_chat(chat_id), text.to_string())
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn send_photo(&self, chat_id: ChatId, file: &FileRef, caption: &str) -> Result<()> {
        self.bot
            .send_photo(Self::tg_chat(chat_id), Self::tg_file(file))
            .caption(caption.to_string())
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn send_video(&self, chat_id: ChatId, file: &FileRef, caption: &str) -> Result<()> {
        self.bot
            .send_video(Self::tg_chat(chat_id), Self::tg_file(file))
            .caption(caption.to_string())
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn send_document(&self, chat_id: ChatId, file: &FileRef, caption: &str) -> Result<()> {
        self.bot
            .send_document(Self::tg_chat(chat_id), Self::tg_file(file))
            .caption(caption.to_string())
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn send_voice(&self, chat_id: ChatId, file: &FileRef, caption: &str) -> Result<()> {
        self.bot
            .send_voice(Self::tg_chat(chat_id), Self::tg_file(file))
            .caption(caption.to_string())
            .await
            .map_err(map_request_error)?;
        Ok(())
    }

    async fn send_sticker(&self, chat_id: ChatId, file: &FileRef) -> Result<()> {
        self.bot
            .send_sticker(Self::tg_chat(chat_id), Self::tg_file(file))
            .await
            .map_err(map_request_error)?;
        Ok(())
    }
}

/// The bot that receives the traffic. It never sends; it only points Telegram
/// at our webhook.
#[derive(Clone)]
pub struct SourceBot {
    bot: Bot,
}

impl SourceBot {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    pub async fn username(&self) -> Result<String> {
        username_of(&self.bot).await
    }

    pub async fn register_webhook(&self, url: &str) -> Result<()> {
        let url = reqwest::Url::parse(url)
            .map_err(|e| Error::Config(format!("WEBHOOK_URL is not a valid URL: {e}")))?;
        self.bot.set_webhook(url).await.map_err(map_request_error)?;
        Ok(())
    }
}
