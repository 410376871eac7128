use async_trait::async_trait;

use crate::{
    domain::{ChatId, FileRef},
    Result,
};

/// Send surface of the destination bot.
///
/// Every method is a single Bot API call. Implementations must report timeouts
/// and network failures as [`crate::Error::Transient`] so the worker can retry.
#[async_trait]
pub trait DestinationPort: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()>;

    async fn send_photo(&self, chat_id: ChatId, file: &FileRef, caption: &str) -> Result<()>;
    async fn send_video(&self, chat_id: ChatId, file: &FileRef, caption: &str) -> Result<()>;
    async fn send_document(&self, chat_id: ChatId, file: &FileRef, caption: &str) -> Result<()>;
    async fn send_voice(&self, chat_id: ChatId, file: &FileRef, caption: &str) -> Result<()>;

    /// Stickers cannot carry a caption.
    async fn send_sticker(&self, chat_id: ChatId, file: &FileRef) -> Result<()>;
}
