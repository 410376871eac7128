use std::sync::Arc;

use crate::{
    domain::ChatId,
    forward::update::{Content, Media, NormalizedMessage},
    messaging::port::DestinationPort,
    Result,
};

/// Re-sends normalized messages into the destination chat.
#[derive(Clone)]
pub struct Dispatcher {
    destination: Arc<dyn DestinationPort>,
    target: ChatId,
}

impl Dispatcher {
    pub fn new(destination: Arc<dyn DestinationPort>, target: ChatId) -> Self {
        Self {
            destination,
            target,
        }
    }

    pub fn target(&self) -> ChatId {
        self.target
    }

    /// Issue the one outbound action matching the message content.
    ///
    /// Stickers take two calls (sticker, then the header as text); every other
    /// kind is a single call.
    pub async fn dispatch(&self, msg: &NormalizedMessage) -> Result<()> {
        let prefix = msg.prefix();
        let dest = self.destination.as_ref();
        let chat = self.target;

        match &msg.content {
            Content::Text(text) => dest.send_text(chat, &format!("{prefix}\n\n{text}")).await,
            Content::Photo(m) => dest.send_photo(chat, &m.file, &caption(&prefix, m)).await,
            Content::Video(m) => dest.send_video(chat, &m.file, &caption(&prefix, m)).await,
            Content::Document(m) => {
                dest.send_document(chat, &m.file, &caption(&prefix, m))
                    .await
            }
            Content::Voice(m) => dest.send_voice(chat, &m.file, &caption(&prefix, m)).await,
            Content::Sticker { file, emoji } => {
                dest.send_sticker(chat, file).await?;
                let note = match emoji {
                    Some(emoji) => format!("{prefix}\nSticker {emoji}"),
                    None => prefix,
                };
                dest.send_text(chat, &note).await
            }
            Content::Other(kind) => {
                dest.send_text(chat, &format!("{prefix}\n[Type: {kind}]"))
                    .await
            }
        }
    }
}

fn caption(prefix: &str, media: &Media) -> String {
    match media.caption.as_deref() {
        Some(original) => format!("{prefix}\n\n{original}"),
        None => prefix.to_string(),
    }
}
