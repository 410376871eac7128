//! Inbound Telegram updates and their normalized view.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::domain::{FileRef, UserId};

const UNKNOWN_SENDER: &str = "Unknown";
const PRIVATE_CHAT: &str = "Private";

/// Message kinds we label but do not re-send natively. Order matters: a venue
/// also carries a location.
const OTHER_KINDS: &[&str] = &[
    "audio",
    "animation",
    "video_note",
    "venue",
    "location",
    "contact",
    "poll",
    "dice",
    "game",
];

/// Raw update as received by the webhook, plus how many delivery attempts it
/// has already consumed.
#[derive(Clone, Debug)]
pub struct InboundUpdate {
    payload: Value,
    attempts: u32,
}

impl InboundUpdate {
    pub fn new(payload: Value) -> Self {
        Self {
            payload,
            attempts: 0,
        }
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub(crate) fn record_attempt(&mut self) {
        self.attempts = self.attempts.saturating_add(1);
    }

    /// Extract the forwardable message, if any.
    ///
    /// Returns `None` for updates without a message (callback queries, member
    /// updates, ...) and for payloads that do not match the Bot API shape.
    pub fn normalize(&self) -> Option<NormalizedMessage> {
        let update = WireUpdate::deserialize(&self.payload).ok()?;
        let msg = update
            .message
            .or(update.edited_message)
            .or(update.channel_post)
            .or(update.edited_channel_post)?;
        Some(NormalizedMessage::from_wire(msg))
    }
}

/// A file the destination bot can re-send by id.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Media {
    pub file: FileRef,
    pub caption: Option<String>,
}

/// What a message carries, after precedence has been applied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Content {
    Text(String),
    Photo(Media),
    Video(Media),
    Document(Media),
    Voice(Media),
    Sticker {
        file: FileRef,
        emoji: Option<String>,
    },
    Other(&'static str),
}

impl Content {
    pub fn kind(&self) -> &'static str {
        match self {
            Content::Text(_) => "text",
            Content::Photo(_) => "photo",
            Content::Video(_) => "video",
            Content::Document(_) => "document",
            Content::Voice(_) => "voice",
            Content::Sticker { .. } => "sticker",
            Content::Other(kind) => *kind,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NormalizedMessage {
    pub sender_id: UserId,
    pub display_name: String,
    pub chat_title: String,
    pub content: Content,
}

impl NormalizedMessage {
    /// Header attached to every forwarded message.
    pub fn prefix(&self) -> String {
        format!(
            "✉ From @{} ({})\n📍 {}",
            self.display_name, self.sender_id, self.chat_title
        )
    }

    fn from_wire(msg: WireMessage) -> Self {
        let (sender_id, display_name) = match (&msg.from, &msg.sender_chat) {
            (Some(user), _) => (user.id, user.display_name()),
            (None, Some(chat)) => (chat.id, chat.display_name()),
            (None, None) => (msg.chat.id, msg.chat.display_name()),
        };
        let chat_title = msg
            .chat
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| PRIVATE_CHAT.to_string());

        Self {
            sender_id: UserId(sender_id),
            display_name,
            chat_title,
            content: msg.into_content(),
        }
    }
}

#[derive(Deserialize)]
struct WireUpdate {
    message: Option<WireMessage>,
    edited_message: Option<WireMessage>,
    channel_post: Option<WireMessage>,
    edited_channel_post: Option<WireMessage>,
}

#[derive(Deserialize)]
struct WireMessage {
    from: Option<WireUser>,
    sender_chat: Option<WireChat>,
    chat: WireChat,
    text: Option<String>,
    caption: Option<String>,
    #[serde(default)]
    photo: Vec<WireFile>,
    video: Option<WireFile>,
    document: Option<WireFile>,
    voice: Option<WireFile>,
    sticker: Option<WireSticker>,
    #[serde(flatten)]
    rest: Map<String, Value>,
}

impl WireMessage {
    fn into_content(self) -> Content {
        let caption = self.caption.filter(|c| !c.is_empty());
        let media = |f: WireFile| Media {
            file: FileRef(f.file_id),
            caption: caption.clone(),
        };
        let text = self.text.filter(|t| !t.is_empty());
        // Telegram lists photo sizes smallest first.
        let photo = self.photo.into_iter().last();

        match (text, photo, self.video, self.document, self.voice, self.sticker) {
            (Some(text), ..) => Content::Text(text),
            (None, Some(p), ..) => Content::Photo(media(p)),
            (None, None, Some(v), ..) => Content::Video(media(v)),
            (None, None, None, Some(d), ..) => Content::Document(media(d)),
            (None, None, None, None, Some(v), _) => Content::Voice(media(v)),
            (None, None, None, None, None, Some(s)) => Content::Sticker {
                file: FileRef(s.file_id),
                emoji: s.emoji.filter(|e| !e.is_empty()),
            },
            (None, None, None, None, None, None) => Content::Other(
                OTHER_KINDS
                    .iter()
                    .copied()
                    .find(|k| self.rest.contains_key(*k))
                    .unwrap_or("unknown"),
            ),
        }
    }
}

#[derive(Deserialize)]
struct WireUser {
    id: i64,
    username: Option<String>,
    #[serde(default)]
    first_name: String,
    last_name: Option<String>,
}

impl WireUser {
    fn display_name(&self) -> String {
        if let Some(username) = self.username.as_deref().filter(|u| !u.is_empty()) {
            return username.to_string();
        }
        let full_name = match self.last_name.as_deref().filter(|l| !l.is_empty()) {
            Some(last) => format!("{} {last}", self.first_name),
            None => self.first_name.clone(),
        };
        let full_name = full_name.trim();
        if full_name.is_empty() {
            UNKNOWN_SENDER.to_string()
        } else {
            full_name.to_string()
        }
    }
}

#[derive(Deserialize)]
struct WireChat {
    id: i64,
    title: Option<String>,
    username: Option<String>,
}

impl WireChat {
    fn display_name(&self) -> String {
        self.username
            .as_deref()
            .or(self.title.as_deref())
            .filter(|s| !s.is_empty())
            .unwrap_or(UNKNOWN_SENDER)
            .to_string()
    }
}

#[derive(Deserialize)]
struct WireFile {
    file_id: String,
}

#[derive(Deserialize)]
struct WireSticker {
    file_id: String,
    emoji: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn normalize(v: Value) -> Option<NormalizedMessage> {
        InboundUpdate::new(v).normalize()
    }

    #[test]
    fn text_message_from_group() {
        let msg = normalize(json!({
            "update_id": 1,
            "message": {
                "message_id": 10,
                "from": {"id": 42, "is_bot": false, "first_name": "Alice", "username": "alice"},
                "chat": {"id": -100, "type": "supergroup", "title": "Team Chat"},
                "date": 0,
                "text": "hello"
            }
        }))
        .unwrap();

        assert_eq!(msg.sender_id, UserId(42));
        assert_eq!(msg.display_name, "alice");
        assert_eq!(msg.chat_title, "Team Chat");
        assert_eq!(msg.content, Content::Text("hello".to_string()));
        assert_eq!(msg.prefix(), "✉ From @alice (42)\n📍 Team Chat");
    }

    #[test]
    fn display_name_falls_back_to_full_name_then_unknown() {
        let msg = normalize(json!({
            "message": {
                "from": {"id": 7, "first_name": "Bob", "last_name": "Lee"},
                "chat": {"id": 7, "type": "private", "first_name": "Bob"},
                "text": "x"
            }
        }))
        .unwrap();
        assert_eq!(msg.display_name, "Bob Lee");
        assert_eq!(msg.chat_title, "Private");

        let msg = normalize(json!({
            "message": {
                "from": {"id": 8, "first_name": ""},
                "chat": {"id": 8, "type": "private"},
                "text": "x"
            }
        }))
        .unwrap();
        assert_eq!(msg.display_name, "Unknown");
    }

    #[test]
    fn text_wins_over_photo() {
        let msg = normalize(json!({
            "message": {
                "from": {"id": 1, "first_name": "A"},
                "chat": {"id": 1, "type": "private"},
                "text": "both",
                "photo": [{"file_id": "small"}, {"file_id": "big"}]
            }
        }))
        .unwrap();
        assert_eq!(msg.content, Content::Text("both".to_string()));
    }

    #[test]
    fn photo_uses_largest_size_and_keeps_caption() {
        let msg = normalize(json!({
            "message": {
                "from": {"id": 1, "first_name": "A"},
                "chat": {"id": 1, "type": "private"},
                "caption": "look",
                "photo": [{"file_id": "small"}, {"file_id": "medium"}, {"file_id": "big"}]
            }
        }))
        .unwrap();
        assert_eq!(
            msg.content,
            Content::Photo(Media {
                file: FileRef("big".to_string()),
                caption: Some("look".to_string()),
            })
        );
    }

    #[test]
    fn animation_is_sent_as_document() {
        // Telegram duplicates animations into `document`.
        let msg = normalize(json!({
            "message": {
                "from": {"id": 1, "first_name": "A"},
                "chat": {"id": 1, "type": "private"},
                "animation": {"file_id": "gif"},
                "document": {"file_id": "gif"}
            }
        }))
        .unwrap();
        assert_eq!(msg.content.kind(), "document");
    }

    #[test]
    fn sticker_keeps_emoji() {
        let msg = normalize(json!({
            "message": {
                "from": {"id": 1, "first_name": "A"},
                "chat": {"id": 1, "type": "private"},
                "sticker": {"file_id": "stk", "emoji": "😀"}
            }
        }))
        .unwrap();
        assert_eq!(
            msg.content,
            Content::Sticker {
                file: FileRef("stk".to_string()),
                emoji: Some("😀".to_string()),
            }
        );
    }

    #[test]
    fn unsupported_kinds_are_labelled() {
        let msg = normalize(json!({
            "message": {
                "from": {"id": 1, "first_name": "A"},
                "chat": {"id": 1, "type": "private"},
                "venue": {"title": "Cafe"},
                "location": {"latitude": 0.0, "longitude": 0.0}
            }
        }))
        .unwrap();
        assert_eq!(msg.content, Content::Other("venue"));

        let msg = normalize(json!({
            "message": {
                "from": {"id": 1, "first_name": "A"},
                "chat": {"id": 1, "type": "private"},
                "new_chat_title": "renamed"
            }
        }))
        .unwrap();
        assert_eq!(msg.content, Content::Other("unknown"));
    }

    #[test]
    fn channel_post_uses_sender_chat() {
        let msg = normalize(json!({
            "channel_post": {
                "sender_chat": {"id": -200, "type": "channel", "title": "News"},
                "chat": {"id": -200, "type": "channel", "title": "News"},
                "text": "breaking"
            }
        }))
        .unwrap();
        assert_eq!(msg.sender_id, UserId(-200));
        assert_eq!(msg.display_name, "News");
        assert_eq!(msg.chat_title, "News");
    }

    #[test]
    fn updates_without_message_are_discarded() {
        assert!(normalize(json!({"update_id": 5, "callback_query": {"id": "q"}})).is_none());
        assert!(normalize(json!({"message": {"text": "no chat"}})).is_none());
        assert!(normalize(json!([1, 2, 3])).is_none());
    }
}
