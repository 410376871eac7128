//! In-memory `DestinationPort` for tests.

use std::{collections::VecDeque, sync::Mutex};

use async_trait::async_trait;

use crate::{
    domain::{ChatId, FileRef},
    errors::Error,
    messaging::port::DestinationPort,
    Result,
};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Sent {
    Text(ChatId, String),
    Photo(ChatId, String, String),
    Video(ChatId, String, String),
    Document(ChatId, String, String),
    Voice(ChatId, String, String),
    Sticker(ChatId, String),
}

/// Records every successful call. Queued failures are returned (in order) by
/// the next calls instead of recording them.
#[derive(Default)]
pub struct RecordingDestination {
    sent: Mutex<Vec<Sent>>,
    calls: Mutex<usize>,
    failures: Mutex<VecDeque<Error>>,
}

impl RecordingDestination {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next(&self, err: Error) {
        self.failures.lock().unwrap().push_back(err);
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        *self.calls.lock().unwrap()
    }

    fn record(&self, item: Sent) -> Result<()> {
        *self.calls.lock().unwrap() += 1;
        if let Some(err) = self.failures.lock().unwrap().pop_front() {
            return Err(err);
        }
        self.sent.lock().unwrap().push(item);
        Ok(())
    }
}

#[async_trait]
impl DestinationPort for RecordingDestination {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<()> {
        self.record(Sent::Text(chat_id, text.to_string()))
    }

    async fn send_photo(&self, chat_id: ChatId, file: &FileRef, caption: &str) -> Result<()> {
        self.record(Sent::Photo(chat_id, file.0.clone(), caption.to_string()))
    }

    async fn send_video(&self, chat_id: ChatId, file: &FileRef, caption: &str) -> Result<()> {
        self.record(Sent::Video(chat_id, file.0.clone(), caption.to_string()))
    }

    async fn send_document(&self, chat_id: ChatId, file: &FileRef, caption: &str) -> Result<()> {
        self.record(Sent::Document(chat_id, file.0.clone(), caption.to_string()))
    }

    async fn send_voice(&self, chat_id: ChatId, file: &FileRef, caption: &str) -> Result<()> {
        self.record(Sent::Voice(chat_id, file.0.clone(), caption.to_string()))
    }

    async fn send_sticker(&self, chat_id: ChatId, file: &FileRef) -> Result<()> {
        self.record(Sent::Sticker(chat_id, file.0.clone()))
    }
}
