//! Outbound messaging abstractions (Telegram today).

pub mod port;

#[cfg(test)]
pub(crate) mod recording;
