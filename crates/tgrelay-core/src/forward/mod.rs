//! The forward pipeline: queue → worker → dispatcher → destination bot.

pub mod dispatcher;
pub mod policy;
pub mod queue;
pub mod update;
pub mod worker;
