//! Chat-platform abstractions (Telegram today).

pub mod paced;
pub mod port;
