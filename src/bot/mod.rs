//! Bot module for handling Telegram interactions
//!
//! - `message_handler`: turns each incoming message into one reply via the [`Brain`](crate::brain::Brain)
//! - `typing`: background "typing..." indicator while a reply is being prepared

pub mod message_handler;
pub mod typing;

pub use message_handler::message_handler;
pub use typing::start_typing_indicator;
