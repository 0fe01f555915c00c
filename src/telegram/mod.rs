//! Typed client for the Telegram Bot HTTP API.
//!
//! Covers only the slice of the API the coach needs: long polling via
//! `getUpdates`, text replies with optional inline keyboards, and callback
//! acknowledgement. Everything rides on a shared `reqwest::Client`.

pub mod api;
pub mod types;

pub use api::{split_message, BotApi, MESSAGE_CHUNK_LIMIT};
pub use types::{
    CallbackQuery, Chat, InlineKeyboardButton, InlineKeyboardMarkup, Message, Update, User,
};
