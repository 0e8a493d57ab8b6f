#![deny(missing_docs)]
//! Telegram webhook setup.
//!
//! Registers, inspects and removes the webhook of a Telegram bot.

/// Configuration management.
pub mod config;
/// Log output with bot token redaction.
pub mod logging;
/// Webhook registration against the Bot API.
pub mod webhook;
