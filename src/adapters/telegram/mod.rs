//! Telegram Adapter

pub mod client;

pub use client::{AlertNotifier, LogNotifier, TelegramNotifier};
