//! Report delivery to the chat channel

pub mod feishu_alert;

pub use feishu_alert::{FeishuAlert, FeishuMessage, Notifier, SharedNotifier};
