//! webhook relay between prometheus alertmanager and chat-bot endpoints
//!
//! Features:
//! - groups incoming alerts by alert name and renders markdown messages
//! - pushes to DingTalk (signed urls) and WeChat Work (static key) robots
//! - per-environment credentials resolved from the process environment
//! - never fails the alertmanager caller on delivery problems

pub mod alert;
pub mod alert_renderer;
pub mod credentials;
pub mod log;
pub mod metrics;
pub mod notifier;
pub mod provider;
pub mod settings;
pub mod sign;
pub mod webhook_receiver;
