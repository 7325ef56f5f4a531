//! fizzy-pop - relay Fizzy notifications to OpenClaw agents

pub mod commands;
pub mod config;
pub mod error;
pub mod fizzy;
pub mod http;
pub mod relay;
pub mod telemetry;
pub mod template;
pub mod webhook;
