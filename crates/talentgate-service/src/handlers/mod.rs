//! HTTP request handlers.

pub mod accounts;
pub mod consumption;
pub mod credits;
pub mod health;
pub mod webhooks;
