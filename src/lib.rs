pub mod clipboard;
pub mod config;
pub mod console;
pub mod domain;
pub mod error;
pub mod mail;
pub mod notifier;
pub mod session;
pub mod store;
pub mod terminal;
