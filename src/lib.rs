//! ragchat library exports for testing

pub mod backend;
pub mod core;
pub mod markdown;
pub mod tui;

#[cfg(test)]
pub mod test_support;
