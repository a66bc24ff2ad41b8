//! Green Garden: terminal client for the campus dating-sim server.

pub mod api;
pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;
