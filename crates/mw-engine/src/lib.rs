//! Config-driven entry point tying duplicate detection, graph building and
//! layout together, with offloaded variants for async hosts.

pub mod engine;
pub mod offload;

pub use engine::{Analysis, Engine};

#[cfg(test)]
mod tests;
