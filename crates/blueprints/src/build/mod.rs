//! Build executor: preview decoding, throttled jobs, support override.

pub mod executor;
pub mod job;
pub mod plan;
pub mod support;

#[cfg(test)]
mod tests;

pub use executor::*;
pub use job::*;
pub use plan::*;
pub use support::*;
