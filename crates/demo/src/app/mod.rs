pub(crate) mod bootstrap;
pub(crate) mod loop_runner;
mod metrics;
mod scenario;
mod sinks;
