mod adapter;
mod experiment;
mod manifest;
mod sweep;

pub use adapter::Adapter;
pub use experiment::Experiment;
pub use manifest::{EntryPointManifest, LoggerManifest, SweepManifest};
pub use sweep::{DEVICE_ENV, EntryPoint, FailurePolicy, LoggerConfig, SweepConfig};
