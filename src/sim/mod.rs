pub mod config;
pub mod driver;
pub mod metrics;
pub mod workload;

pub use config::{DeviceBases, MAX_BURSTS_DRAW, RngKind, SimConfig};
pub use driver::{Sim, SimStatus};
pub use metrics::{ProcessSummary, Summary};
pub use workload::{JavaRandom, SeededRng, UniformSource, generate, workload};
