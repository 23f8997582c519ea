//! waveplan waves: split VMs into ordered execution waves.
//!
//! The sibling of the cohort packer, working at VM granularity. Each
//! strategy orders the VMs, then chunks them into waves of at most
//! `max_vms_per_wave`. VMs that cannot be placed are listed, not dropped.
//!
//! # Components
//!
//! - **`wave`**: Options, wave previews and the build result
//! - **`builder`**: Strategy ordering and chunking

pub mod builder;
pub mod wave;

pub use builder::build_waves;
pub use wave::{WaveBuild, WaveOptions, WavePreview, WaveType};
