//! Copy and fill bandwidth benchmarks

mod copy_bandwidth;
mod usm_copy_multiple_blits;
mod usm_fill_multiple_blits;

pub use copy_bandwidth::{CopyBandwidth, CopyBandwidthConfig};
pub use usm_copy_multiple_blits::{UsmCopyMultipleBlits, UsmCopyMultipleBlitsConfig};
pub use usm_fill_multiple_blits::{UsmFillMultipleBlits, UsmFillMultipleBlitsConfig};
