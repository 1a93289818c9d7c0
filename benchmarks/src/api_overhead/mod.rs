//! Host-side cost of driving a queue

mod queue_submission_overhead;

pub use queue_submission_overhead::{QueueSubmissionOverhead, QueueSubmissionOverheadConfig};
