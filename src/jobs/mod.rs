// Background story jobs: in-memory tracking plus the pipeline worker

pub mod store;
pub mod worker;

pub use store::JobStore;
pub use worker::run_story_job;
