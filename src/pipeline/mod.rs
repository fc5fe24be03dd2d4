//! Pipeline - orchestration around the correlation core
//!
//! The core in `tracker_core` is pure; everything stateful or concurrent
//! lives here:
//!
//! - `engine` - drives signals through correlation, valuation and display
//! - `buffer` - thread-safe queue of finalized records
//! - `scheduler` - drain-and-submit helper and the price refresh task
//! - `ingestion` - mpsc signal loop with unified flush and final drain
//! - `display` - display collaborator trait and the logging sink
//!
//! Concurrency model: one signal-handling context owns the engine; the
//! flush timer shares only the submission buffer with it.

pub mod buffer;
pub mod display;
pub mod engine;
pub mod ingestion;
pub mod scheduler;

pub use buffer::SubmissionBuffer;
pub use display::{DisplaySink, LogDisplaySink};
pub use engine::{hydrate_history, TrackerEngine};
pub use ingestion::start_signal_ingestion;
pub use scheduler::{price_refresh_task, submit_queued};
