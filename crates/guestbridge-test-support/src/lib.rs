//! Shared test mocks and utilities for the Guestbridge workspace.

mod clock;
mod collaborators;
mod ids;
mod logs;
mod repository;

pub use clock::{FixedClock, fixed_now};
pub use collaborators::{
    ActivitySignal, ContainerSignal, RecordingActivityObserver, RecordingAlertPresenter,
    RecordingContainer, RecordingEntryPoint,
};
pub use ids::SequenceIds;
pub use logs::{CapturedEvent, CapturedLogs, capture_logs};
pub use repository::{EmptyStateRepository, FailingStateRepository, RecordingStateRepository};
