pub mod publisher;
pub mod types;

// Re-export key types for convenience
pub use publisher::{EventBus, PublishError};
pub use types::{Notification, Origin};
