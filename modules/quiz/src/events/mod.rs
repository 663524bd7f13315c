pub mod payloads;
pub mod publisher;

// Re-export the platform-wide event envelope
pub use event_bus::{DomainEvent, EventType};
