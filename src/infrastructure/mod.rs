pub mod event_bus;
pub mod observability;

pub use event_bus::{ChannelListener, EventBus};
