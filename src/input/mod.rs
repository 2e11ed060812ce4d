pub mod events;
pub mod handler;
pub mod interaction;

// Re-export the essential types
pub use events::{MapEvent, PointerEvent, PointerKind};
pub use handler::{Action, EventBus, Subscription};
pub use interaction::{FitRequest, Interaction, InteractionResolver};
