//! Input subsystem.
//!
//! Public types carry no winit types. `platform` translates window events into
//! [`InputEvent`]s; [`InputState`] and [`InputFrame`] are the polled view and
//! [`KeyDispatcher`] the callback view of the same stream.

mod dispatch;
mod frame;
pub(crate) mod platform;
mod state;
mod types;

pub use dispatch::{KeyDispatcher, SubscriptionId};
pub use frame::InputFrame;
pub use state::InputState;
pub use types::{
    InputEvent,
    Key,
    KeyState,
    Modifiers,
    MouseButton,
    MouseButtonState,
    MouseWheelDelta,
    PointerButtonEvent,
    PointerMoveEvent,
    TextEvent,
};
