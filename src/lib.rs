//! Touch handling for a floating volume bubble: tap to reveal the volume
//! control, drag to move it, drop it on the trash to dismiss it.
//!
//! [`controller::BubbleController`] is the entry point. It consumes pointer
//! events one at a time and talks to the platform only through the traits in
//! [`host`].

pub mod controller;
pub mod deletion;
pub mod gestures;
pub mod host;
pub mod pointer;
pub mod proximity;
pub mod snap;

pub use controller::{BubbleController, Outcome, Tuning};
pub use host::{
    Bounds, BubblePosition, Collaborators, Feedback, HostError, Lifecycle, ScreenHost,
    ScreenMetrics, Signal, VolumeControl,
};
pub use pointer::{PointerEvent, PointerPhase, PointerSample};
