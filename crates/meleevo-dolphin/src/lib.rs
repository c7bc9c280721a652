//! Plumbing for driving a live Dolphin process.
//!
//! Two channels connect the trainer to the emulator, both scoped to a single
//! episode and released on drop:
//!
//! - [`MemoryWatcher`] receives game-state change events over a non-blocking
//!   unix datagram socket (Dolphin's MemoryWatcher feature).
//! - [`Pad`] writes controller commands to Dolphin's input pipe.
//!
//! The [`EventSource`] and [`Controller`] traits are the seams the episode
//! loop is generic over, so tests can substitute scripted streams and
//! recording controllers.

pub use self::{
    memory_watcher::{EventSource, EventStreamError, MemoryWatcher},
    pad::{Button, Controller, ControllerError, Pad, Stick},
    paths::{find_dolphin_dir, pad_pipe_path, watcher_socket_path, write_locations},
};

pub mod memory_watcher;
pub mod pad;
pub mod paths;
