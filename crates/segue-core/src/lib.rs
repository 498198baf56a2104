pub mod clock;
pub mod ipc;
pub mod playback_engine;
pub mod playback_settings;
pub mod scheduler;
pub mod step_queue;
pub mod timers;

pub use clock::*;
pub use ipc::*;
pub use playback_engine::*;
pub use playback_settings::*;
pub use scheduler::*;
pub use step_queue::*;
pub use timers::*;
