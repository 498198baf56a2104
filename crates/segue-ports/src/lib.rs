pub mod audio;
pub mod playback;
pub mod score;
pub mod storage;
pub mod synth;
pub mod types;

pub use audio::*;
pub use playback::*;
pub use score::*;
pub use storage::*;
pub use synth::*;
pub use types::*;
