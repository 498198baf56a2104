pub mod cursor;
pub mod model;

pub use cursor::*;
pub use model::*;
