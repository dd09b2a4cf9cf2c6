pub mod config;
pub mod display;
pub mod session;

pub use config::*;
pub use display::*;
pub use session::*;
