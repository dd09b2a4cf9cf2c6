pub mod derived;
pub mod layer;
pub mod selection;
pub mod state;

pub use derived::*;
pub use layer::*;
pub use selection::*;
pub use state::*;
