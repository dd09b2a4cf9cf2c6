pub mod error;
pub mod fetch;
pub mod loader;
pub mod paginate;
pub mod search;

pub use error::*;
pub use fetch::*;
pub use loader::*;
pub use paginate::*;
pub use search::*;
