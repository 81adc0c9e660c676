pub mod counter;
pub mod options;
pub mod store;
pub mod vocab;

pub use counter::*;
pub use options::*;
pub use store::*;
pub use vocab::*;
