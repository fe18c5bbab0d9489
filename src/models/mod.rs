pub mod commit;
pub mod provider;

pub use commit::*;
pub use provider::*;
