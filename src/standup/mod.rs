pub mod generator;
pub mod renderer;

pub use generator::{generate_standup, generate_with};
pub use renderer::{render, NO_COMMITS_MESSAGE};
