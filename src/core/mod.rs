pub mod catalog;
pub mod classifier;
pub mod pipeline;
pub mod renderer;
pub mod selector;
pub mod template;
