pub mod category;
pub mod difficulty;
pub mod modifier;
