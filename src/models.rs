pub mod party;
pub mod project;
