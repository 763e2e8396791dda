pub mod page;
pub mod story;
