pub mod catalog;
pub mod mastery;
