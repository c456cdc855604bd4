pub mod alert;
pub mod application;
pub mod style;
pub mod types;
