pub mod constants;
pub mod frame;
pub mod session;
pub mod types;
