pub mod actions;
pub mod status;
