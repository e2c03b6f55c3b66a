pub mod actions;
pub mod create;
pub mod wallet;
