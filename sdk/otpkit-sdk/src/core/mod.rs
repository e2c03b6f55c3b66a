pub mod constants;
pub mod relayer;
pub mod store;
