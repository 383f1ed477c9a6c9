pub mod adapter;
pub mod context;
pub mod status;
