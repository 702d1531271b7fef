pub mod coordinator;
pub mod error;
pub mod normalize;
pub mod ports;
pub mod trigger;
pub mod view;
