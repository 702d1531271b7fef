pub mod dto;
pub mod mock;
pub mod remote;
