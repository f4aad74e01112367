pub mod dto;
pub mod session;
