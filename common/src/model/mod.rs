pub mod basic_info;
pub mod placeholder;
pub mod request;
pub mod sample;
pub mod segment;
