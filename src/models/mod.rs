pub mod client;
pub mod job;
pub mod quote;
pub mod status;
