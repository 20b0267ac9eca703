pub mod cache;
pub mod geocode;
pub mod invoicing;
pub mod routing;
