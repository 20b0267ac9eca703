pub mod clients;
pub mod dispatch;
pub mod health;
pub mod invoices;
pub mod jobs;
pub mod metrics;
pub mod quotes;
