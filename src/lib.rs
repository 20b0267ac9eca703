//! Field-service CRM API
//!
//! This library provides the fieldops backend: clients, quotes and jobs
//! with a status-policy core, scheduling, map dispatch (geocoding and
//! route estimates) and draft e-invoicing.

pub mod app_state;
pub mod config;
pub mod db;
pub mod models;
pub mod routes;
pub mod services;
