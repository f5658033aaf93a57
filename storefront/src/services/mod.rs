// storefront/src/services/mod.rs

pub mod auth_guard;
pub mod auth_service;
