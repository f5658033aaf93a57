// storefront/src/lib.rs

//! eshop storefront: catalog, session cart, authentication and the cart-to-order checkout.
//!
//! The binary (`eshop_server`) wires these modules into an actix-web server; tests build
//! the same app through [`web::configure_app_routes`] and [`state::AppState`].

pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod pipelines;
pub mod services;
pub mod session;
pub mod state;
pub mod web;
