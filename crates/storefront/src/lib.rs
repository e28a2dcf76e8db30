//! Bookstore Storefront client library.
//!
//! Everything a storefront page does on the client side: the shopping cart
//! mirrored to local storage, checkout against the backend, session state,
//! and the product catalog with client-side search.
//!
//! # Architecture
//!
//! - [`state::Storefront`] owns one page's stores (cart, session, catalog)
//! - [`api::ApiClient`] talks to the backend and validates every response
//! - [`storage::LocalStorage`] stands in for browser local storage
//! - [`views`] renders state through askama templates
//! - [`notify::Notifier`] is the alert/confirm surface the front end provides

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod notify;
pub mod services;
pub mod state;
pub mod storage;
pub mod views;

pub use error::{AppError, Result};
pub use state::Storefront;
