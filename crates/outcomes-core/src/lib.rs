//! Core types and trait definitions for the patient outcomes store.
//!
//! This crate is deliberately free of CSV, HTTP and database dependencies.
//! Every other crate in the workspace depends on it.

// Native `async fn` in traits; the futures' `Send` bounds are spelled out on
// the trait itself.
#![allow(async_fn_in_trait)]

pub mod outcome;
pub mod patient;
pub mod store;
