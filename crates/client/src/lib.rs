//! Client code for precache.
//!
//! This crate provides the HTTP fetch layer and URL handling shared by
//! the worker and any host-runtime adapter.

pub mod fetch;

pub use fetch::{FetchConfig, FetchResponse, HttpClient, Method, Network, Request, canonicalize, same_origin};
