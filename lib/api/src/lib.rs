//! HTTP surface for Shortlist.

pub mod rest;

pub use rest::{configure, RestApi};
