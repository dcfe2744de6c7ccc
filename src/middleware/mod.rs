// Middleware applied to every route

pub mod cors;

pub use cors::*;
