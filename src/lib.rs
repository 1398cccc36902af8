// src/lib.rs — Library root for bookloop

pub mod cli;
pub mod core;
pub mod evaluator;
pub mod infra;
