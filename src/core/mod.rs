// src/core/mod.rs — Core convergence engine

pub mod book;
pub mod collection;
pub mod coordinator;
pub mod engine;
pub mod hooks;
pub mod types;
