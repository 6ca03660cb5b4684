// handlers/mod.rs - Public vs role-gated handlers
pub mod protected;
pub mod public;
