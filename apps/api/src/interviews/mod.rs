// Read and follow-up handlers for persisted interview records.

pub mod handlers;
