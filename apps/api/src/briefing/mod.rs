// Interview briefing engine.
// Implements: stage orchestration, sector classification, document assembly.
// All inference calls go through llm_client.

pub mod assembler;
pub mod handlers;
pub mod orchestrator;
pub mod prompts;
pub mod sector;
