pub mod interview;
pub mod memory;
