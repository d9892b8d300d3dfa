pub mod backup;
pub mod chunking;
pub mod dates;
pub mod llm_instructions;
