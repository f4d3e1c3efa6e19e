pub mod jwt;
pub mod llm;
pub mod settings;
