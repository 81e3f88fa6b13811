pub mod engine;
pub mod protocol;
pub mod store;

pub mod apply_directive;
pub mod dice;
pub mod directive_parser;
pub mod llm_client;
pub mod prompt_builder;
