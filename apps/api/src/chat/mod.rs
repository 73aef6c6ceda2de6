// Weather-advice chat: context provider, prompt assembly, the fail-soft
// pipeline and its HTTP handler. All completions go through llm_client.

pub mod context;
pub mod handlers;
pub mod prompts;
pub mod service;
