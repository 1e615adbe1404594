pub mod config;
pub mod error;
pub mod mode;
pub mod orchestrator;
pub mod paths;
pub mod pipeline;
pub mod self_model;
pub mod session;

pub use error::{Result, SpiritError};
pub use mode::Mode;
pub use orchestrator::{ChatRequest, ChatResponse, Orchestrator};
pub use self_model::SelfModel;
