//! Model infrastructure module
//!
//! # Structure
//! - `types` - Request, reply, finish reason and error types
//! - `traits` - ModelProvider trait
//! - `adapter` - Message format adapters
//! - `factory` - Provider factory for creating clients
//! - `clients` - Client implementations

pub mod adapter;
pub mod clients;
pub mod factory;
pub mod traits;
pub mod types;

// Re-exports for convenience
pub use factory::ProviderFactory;
pub use traits::ModelProvider;
pub use types::{FinishReason, ModelError, ModelRequest, ModelResponse};
