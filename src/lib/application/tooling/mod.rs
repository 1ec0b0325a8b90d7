//! MCP tool-server plumbing: the stdio process, the connection trait handed
//! to the agent, and the resolver that turns launch parameters into a
//! [`ToolSession`].

mod error;
mod interface;
mod process;
mod resolver;

pub use error::{ToolInvokeError, ToolResolutionError};
pub use interface::{ServerToolInfo, ToolConnection, ToolDescriptor};
pub use process::McpProcess;
pub use resolver::{McpToolResolver, ToolResolver, ToolSession};
