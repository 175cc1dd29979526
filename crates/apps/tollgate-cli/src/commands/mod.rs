//! CLI command implementations.

pub mod address;
pub mod balance;
pub mod call;
pub mod completions;
pub mod init;
pub mod resolve;
pub mod tools;

// Re-export command handlers
pub use address::address;
pub use balance::balance;
pub use call::call;
pub use completions::completions;
pub use init::init;
pub use resolve::resolve;
pub use tools::tool;
