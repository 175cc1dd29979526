pub mod helpers;
pub mod mock_executor;
pub mod mock_ledger;

pub use helpers::*;
pub use mock_executor::{ExecutedCall, RecordingExecutor};
pub use mock_ledger::MockLedger;
