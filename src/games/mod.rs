pub mod types;
pub mod wheel;
pub mod neighbors;
pub mod payouts;
pub mod rng;
pub mod settlement;
pub mod session;

pub use types::*;
pub use neighbors::neighbors;
pub use payouts::PayoutTable;
pub use rng::{FixedSource, OsRngSource, SpinSource};
pub use settlement::{evaluate, SettlementConfig, SettlementEngine};
pub use session::{InMemorySessionStore, SessionLimits, SessionSnapshot, SessionStore};
