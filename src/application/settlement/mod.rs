//! Settlement application services.

mod hook;

pub use hook::SettlementHook;
