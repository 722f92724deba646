// Application layer - name resolution, gateway orchestration, wizards.
// The ledger in `domain` stays the single authority on money movement;
// everything here collects input and relays its rejections.

pub mod error;
pub mod provider;
pub mod service;
pub mod wizard;

pub use error::*;
pub use provider::*;
pub use service::*;
pub use wizard::*;
