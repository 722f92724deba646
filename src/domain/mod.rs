mod account;
mod ledger;
mod money;
mod record;
mod release;

pub use account::*;
pub use ledger::*;
pub use money::*;
pub use record::*;
pub use release::*;
