mod category;
mod ledger;
mod money;
mod sample;
mod transaction;
mod user;

pub use category::*;
pub use ledger::*;
pub use money::*;
pub use sample::*;
pub use transaction::*;
pub use user::*;
