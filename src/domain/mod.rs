mod account;
mod bookkeeping;
mod invoice;
mod journal;
mod money;
mod party;
mod report;

pub use account::*;
pub use bookkeeping::*;
pub use invoice::*;
pub use journal::*;
pub use money::*;
pub use party::*;
pub use report::*;
