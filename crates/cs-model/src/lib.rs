pub mod category;
pub mod record;
pub mod rules;
pub mod snapshot;

pub use category::*;
pub use record::*;
pub use rules::*;
pub use snapshot::*;
