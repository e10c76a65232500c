use std::sync::Arc;

pub use error::*;
pub use sequencer::*;
pub use session::*;
pub use store::*;
pub use ticker::*;
pub use transport::*;

mod error;
mod sequencer;
mod session;
mod store;
mod ticker;
mod transport;

/// Callback fired by the session ticker once per second
pub type TickCallback = Arc<dyn Fn() + Send + Sync>;
