//! Move sources: where the opponent's column comes from. The easy tier picks
//! at random; the model tiers ask a separately running model server.

mod process;
mod random;
mod remote;
mod roster;
mod source;
mod timed;

pub use process::{EndpointConfig, ProcessEndpoint, SharedEndpoint};
pub use random::RandomMoveSource;
pub use remote::{ModelEndpoint, RemoteModelMoveSource};
pub use roster::{BotConfig, BotRoster, MoveSourceFactory};
pub use source::{AbortHandle, MoveRequest, MoveSource};
pub use timed::TimedMoveSource;
