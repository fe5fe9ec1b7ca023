//! Shared Types
//!
//! Types used on both sides of the wire: the engagement fact records and
//! request/response bodies, the change events carried by the notifier
//! channels, and the errors common to client and server.

pub mod engagement;
pub mod error;
pub mod event;

pub use engagement::{
    EngagementRequest, Favorite, FavoriteCheckResponse, Like, LikeCheckResponse,
    LikeCountResponse,
};
pub use error::SharedError;
pub use event::{ChangeKind, EngagementEvent, FactKind};
