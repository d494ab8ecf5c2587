mod feed;
mod source;

pub use feed::{Entity, FeedEvent, PositionFeed};
pub use source::{FetchError, HttpPositionSource, PositionSource};
