// Live event feed: id-keyed list plus the synchronizer that keeps it current

mod list;
mod synchronizer;

pub use list::EventList;
pub use synchronizer::{FeedHandle, FeedState, FeedSynchronizer};
