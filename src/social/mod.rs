pub mod feed;
pub mod thread;
pub mod view;

pub use feed::{feed_list, FeedList, FeedSource};
pub use thread::PostThread;
pub use view::{
    comment_count, organize_comments, reaction_change, reaction_histogram, user_reaction,
    CommentThread, ReactionChange, ReactionCount,
};
