pub mod markdown;
pub mod posts;
pub mod slug;
pub mod tags;
