pub mod colors;
pub mod entity;
pub mod feed;
pub mod poll;
pub mod projection;
pub mod render;
pub mod scheduler;
pub mod sprite;
pub mod store;

pub use colors::Rgb;
pub use entity::*;
pub use feed::{FeedError, parse_claim_feed, parse_player_feed, parse_position};
pub use poll::{FeedSource, Poller};
pub use projection::{CanvasPos, Projector, WorldOffset};
pub use render::{Frame, RenderStyle, hit_player, render_frame};
pub use scheduler::{Clock, Scheduler, TaskId};
pub use sprite::{DrawOp, Fill, Sprite, TextMeasure};
pub use store::{EntityStore, FeedSnapshot, PollOutcome, Pulse};
