//! CSS enter/leave animations with host-driven completion.

mod animation;
mod builder;
mod scheduler;
mod timer;

pub use animation::Animation;
pub use builder::{parse_duration_list, AnimationBuilder, CssAnimationBuilder, CssAnimationOptions};
pub use scheduler::{AnimationScheduler, SharedScheduler};
pub use timer::{Timer, TimerId, TimerQueue};
