pub mod animation {
    pub mod easing;
    pub mod timeline;
    pub mod tween_engine;
}

pub mod trail {
    pub mod activity;
    pub mod controller;
    pub mod pointer;
    pub mod slot_pool;
    pub mod surface;
    pub mod variants;
}

pub mod utils {
    pub mod clock;
    pub mod geometry;
}

pub mod config;
pub mod fade;
pub mod stage;

pub use config::{ConfigError, TrailConfig};
pub use stage::{Stage, StageError, StageOptions, Summary};
pub use trail::controller::{TickReport, TrailController, TrailState};
pub use trail::variants::Variant;
