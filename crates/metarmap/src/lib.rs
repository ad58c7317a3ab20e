//! `metarmap` - Airport flight categories on an indicator strip
//!
//! This library parses METAR weather reports, derives each airport's flight
//! category, keeps an ordered registry of display positions, and animates one
//! indicator per position with thunderstorm and high-wind overlays.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod animation;
pub mod category;
pub mod cli;
pub mod config;
pub mod error;
pub mod feed;
pub mod logging;
pub mod observation;
pub mod parser;
pub mod registry;
pub mod render;
pub mod runner;
pub mod state;
pub mod status;

pub use animation::{AnimationEngine, Frame, Palette, Rgb};
pub use category::FlightCategory;
pub use config::Config;
pub use error::{Error, Result};
pub use feed::{FetchResult, FileFeed, ReportFeed};
pub use logging::init_logging;
pub use observation::{CloudLayer, Coverage, Observation, ObservationTime};
pub use parser::{parse_batch, parse_report};
pub use registry::{AirportSlot, MergeReport, Registry};
pub use render::StripRenderer;
pub use runner::Runner;
pub use state::{DisplayState, Hazards};
pub use status::{SlotSummary, Summary};
