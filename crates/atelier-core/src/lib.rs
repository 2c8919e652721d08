//! Platform-free logic for the portfolio front-end.
//!
//! Everything here compiles on both native and wasm targets so the playback
//! coordinator and the metadata model can be exercised by ordinary host
//! tests; the `atelier-web` crate binds these types to the DOM.

pub mod format;
pub mod page;
pub mod player;
pub mod track;
pub mod video;

pub use format::format_time;
pub use player::*;
pub use track::*;
pub use video::*;
