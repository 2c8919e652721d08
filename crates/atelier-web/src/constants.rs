// Shared tuning values for the web layer. Keep breakpoints and observer
// margins in sync with the stylesheet.

/// Published metadata documents, relative to the page.
pub const TRACKS_URL: &str = "data/tracks.json";
pub const VIDEOS_URL: &str = "data/videos.json";

/// Inline message when a metadata document cannot be loaded.
pub const TRACKS_LOAD_ERROR: &str = "Could not load track data.";
pub const VIDEOS_LOAD_ERROR: &str = "Could not load video data.";

/// The mobile menu only exists below this viewport width (CSS twin).
pub const MOBILE_NAV_BREAKPOINT_PX: f64 = 720.0;

/// Scroll reveal: how much of a card must be visible, and the early margin.
pub const REVEAL_THRESHOLD: f64 = 0.35;
pub const REVEAL_ROOT_MARGIN: &str = "0px 0px -10%";

/// Video thumbnails start loading this far below the fold.
pub const GALLERY_ROOT_MARGIN: &str = "0px 0px 200px 0px";
