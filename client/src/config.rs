/// Same-origin relay endpoints served by `rosella-server`.
pub const PLAYERS_FEED_URL: &str = "/api/players";
/// `None` skips claims fetching entirely.
pub const CLAIMS_FEED_URL: Option<&str> = Some("/api/claims");

pub const POLL_INTERVAL_MS: f64 = 1000.0;

pub const CANVAS_WIDTH: u32 = 800;
pub const CANVAS_HEIGHT: u32 = 800;

pub const MAP_ASSET_SRC: &str = "/assets/map.png";

pub const SETTINGS_KEY: &str = "rosella_settings";
