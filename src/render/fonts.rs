use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use plotters::style::FontStyle;
use tracing::{info, warn};

/// Family name the chart code asks plotters for.
pub const CHART_FONT_FAMILY: &str = "sans-serif";

/// Where common distributions install a plain sans TrueType font.
const SYSTEM_FONT_CANDIDATES: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/truetype/freefont/FreeSans.ttf",
    "/Library/Fonts/Arial.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static FONT_READY: OnceLock<bool> = OnceLock::new();

/// Register a chart font once per process. Returns whether text can be drawn.
///
/// `preferred` is only consulted on the first call.
pub fn ensure_chart_font(preferred: Option<&Path>) -> bool {
    *FONT_READY.get_or_init(|| {
        let candidates = preferred
            .map(Path::to_path_buf)
            .into_iter()
            .chain(SYSTEM_FONT_CANDIDATES.iter().map(PathBuf::from));

        for path in candidates {
            let Ok(bytes) = std::fs::read(&path) else {
                continue;
            };
            // plotters keeps registered fonts for the life of the process.
            let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
            if plotters::style::register_font(CHART_FONT_FAMILY, FontStyle::Normal, bytes).is_ok() {
                info!("Registered chart font {:?}", path);
                return true;
            }
            warn!("Ignoring unreadable font file {:?}", path);
        }

        warn!("No TrueType font found; charts will be drawn without text");
        false
    })
}
