//! Timing constants for PAL-family 625-line composite video
//!
//! Values follow the standard PAL line structure; see
//! <http://martin.hinner.info/vga/pal.html> for the signal layout.

/// Duration of one scan line (ns)
pub const PAL_LINE_DURATION_NS: u32 = 64_000;

/// Duration of a half-line sync period (ns)
pub const PAL_SYNC_DURATION_NS: u32 = PAL_LINE_DURATION_NS / 2;

/// Low portion of a horizontal sync pulse (ns)
pub const PAL_HORIZONTAL_SYNC_LOW_NS: u32 = 4_700;

/// Low portion of an equaliser pulse (ns)
pub const PAL_EQUALISER_LOW_NS: u32 = 2_350;

/// Low portion of a vertical sync pulse (ns); the serration leaves a
/// horizontal-sync-sized high interval in each half line.
pub const PAL_VERTICAL_SYNC_LOW_NS: u32 = PAL_SYNC_DURATION_NS - PAL_HORIZONTAL_SYNC_LOW_NS;

/// Idle interval between active region and the next sync pulse (ns)
pub const PAL_FRONT_PORCH_NS: u32 = 1_650;

/// Idle interval between sync pulse and the active region (ns)
pub const PAL_BACK_PORCH_NS: u32 = 5_700;

/// Symmetric comparison tolerance for all pulse measurements (ns)
pub const PAL_TOLERANCE_NS: u32 = 250;

/// Active-region duration of one line (ns, derived)
pub const PAL_LINE_DATA_NS: u32 =
    PAL_LINE_DURATION_NS - (PAL_BACK_PORCH_NS + PAL_FRONT_PORCH_NS);

/// Standard raster dimensions
pub const PAL_FRAME_WIDTH: u32 = 720;
pub const PAL_FRAME_HEIGHT: u32 = 625;

/// One sample per active-region pixel at the default 720-pixel width (ps)
pub const PAL_DEFAULT_SAMPLE_PERIOD_PS: u32 = PAL_LINE_DATA_NS * 1_000 / PAL_FRAME_WIDTH;

/// Default backlog limit: 100 ms of samples, comfortably above the required
/// two frame durations (80 ms).
pub const PAL_DEFAULT_MAX_BACKLOG_SAMPLES: usize =
    (100_000_000_000u64 / PAL_DEFAULT_SAMPLE_PERIOD_PS as u64) as usize;

/// Longest multi-pulse sync pattern the decoder recognises
pub const SYNC_PATTERN_LENGTH: usize = 15;
