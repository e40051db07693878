//! Fixed template geometry.
//!
//! All positions are in PDF points on an A4 page, origin bottom-left. The
//! layout is a constant of the system: changing any value here changes the
//! emitted bytes for every invoice.

/// A4 page size in points.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;

pub const MARGIN: f32 = 50.0;

/// Right edge shared by the table and the totals block.
pub const CONTENT_RIGHT: f32 = PAGE_WIDTH - MARGIN;

pub const TITLE_FONT_SIZE: f32 = 16.0;
pub const HEADING_FONT_SIZE: f32 = 12.0;
pub const BODY_FONT_SIZE: f32 = 10.0;
pub const ROW_HEIGHT: f32 = 16.0;

/// Top of the merchant/invoice header block.
pub const HEADER_TOP: f32 = PAGE_HEIGHT - 56.0;

/// Left edge of the invoice number/date block in the header.
pub const HEADER_META_X: f32 = 420.0;

/// Top of the "BILLED TO" customer block.
pub const CUSTOMER_BLOCK_TOP: f32 = 700.0;

/// First table row position on the first page (below the header blocks,
/// which have a bounded line count) and on continuation pages.
pub const FIRST_PAGE_TABLE_TOP: f32 = 600.0;
pub const CONT_PAGE_TABLE_TOP: f32 = PAGE_HEIGHT - 72.0;

/// Rows never descend below this line; the page footer lives underneath.
pub const TABLE_BOTTOM: f32 = 90.0;

/// Vertical room the totals/payment footer needs on its page.
pub const TOTALS_BLOCK_HEIGHT: f32 = 150.0;

/// Column positions: item name is left-aligned, the numeric columns are
/// right-aligned against their edge.
pub const NAME_COL_X: f32 = MARGIN;
pub const QTY_COL_RIGHT: f32 = 350.0;
pub const PRICE_COL_RIGHT: f32 = 450.0;
pub const AMOUNT_COL_RIGHT: f32 = CONTENT_RIGHT;

/// Label column of the totals block.
pub const TOTALS_LABEL_X: f32 = 360.0;

/// Baseline of the "Page N of M" footer.
pub const PAGE_NUMBER_Y: f32 = 40.0;

/// Item names longer than this are cut so they cannot run into the quantity
/// column.
pub const NAME_MAX_CHARS: usize = 48;

/// Notes are rendered as a single footer line.
pub const NOTES_MAX_CHARS: usize = 90;

/// Courier glyph advance as a fraction of the font size. Numeric cells use a
/// monospace face so right alignment is exact without shipping font metrics.
pub const MONO_ADVANCE: f32 = 0.6;

/// Width of `text` when set in Courier at `size`.
pub fn mono_text_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * MONO_ADVANCE * size
}

/// X position that right-aligns monospace `text` against `right_edge`.
pub fn right_aligned_x(right_edge: f32, text: &str, size: f32) -> f32 {
    right_edge - mono_text_width(text, size)
}

/// Restrict text to the WinAnsi-safe printable ASCII range.
///
/// The built-in Type1 fonts carry no embedded encoding for arbitrary Unicode;
/// anything outside the range becomes `?` rather than a missing glyph.
pub fn sanitize(text: &str) -> String {
    text.chars()
        .map(|c| if (' '..='~').contains(&c) { c } else { '?' })
        .collect()
}

/// Cut text to `max_chars`, appending `...` when something was dropped.
pub fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{kept}...")
}

/// Number of item rows that fit on a page whose table starts at `top`
/// (excluding the repeated column-header row).
pub fn rows_that_fit(top: f32) -> usize {
    let usable = top - TABLE_BOTTOM - ROW_HEIGHT;
    if usable <= 0.0 {
        0
    } else {
        (usable / ROW_HEIGHT) as usize
    }
}
