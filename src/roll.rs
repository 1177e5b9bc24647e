//! Note layout within the piano roll.
//!
//! Computes each note's visual rectangle inside its bar as percentages of
//! the bar cell, plus a highlight style chosen by a fixed precedence order.
//! Geometry is tick-based; only the "currently playing" highlight consults
//! wall-clock transport position.

use crate::score::Note;
use crate::transport::Transport;

/// Row height of a note as a percent of track height.
pub const NOTE_HEIGHT_PERCENT: f64 = 14.0;

/// Vertical position per pitch class, as percent-of-height before row
/// compensation. C sits at the bottom, B at the top.
pub const PITCH_CLASS_ROW_PERCENT: [f64; 12] = [
    0.0, 9.09, 18.18, 27.27, 36.36, 45.45, 54.55, 63.64, 72.73, 81.82, 90.91, 100.0,
];

/// Highlight style of a note, in precedence order (highest first).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoteStyle {
    /// The note is under the playhead right now (red-tinted).
    Active,
    /// The note's bar is inside the selected regeneration range (blue-tinted).
    Regen,
    /// The note's bar is being infilled right now (gray).
    InfillActive,
    /// The note's bar is hovered as an infill target (blue-tinted, same
    /// palette as the regen range).
    InfillHover,
    /// No highlight (white).
    Normal,
}

/// Ephemeral highlight inputs supplied by the caller on every layout pass.
///
/// The engine does not own any of this state; it only folds it into the
/// per-note style decision.
#[derive(Debug, Clone, Copy, Default)]
pub struct Highlights {
    /// Inclusive bar range selected for bulk regeneration.
    pub regen_range: Option<(u32, u32)>,

    /// Whether the regen range should currently be shown.
    pub regen_highlight: bool,

    /// Bar targeted by an in-progress infill operation.
    pub infill_bar: Option<u32>,

    /// Whether an infill operation is running.
    pub infilling: bool,

    /// Bar currently hovered as an infill target.
    pub hover_bar: Option<u32>,
}

/// Computed rectangle and style for one note, all in percent of the bar
/// cell (horizontal) and track lane (vertical).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoteRect {
    /// Left edge within the bar.
    pub left_percent: f64,

    /// Width, clipped at the end of the piece.
    pub width_percent: f64,

    /// Bottom edge within the track lane, from the pitch-class row table.
    pub bottom_percent: f64,

    /// Row height.
    pub height_percent: f64,

    /// Highlight style by precedence.
    pub style: NoteStyle,
}

/// Computes the rectangle and highlight style for a note within its bar.
///
/// # Arguments
///
/// * `note` - The note to lay out
/// * `bar_index` - The bar cell this layout pass is drawing
/// * `transport` - Transport state (timing constants and playhead)
/// * `highlights` - Per-render highlight inputs
pub fn note_rect(
    note: &Note,
    bar_index: u32,
    transport: &Transport,
    highlights: &Highlights,
) -> NoteRect {
    let ticks_per_bar = transport.ticks_per_bar();
    let total_ticks = ticks_per_bar as u64 * transport.total_bars() as u64;

    let offset_ticks = note
        .start_ticks
        .saturating_sub(ticks_per_bar.saturating_mul(bar_index));
    let left_percent = offset_ticks as f64 / ticks_per_bar as f64 * 100.0;

    // Clip the width when the note's sustain would run past the end of
    // the piece, so the last bar never overflows visually.
    let end_ticks = note.start_ticks as u64 + note.duration_ticks as u64;
    let width_percent = if end_ticks > total_ticks {
        total_ticks.saturating_sub(note.start_ticks as u64) as f64 / ticks_per_bar as f64 * 100.0
    } else {
        note.duration_ticks as f64 / ticks_per_bar as f64 * 100.0
    };

    let row = PITCH_CLASS_ROW_PERCENT[(note.pitch % 12) as usize];
    let bottom_percent = row / 100.0 * (100.0 - NOTE_HEIGHT_PERCENT);

    NoteRect {
        left_percent,
        width_percent,
        bottom_percent,
        height_percent: NOTE_HEIGHT_PERCENT,
        style: note_style(note, bar_index, transport, highlights),
    }
}

/// Selects the highlight style for a note by precedence:
/// playing, regen range, infill in progress, infill hover, normal.
fn note_style(
    note: &Note,
    bar_index: u32,
    transport: &Transport,
    highlights: &Highlights,
) -> NoteStyle {
    // 1. Currently playing: the playhead is inside the note's time window
    //    and this bar cell is the one under the playhead.
    if note.is_sounding_at(transport.current_sec()) && bar_index == transport.current_bar() {
        return NoteStyle::Active;
    }

    // 2. Regeneration range.
    if highlights.regen_highlight {
        if let Some((start, end)) = highlights.regen_range {
            if bar_index >= start && bar_index <= end {
                return NoteStyle::Regen;
            }
        }
    }

    // 3. Infill in progress.
    if highlights.infilling && highlights.infill_bar == Some(bar_index) {
        return NoteStyle::InfillActive;
    }

    // 4. Infill hover.
    if highlights.hover_bar == Some(bar_index) {
        return NoteStyle::InfillHover;
    }

    NoteStyle::Normal
}
