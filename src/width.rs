//! Text measurement for label sizing.
//!
//! Widths are counted in terminal columns after stripping ANSI escapes, so
//! labels pasted from coloured tool output measure the same as plain text.

/// Display width of `text` with ANSI escape sequences removed.
pub fn display_width(text: &str) -> usize {
    let clean = strip_ansi_escapes::strip(text);
    let clean_str = String::from_utf8_lossy(&clean);
    unicode_width::UnicodeWidthStr::width(&*clean_str)
}

/// Widest line of a possibly multi-line label, and its line count.
pub fn text_extent(text: &str) -> (usize, usize) {
    let mut widest = 0;
    let mut lines = 0;
    for line in text.lines() {
        widest = widest.max(display_width(line));
        lines += 1;
    }
    (widest, lines.max(1))
}
