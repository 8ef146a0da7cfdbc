//! Reads the declared screen size out of EDL text.

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{EdlError, Result};

static SCREEN_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)beginScreenProperties(.*?)endScreenProperties")
        .expect("screen block pattern")
});

static WIDTH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*w\s+(\d+)\s*$").expect("width pattern"));

static HEIGHT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\s*h\s+(\d+)\s*$").expect("height pattern"));

/// `(w, h)` of the first screen properties block in `text`.
///
/// Only lines inside `beginScreenProperties` .. `endScreenProperties` are
/// considered, so object geometry later in the file never matches.
pub fn find_screen_size(text: &str) -> Result<(i32, i32)> {
    let block = SCREEN_BLOCK
        .captures(text)
        .and_then(|caps| caps.get(1))
        .ok_or(EdlError::ScreenSizeNotFound)?
        .as_str();
    let w = capture_int(&WIDTH, block)?;
    let h = capture_int(&HEIGHT, block)?;
    Ok((w, h))
}

fn capture_int(re: &Regex, block: &str) -> Result<i32> {
    re.captures(block)
        .and_then(|caps| caps.get(1))
        .and_then(|value| value.as_str().parse().ok())
        .ok_or(EdlError::ScreenSizeNotFound)
}
