//! Character to Morse pattern lookup table

/// Translation unit stored in the lookup table
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Translation {
    /// Lowercase character, 0 for sentinels
    pub ch: u8,
    /// Pattern of `.`, `-` and `/`
    pub code: &'static str,
}

impl Translation {
    const fn new(ch: u8, code: &'static str) -> Self {
        Self { ch, code }
    }

    const SENTINEL: Translation = Translation::new(0, "");

    pub const fn is_sentinel(&self) -> bool {
        self.ch == 0
    }
}

/// Sorted by character code, bracketed by sentinels. The scan direction in
/// [`lookup`] relies on this order.
static TABLE: [Translation; 40] = [
    Translation::SENTINEL,
    Translation::new(b' ', "/"),
    Translation::new(b'.', "//"),
    Translation::new(b'0', "-----"),
    Translation::new(b'1', ".----"),
    Translation::new(b'2', "..---"),
    Translation::new(b'3', "...--"),
    Translation::new(b'4', "....-"),
    Translation::new(b'5', "....."),
    Translation::new(b'6', "-...."),
    Translation::new(b'7', "--..."),
    Translation::new(b'8', "---.."),
    Translation::new(b'9', "----."),
    Translation::new(b'a', ".-"),
    Translation::new(b'b', "-..."),
    Translation::new(b'c', "-.-."),
    Translation::new(b'd', "-.."),
    Translation::new(b'e', "."),
    Translation::new(b'f', "..-."),
    Translation::new(b'g', "--."),
    Translation::new(b'h', "...."),
    Translation::new(b'i', ".."),
    Translation::new(b'j', ".---"),
    Translation::new(b'k', "-.-"),
    Translation::new(b'l', ".-.."),
    Translation::new(b'm', "--"),
    Translation::new(b'n', "-."),
    Translation::new(b'o', "---"),
    Translation::new(b'p', ".--."),
    Translation::new(b'q', "--.-"),
    Translation::new(b'r', ".-."),
    Translation::new(b's', "..."),
    Translation::new(b't', "-"),
    Translation::new(b'u', "..-"),
    Translation::new(b'v', "...-"),
    Translation::new(b'w', ".--"),
    Translation::new(b'x', "-..-"),
    Translation::new(b'y', "-.--"),
    Translation::new(b'z', "--.."),
    Translation::SENTINEL,
];

/// Approximately the middle of the table ('g')
const APPROX_MIDDLE: usize = 19;

/// Longest pattern in the table
pub const MAX_PATTERN_LEN: usize = 5;

/// Find the pattern of an already case-folded character.
///
/// Scans linearly from the middle entry, downwards for characters below it and
/// upwards otherwise, until a match or a sentinel.
pub fn lookup(ch: u8) -> Option<&'static str> {
    let middle = TABLE[APPROX_MIDDLE].ch;
    let mut i = APPROX_MIDDLE;

    loop {
        let entry = &TABLE[i];
        if entry.is_sentinel() {
            return None;
        }
        if entry.ch == ch {
            return Some(entry.code);
        }
        if ch < middle {
            i -= 1;
        } else {
            i += 1;
        }
    }
}

/// Case-fold then look up
pub fn lookup_folded(ch: u8) -> Option<&'static str> {
    lookup(ch.to_ascii_lowercase())
}

/// Table entries without the sentinels
pub fn entries() -> &'static [Translation] {
    &TABLE[1..TABLE.len() - 1]
}
