//! UTF-8 decode helpers over raw byte slices, plus the byte iteration and
//! classification primitives the cursor and action machinery build on.
//!
//! Buffer lines are byte vectors, not `String`s, so positions can sit on any
//! byte. Decoding is therefore done by hand: a malformed sequence yields one
//! replacement character of length 1 and the caller keeps moving.

/// Decode the first rune of `bytes`. `None` on an empty slice.
pub fn decode_rune(bytes: &[u8]) -> Option<(char, usize)> {
    let first = *bytes.first()?;
    let len = match first {
        0x00..=0x7f => 1,
        0xc0..=0xdf => 2,
        0xe0..=0xef => 3,
        0xf0..=0xf7 => 4,
        _ => return Some((char::REPLACEMENT_CHARACTER, 1)),
    };
    if len > bytes.len() {
        return Some((char::REPLACEMENT_CHARACTER, 1));
    }
    match std::str::from_utf8(&bytes[..len]) {
        Ok(s) => s.chars().next().map(|c| (c, len)),
        Err(_) => Some((char::REPLACEMENT_CHARACTER, 1)),
    }
}

/// Decode the rune ending at `bytes.len()`. `None` on an empty slice.
pub fn decode_last_rune(bytes: &[u8]) -> Option<(char, usize)> {
    if bytes.is_empty() {
        return None;
    }
    // Walk back over up to three continuation bytes to a lead byte.
    let mut start = bytes.len() - 1;
    while start > 0 && bytes[start] & 0xc0 == 0x80 && bytes.len() - start < 4 {
        start -= 1;
    }
    match decode_rune(&bytes[start..]) {
        Some((r, len)) if start + len == bytes.len() => Some((r, len)),
        _ => Some((char::REPLACEMENT_CHARACTER, 1)),
    }
}

/// Word runes are letters, digits and `_`; everything else non-space forms
/// its own word class for the purposes of `w`/`b`/`e` motions.
pub fn is_word(r: char) -> bool {
    r == '_' || r.is_alphanumeric()
}

/// Offset of the first byte that is not a space or tab; `data.len()` when
/// the line is blank.
pub fn first_non_space(data: &[u8]) -> usize {
    data.iter()
        .position(|&b| b != b' ' && b != b'\t')
        .unwrap_or(data.len())
}

/// Offset just past the last byte that is not a space or tab; 0 when the
/// line is blank. Lines trim trailing whitespace by truncating to this.
pub fn trimmed_len(data: &[u8]) -> usize {
    match data.iter().rposition(|&b| b != b' ' && b != b'\t') {
        Some(i) => i + 1,
        None => 0,
    }
}

/// Iterate a payload as alternating content runs and single `\n` chunks.
/// `b"\n123\n123\n\n"` yields `\n`, `123`, `\n`, `123`, `\n`, `\n`. Action
/// application walks payloads this way so every newline is its own step.
pub fn chunks(data: &[u8]) -> Chunks<'_> {
    Chunks { data }
}

pub struct Chunks<'a> {
    data: &'a [u8],
}

impl<'a> Iterator for Chunks<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<&'a [u8]> {
        if self.data.is_empty() {
            return None;
        }
        let chunk = match self.data.iter().position(|&b| b == b'\n') {
            Some(0) => &self.data[..1],
            Some(i) => &self.data[..i],
            None => self.data,
        };
        self.data = &self.data[chunk.len()..];
        Some(chunk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_ascii_and_multibyte() {
        assert_eq!(decode_rune(b"abc"), Some(('a', 1)));
        assert_eq!(decode_rune("é!".as_bytes()), Some(('é', 2)));
        assert_eq!(decode_rune("”x".as_bytes()), Some(('”', 3)));
        assert_eq!(decode_rune(b""), None);
    }

    #[test]
    fn decode_invalid_yields_replacement() {
        assert_eq!(decode_rune(&[0xff, b'a']), Some(('\u{fffd}', 1)));
        // truncated two-byte sequence
        assert_eq!(decode_rune(&[0xc3]), Some(('\u{fffd}', 1)));
    }

    #[test]
    fn decode_last() {
        assert_eq!(decode_last_rune(b"abc"), Some(('c', 1)));
        assert_eq!(decode_last_rune("aé".as_bytes()), Some(('é', 2)));
        assert_eq!(decode_last_rune(b""), None);
    }

    #[test]
    fn word_classification() {
        assert!(is_word('a'));
        assert!(is_word('Z'));
        assert!(is_word('0'));
        assert!(is_word('_'));
        assert!(is_word('é'));
        assert!(!is_word('('));
        assert!(!is_word(' '));
    }

    #[test]
    fn chunk_iteration_matches_contract() {
        let got: Vec<&[u8]> = chunks(b"\n123\n123\n\n").collect();
        let want: Vec<&[u8]> = vec![b"\n", b"123", b"\n", b"123", b"\n", b"\n"];
        assert_eq!(got, want);
        assert_eq!(chunks(b"").count(), 0);
        assert_eq!(chunks(b"abc").collect::<Vec<_>>(), vec![&b"abc"[..]]);
    }

    #[test]
    fn whitespace_scans() {
        assert_eq!(first_non_space(b"  \tx y"), 3);
        assert_eq!(first_non_space(b"   "), 3);
        assert_eq!(trimmed_len(b"ab  \t"), 2);
        assert_eq!(trimmed_len(b"  "), 0);
        assert_eq!(trimmed_len(b""), 0);
    }
}
