//! Mate-pair identifier suffixes.

use crate::error::Mate;

/// Rule for stripping the mate marker from a read identifier and putting it
/// back on emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MateSuffix {
    /// `/1` and `/2`.
    #[default]
    Slash,
    /// `_1` and `_2`.
    Underscore,
    /// Drop a fixed number of trailing characters whatever they are; emits
    /// `/1` and `/2`.
    Chars(usize),
    /// Identifiers are matched and emitted as-is.
    Verbatim,
}

impl MateSuffix {
    /// Identifier with the mate marker removed. Ids that do not carry the
    /// marker are returned unchanged.
    pub fn strip<'a>(&self, id: &'a str) -> &'a str {
        match *self {
            MateSuffix::Slash => strip_marker(id, b'/'),
            MateSuffix::Underscore => strip_marker(id, b'_'),
            MateSuffix::Chars(n) => {
                let mut cut = id.len().saturating_sub(n);
                while !id.is_char_boundary(cut) {
                    cut -= 1;
                }
                &id[..cut]
            }
            MateSuffix::Verbatim => id,
        }
    }

    /// Append the marker for `mate` to a stripped identifier.
    pub fn apply(&self, base: &str, mate: Mate) -> String {
        let digit = match mate {
            Mate::First => '1',
            Mate::Second => '2',
        };
        let sep = match self {
            MateSuffix::Slash | MateSuffix::Chars(_) => '/',
            MateSuffix::Underscore => '_',
            MateSuffix::Verbatim => return base.to_string(),
        };
        let mut out = String::with_capacity(base.len() + 2);
        out.push_str(base);
        out.push(sep);
        out.push(digit);
        out
    }
}

fn strip_marker(id: &str, sep: u8) -> &str {
    let b = id.as_bytes();
    if b.len() >= 2 && b[b.len() - 2] == sep && matches!(b[b.len() - 1], b'1' | b'2') {
        &id[..id.len() - 2]
    } else {
        id
    }
}
