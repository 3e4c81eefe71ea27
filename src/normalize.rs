//! Canonical cache keys for emoji glyphs.
//!
//! A key is the glyph's code points as lowercase hex joined by `-`, with the
//! text/emoji variation selectors stripped so that `"❤️"` and `"❤"` share one
//! key. This matches the file naming used by Twemoji-style SVG asset sets.

/// Variation selectors that change presentation but not identity.
const VARIATION_SELECTORS: [char; 2] = ['\u{FE0E}', '\u{FE0F}'];

/// Compute the canonical asset key for a glyph.
///
/// Never fails; an empty glyph yields an empty key, which callers must treat
/// as unresolvable and skip asset lookup for.
pub fn canonical_key(glyph: &str) -> String {
    glyph
        .chars()
        .filter(|c| !VARIATION_SELECTORS.contains(c))
        .map(|c| format!("{:x}", c as u32))
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_emoji_variation_selector() {
        // U+2764 U+FE0F and bare U+2764 must share a key.
        assert_eq!(canonical_key("\u{2764}\u{FE0F}"), "2764");
        assert_eq!(canonical_key("\u{2764}"), "2764");
    }

    #[test]
    fn strips_text_variation_selector() {
        assert_eq!(canonical_key("\u{2600}\u{FE0E}"), "2600");
    }

    #[test]
    fn preserves_flag_pair_order() {
        // Regional indicators U+1F1FA U+1F1F8 (US flag).
        assert_eq!(canonical_key("\u{1F1FA}\u{1F1F8}"), "1f1fa-1f1f8");
    }

    #[test]
    fn preserves_zwj_sequences_in_full() {
        // Family: man, ZWJ, woman, ZWJ, boy.
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F466}";
        assert_eq!(canonical_key(family), "1f468-200d-1f469-200d-1f466");
    }

    #[test]
    fn empty_input_yields_empty_key() {
        assert_eq!(canonical_key(""), "");
        assert_eq!(canonical_key("\u{FE0F}"), "");
    }

    #[test]
    fn plain_ascii_still_gets_a_key() {
        assert_eq!(canonical_key("a"), "61");
    }
}
