//! Ligature expansion.
//!
//! PDF fonts often encode "fi", "fl" and friends as single presentation-form
//! code points (U+FB00..U+FB04). Text extraction hands those through
//! verbatim, which breaks search and tokenisation ("ﬁeld" ≠ "field").

/// `(ligature, expansion)` for the Latin presentation forms we fold.
pub const LIGATURES: &[(char, &str)] = &[
    ('\u{FB00}', "ff"),
    ('\u{FB01}', "fi"),
    ('\u{FB02}', "fl"),
    ('\u{FB03}', "ffi"),
    ('\u{FB04}', "ffl"),
];

fn expansion(c: char) -> Option<&'static str> {
    LIGATURES
        .iter()
        .find(|(lig, _)| *lig == c)
        .map(|(_, expanded)| *expanded)
}

/// Replace every ligature code point with its ASCII letter sequence.
///
/// All other characters pass through unchanged, so the function is
/// idempotent.
pub fn fix_ligatures(input: &str) -> String {
    if !input.chars().any(|c| expansion(c).is_some()) {
        return input.to_string();
    }
    let mut out = String::with_capacity(input.len() + 8);
    for c in input.chars() {
        match expansion(c) {
            Some(expanded) => out.push_str(expanded),
            None => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_each_ligature() {
        assert_eq!(fix_ligatures("\u{FB00}"), "ff");
        assert_eq!(fix_ligatures("\u{FB01}"), "fi");
        assert_eq!(fix_ligatures("\u{FB02}"), "fl");
        assert_eq!(fix_ligatures("\u{FB03}"), "ffi");
        assert_eq!(fix_ligatures("\u{FB04}"), "ffl");
    }

    #[test]
    fn test_inside_words() {
        assert_eq!(
            fix_ligatures("The ﬁrst ﬂoor of the oﬃce was aﬀected by ﬂuvial eﬄux"),
            "The first floor of the office was affected by fluvial efflux"
        );
    }

    #[test]
    fn test_plain_text_untouched() {
        let input = "Shoreline change, 1930-2012 (m/yr) — ±0.5";
        assert_eq!(fix_ligatures(input), input);
    }

    #[test]
    fn test_idempotent() {
        let once = fix_ligatures("ﬁeld ﬂow");
        assert_eq!(fix_ligatures(&once), once);
    }
}
