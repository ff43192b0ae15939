//! Characters OCR engines mix up when reading clock digits.
//!
//! Lookups go both ways: listing `'1' -> '7'` also makes `'1'` an
//! alternate for `'7'`, whether or not the reverse row exists.
//!
//! Two pairs are absent on purpose:
//! - `8 <-> 0`: turns e.g. `14:08` into `14:00`, which lands inside the
//!   window far more often than it should.
//! - `5 <-> 6`: a one-digit swap in the minutes bypasses the ±5 minute window.
//!
//! `S -> 5` is listed only in that direction and only for the letter.
//! `3 -> 1` is not listed either; with it a `1` would have two digit
//! alternates and the repair set could outgrow `2^len`.

const CONFUSIONS: &[(char, &[char])] = &[
    ('1', &['7', 'I', 'l']),
    ('7', &['1']),
    ('3', &['8']),
    ('8', &['3']),
    ('S', &['5']),
    ('0', &['O', 'o']),
    ('O', &['0']),
    ('o', &['0']),
    ('I', &['1']),
    ('l', &['1']),
];

/// Characters `c` may really have been, excluding `c` itself.
///
/// Forward alternates come first, then reverse ones, without duplicates.
pub fn alternates(c: char) -> Vec<char> {
    let forward = CONFUSIONS
        .iter()
        .filter(|(key, _)| *key == c)
        .flat_map(|(_, values)| values.iter().copied());
    let reverse = CONFUSIONS
        .iter()
        .filter(|(_, values)| values.contains(&c))
        .map(|(key, _)| *key);

    let mut out: Vec<char> = Vec::new();
    for alt in forward.chain(reverse) {
        if alt != c && !out.contains(&alt) {
            out.push(alt);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_lookup_applies() {
        assert_eq!(alternates('7'), vec!['1']);
        assert_eq!(alternates('1'), vec!['7', 'I', 'l']);
        assert_eq!(alternates('5'), vec!['S']);
    }

    #[test]
    fn zero_and_eight_never_swap() {
        assert!(!alternates('8').contains(&'0'));
        assert!(!alternates('0').contains(&'8'));
    }

    #[test]
    fn at_most_one_digit_alternate() {
        for c in "0123456789IlOoS".chars() {
            let digits = alternates(c).into_iter().filter(char::is_ascii_digit).count();
            assert!(digits <= 1, "{c} has {digits} digit alternates");
        }
    }

    #[test]
    fn unlisted_characters_have_none() {
        assert!(alternates('4').is_empty());
        assert!(alternates(':').is_empty());
    }
}
