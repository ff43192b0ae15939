//! Timestamp repair: every plausible true reading of a noisy clock token.
//!
//! Each position keeps its character or takes one of its confusable
//! alternates. Readings are kept when they have the `H:MM` / `HH:MM` shape,
//! either as read or after mapping `.` and space separators to `:`.

use super::confusion;

/// Longest token worth repairing (`HH:MM` plus one stray character).
pub const MAX_TOKEN_LEN: usize = 6;

const SEPARATORS: [char; 2] = ['.', ' '];

/// All clock-shaped readings of `token`, in generation order, deduplicated.
///
/// The as-read characters are tried before alternates, so an already clean
/// token comes back first. A token of length `n` yields at most `2^n`
/// readings. Longer-than-clock tokens yield none.
pub fn repair(token: &str) -> Vec<String> {
    let chars: Vec<char> = token.chars().collect();
    if chars.is_empty() || chars.len() > MAX_TOKEN_LEN {
        log::debug!("[REPAIR] Skipping token {:?} ({} chars)", token, chars.len());
        return Vec::new();
    }

    let mut buf = ['\0'; MAX_TOKEN_LEN];
    let mut readings = Vec::new();
    expand(&chars, 0, &mut buf, &mut readings);
    readings
}

fn expand(token: &[char], index: usize, buf: &mut [char; MAX_TOKEN_LEN], out: &mut Vec<String>) {
    if index == token.len() {
        collect(&buf[..index], out);
        return;
    }

    let original = token[index];
    for option in std::iter::once(original).chain(confusion::alternates(original)) {
        // A letter can never survive the shape filter.
        if !is_clock_char(option) {
            continue;
        }
        buf[index] = option;
        expand(token, index + 1, buf, out);
    }
}

fn collect(reading: &[char], out: &mut Vec<String>) {
    let as_read: String = reading.iter().collect();
    if is_clock_shape(&as_read) {
        push_unique(out, as_read);
    }

    if reading.iter().any(|c| SEPARATORS.contains(c)) {
        let normalized: String = reading
            .iter()
            .map(|&c| if SEPARATORS.contains(&c) { ':' } else { c })
            .collect();
        if is_clock_shape(&normalized) {
            push_unique(out, normalized);
        }
    }
}

fn push_unique(out: &mut Vec<String>, reading: String) {
    if !out.contains(&reading) {
        out.push(reading);
    }
}

fn is_clock_char(c: char) -> bool {
    c.is_ascii_digit() || c == ':' || SEPARATORS.contains(&c)
}

/// `H:MM` or `HH:MM`, ASCII digits only. Ranges are not checked here.
pub fn is_clock_shape(s: &str) -> bool {
    let Some((hours, minutes)) = s.split_once(':') else {
        return false;
    };
    (1..=2).contains(&hours.len())
        && minutes.len() == 2
        && hours.bytes().all(|b| b.is_ascii_digit())
        && minutes.bytes().all(|b| b.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_token_comes_first() {
        let readings = repair("14:37");
        assert_eq!(readings[0], "14:37");
        assert!(readings.contains(&"74:37".to_string()));
        assert!(readings.contains(&"14:87".to_string()));
        assert!(readings.contains(&"14:31".to_string()));
    }

    #[test]
    fn letter_for_digit_is_repaired() {
        let readings = repair("l4:37");
        assert_eq!(readings[0], "14:37");
        assert!(readings.iter().all(|r| !r.contains('l')));
    }

    #[test]
    fn letters_o_and_s() {
        assert!(repair("1O:S0").contains(&"10:50".to_string()));
        assert!(repair("9:o5").contains(&"9:05".to_string()));
    }

    #[test]
    fn dot_and_space_separators_normalize() {
        assert_eq!(repair("9.45"), vec!["9:45".to_string()]);
        assert_eq!(repair("9 45"), vec!["9:45".to_string()]);
        assert_eq!(repair("9.41"), vec!["9:41".to_string(), "9:47".to_string()]);
    }

    #[test]
    fn eight_is_never_read_as_zero() {
        assert!(!repair("14:08").contains(&"14:00".to_string()));
        assert!(!repair("14:00").contains(&"14:08".to_string()));
    }

    #[test]
    fn bounded_and_sound() {
        for token in ["11:11", "l4:37", "I7.3O", "10:10", "S:SS", "1", "88:88", "13 17"] {
            let readings = repair(token);
            let bound = 1usize << token.chars().count();
            assert!(readings.len() <= bound, "{token}: {} > {bound}", readings.len());
            assert!(readings.iter().all(|r| is_clock_shape(r)), "{token}: {readings:?}");
        }
    }

    #[test]
    fn over_long_and_empty_tokens_yield_nothing() {
        assert!(repair("114:370").is_empty());
        assert!(repair("").is_empty());
    }

    #[test]
    fn shape_check() {
        assert!(is_clock_shape("9:05"));
        assert!(is_clock_shape("23:59"));
        assert!(!is_clock_shape("123:45"));
        assert!(!is_clock_shape("12:5"));
        assert!(!is_clock_shape("12.50"));
        assert!(!is_clock_shape("１2:50"));
    }
}
