//! Bounded delimiter splitting.
//!
//! Splits into a fixed-capacity vector instead of an open-ended iterator
//! so callers can distinguish "too many tokens" from a short message
//! without indexing past the end of anything.

use heapless::Vec;

/// Token capacity for both wire formats: two more than the largest
/// valid message needs, so an overlong message is detectable.
pub const MAX_TOKENS: usize = 6;

/// The input holds more tokens than the output can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Overflow;

/// Split `input` on every `delim`. Empty fields are kept, so `"a||b"`
/// yields three tokens and an empty input yields one empty token.
pub fn split<const N: usize>(input: &str, delim: char) -> Result<Vec<&str, N>, Overflow> {
    let mut tokens = Vec::new();
    for token in input.split(delim) {
        tokens.push(token).map_err(|_| Overflow)?;
    }
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_and_keeps_empty_fields() {
        let tokens = split::<MAX_TOKENS>("a||b", '|').unwrap();
        assert_eq!(tokens.as_slice(), &["a", "", "b"]);
    }

    #[test]
    fn empty_input_is_one_empty_token() {
        let tokens = split::<MAX_TOKENS>("", '|').unwrap();
        assert_eq!(tokens.as_slice(), &[""]);
    }

    #[test]
    fn exact_capacity_fits() {
        let tokens = split::<3>("x;y;z", ';').unwrap();
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn one_past_capacity_overflows() {
        assert_eq!(split::<2>("x;y;z", ';'), Err(Overflow));
        assert_eq!(split::<MAX_TOKENS>("1|2|3|4|5|6|7", '|'), Err(Overflow));
    }
}
