//! Character masking

/// Mask up to `chars_to_mask` characters of `value`
///
/// Counts characters, not bytes. The count is capped at the value length.
pub fn mask(value: &str, masking_char: char, chars_to_mask: usize, from_end: bool) -> String {
    let total = value.chars().count();
    let count = chars_to_mask.min(total);
    let (first_masked, last_masked) = if from_end {
        (total - count, total)
    } else {
        (0, count)
    };

    value
        .chars()
        .enumerate()
        .map(|(i, c)| {
            if i >= first_masked && i < last_masked {
                masking_char
            } else {
                c
            }
        })
        .collect()
}
