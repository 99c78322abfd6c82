/*
 * Numeric Argument Parsing
 *
 * Accepts the same spellings as C's strtoul with base 0:
 * - `0x` / `0X` prefix: hexadecimal
 * - leading `0`: octal
 * - otherwise decimal
 * An optional leading `+` is allowed. Unlike strtoul, trailing garbage and
 * empty input are errors rather than silently read as 0.
 */

/// Parse `text` as an unsigned number with C base-0 prefix rules
pub fn parse_number(text: &str) -> Option<u64> {
    let digits = text.strip_prefix('+').unwrap_or(text);

    let (radix, body) = if let Some(hex) = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
    {
        (16, hex)
    } else if digits.len() > 1 && digits.starts_with('0') {
        (8, &digits[1..])
    } else {
        (10, digits)
    };

    if body.is_empty() || !body.chars().all(|c| c.is_digit(radix)) {
        return None;
    }

    u64::from_str_radix(body, radix).ok()
}
