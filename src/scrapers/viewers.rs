/// Convert a viewer count such as `"299K viewers"`, `"20.7000"` or `"1,234"` to an integer.
///
/// Counts with a `K` suffix are thousands. A bare decimal like `"20.7000"` is
/// also read as thousands, because the directory emits some counts that way.
/// Anything else that is not a plain integer yields 0.
pub fn parse_viewers(text: &str) -> u64 {
    let cleaned = strip_unit(text.trim()).replace(',', "");
    let cleaned = cleaned.trim();

    if let Some(number) = cleaned.strip_suffix(&['K', 'k'][..]) {
        return scale_thousands(number.trim()).unwrap_or(0);
    }

    if cleaned.contains('.') {
        return scale_thousands(cleaned).unwrap_or(0);
    }

    if !cleaned.is_empty() && cleaned.bytes().all(|b| b.is_ascii_digit()) {
        return cleaned.parse().unwrap_or(0);
    }

    0
}

fn strip_unit(text: &str) -> &str {
    text.strip_suffix("viewers")
        .or_else(|| text.strip_suffix("viewer"))
        .unwrap_or(text)
}

/// `"20.7"` -> 20700, `"1.2345"` -> 1234. Digits past the third decimal are truncated.
fn scale_thousands(number: &str) -> Option<u64> {
    let (int_part, frac_part) = number.split_once('.').unwrap_or((number, ""));

    let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int_part.is_empty() && frac_part.is_empty()) || !all_digits(int_part) || !all_digits(frac_part) {
        return None;
    }

    let whole: u64 = if int_part.is_empty() { 0 } else { int_part.parse().ok()? };
    let millis = frac_part
        .bytes()
        .chain(std::iter::repeat(b'0'))
        .take(3)
        .fold(0u64, |acc, b| acc * 10 + u64::from(b - b'0'));

    whole.checked_mul(1000)?.checked_add(millis)
}
