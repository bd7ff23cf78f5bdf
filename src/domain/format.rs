//! Input normalisation for the checkout form fields.
//!
//! Every function here is total and idempotent: feeding a formatter its own
//! output returns that output unchanged.

/// Country calling code prefixed to Kenyan mobile numbers.
pub const COUNTRY_PREFIX: &str = "254";

const DISPLAY_PHONE_DIGITS: usize = 10;
const CARD_GROUP: usize = 4;
const EXPIRY_DIGITS: usize = 4;

fn digits(input: &str) -> String {
    input.chars().filter(char::is_ascii_digit).collect()
}

/// Formats a phone number for display while the user types: digits only,
/// capped at the ten digits of a local `07XXXXXXXX` number.
pub fn format_phone_display(input: &str) -> String {
    let mut cleaned = digits(input);
    cleaned.truncate(DISPLAY_PHONE_DIGITS);
    cleaned
}

/// Converts a phone number into the international form the gateway expects
/// (`2547XXXXXXXX`, no leading `+`).
pub fn format_phone_international(input: &str) -> String {
    let cleaned = digits(input);
    let cleaned = match cleaned.strip_prefix('0') {
        Some(rest) => format!("{COUNTRY_PREFIX}{rest}"),
        None => cleaned,
    };
    if cleaned.starts_with(COUNTRY_PREFIX) {
        cleaned
    } else {
        format!("{COUNTRY_PREFIX}{cleaned}")
    }
}

/// Groups card digits into space separated blocks of four.
pub fn format_card_number(input: &str) -> String {
    let cleaned = digits(input);
    let mut grouped = String::with_capacity(cleaned.len() + cleaned.len() / CARD_GROUP);
    for (i, digit) in cleaned.chars().enumerate() {
        if i > 0 && i % CARD_GROUP == 0 {
            grouped.push(' ');
        }
        grouped.push(digit);
    }
    grouped
}

/// Formats an expiry as `MM/YY`.
///
/// One or two digits are returned as typed; the slash only appears once the
/// year has started. Digits beyond `MMYY` are dropped.
pub fn format_expiry(input: &str) -> String {
    let cleaned = digits(input);
    if cleaned.len() <= 2 {
        return cleaned;
    }
    let end = cleaned.len().min(EXPIRY_DIGITS);
    format!("{}/{}", &cleaned[..2], &cleaned[2..end])
}
