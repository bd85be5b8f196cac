//! Caller-number display formatting and SMS capability checks.
//!
//! The sentinel check always runs before any cleaning, so `"Anonymous"` and
//! the empty string never reach the country-specific rules.

/// Value sent by telephony providers when the caller hides their number.
pub const ANONYMOUS: &str = "Anonymous";

const NANP_PREFIX: &str = "+1";
const GERMAN_PREFIX: &str = "+49";

fn is_anonymous(phone: &str) -> bool {
    phone.is_empty() || phone == ANONYMOUS
}

/// Keeps ASCII digits and `+` characters only.
///
/// Other Unicode digits are dropped so the result stays ASCII and safe to slice by byte.
fn clean(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '+')
        .collect()
}

/// Formats a raw phone number for display.
///
/// - `""` / `"Anonymous"` → `"Anonymous"`
/// - `+1` followed by 10 digits → `+1 - DDD - DDD - DDDD`
/// - `+49...` → `+49 - ` followed by the rest in groups of three
/// - anything else is returned unchanged
pub fn format_phone_number(phone: &str) -> String {
    if is_anonymous(phone) {
        return ANONYMOUS.to_string();
    }

    let cleaned = clean(phone);
    if cleaned.is_empty() {
        return phone.to_string();
    }

    if cleaned.starts_with(NANP_PREFIX) && cleaned.len() == 12 {
        return format!(
            "+1 - {} - {} - {}",
            &cleaned[2..5],
            &cleaned[5..8],
            &cleaned[8..]
        );
    }

    if let Some(remaining) = cleaned.strip_prefix(GERMAN_PREFIX) {
        // `cleaned` is ASCII, so byte chunks are character chunks.
        let groups: Vec<&str> = remaining
            .as_bytes()
            .chunks(3)
            .filter_map(|chunk| std::str::from_utf8(chunk).ok())
            .collect();
        return format!("{} - {}", GERMAN_PREFIX, groups.join(" - "));
    }

    phone.to_string()
}

/// Whether a number is expected to accept SMS.
///
/// German numbers qualify only with a mobile prefix (15x, 16x, 17x); every
/// other country is assumed capable.
pub fn can_receive_sms(phone: &str) -> bool {
    if is_anonymous(phone) {
        return false;
    }

    if let Some(after_country) = phone.strip_prefix(GERMAN_PREFIX) {
        let mut digits = after_country.chars();
        return matches!(
            (digits.next(), digits.next()),
            (Some('1'), Some('5' | '6' | '7'))
        );
    }

    true
}

/// Human-readable SMS capability line handed to the voice agent.
pub fn sms_capability_details(phone: &str) -> &'static str {
    if can_receive_sms(phone) {
        "User phone number CAN receive SMS"
    } else {
        "User phone number CANNOT receive SMS"
    }
}

/// Last two characters of a formatted number, or `""` when it is shorter.
pub fn last_two_digits(formatted: &str) -> String {
    let count = formatted.chars().count();
    if count < 2 {
        return String::new();
    }
    formatted.chars().skip(count - 2).collect()
}
