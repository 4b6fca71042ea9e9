use std::borrow::Cow;

/// Parse an integer literal. Leading `+` is accepted.
pub fn parse_integer(token: &str) -> Option<i64> {
    if !looks_numeric(token) {
        return None;
    }
    token.parse::<i64>().ok()
}

/// Parse a double literal, accepting Fortran `d`/`D` exponents.
pub fn parse_double(token: &str) -> Option<f64> {
    if !looks_numeric(token) {
        return None;
    }
    let normalized: Cow<'_, str> = if token.bytes().any(|b| b == b'd' || b == b'D') {
        Cow::Owned(token.replace(['d', 'D'], "e"))
    } else {
        Cow::Borrowed(token)
    };
    normalized.parse::<f64>().ok()
}

/// True when the token starts like a number (sign, digit or dot), i.e. it
/// must either parse as one or be rejected as a malformed literal. `nan`,
/// `inf` and `infinity` (any case, optionally signed) also count.
pub fn looks_numeric(token: &str) -> bool {
    if is_non_finite(token) {
        return true;
    }
    let bytes = token.as_bytes();
    let mut i = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        i += 1;
    }
    match bytes.get(i) {
        Some(b) if b.is_ascii_digit() => true,
        Some(b'.') => bytes.get(i + 1).is_some_and(|b| b.is_ascii_digit()),
        _ => false,
    }
}

fn is_non_finite(token: &str) -> bool {
    let body = token.strip_prefix(&['+', '-'][..]).unwrap_or(token);
    ["nan", "inf", "infinity"]
        .iter()
        .any(|word| body.eq_ignore_ascii_case(word))
}

/// True for tokens without a fractional part or exponent.
pub fn is_integer_literal(token: &str) -> bool {
    looks_numeric(token)
        && !is_non_finite(token)
        && !token
            .bytes()
            .any(|b| matches!(b, b'.' | b'e' | b'E' | b'd' | b'D'))
}

pub fn format_integer(value: i64) -> String {
    let mut buffer = itoa::Buffer::new();
    buffer.format(value).to_string()
}

pub fn format_double(value: f64) -> String {
    if !value.is_finite() {
        return format!("{value}");
    }
    if value == 0.0 {
        return "0.0".to_string();
    }
    let mut buffer = ryu::Buffer::new();
    buffer.format_finite(value).to_string()
}
