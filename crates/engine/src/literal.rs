//! Literal text: escape decoding, numeric canonicalisation and rendering
//!
//! String literals and template segments carry *cooked* text, i.e. the value
//! a JavaScript engine would see after escape processing. Numeric literals
//! are reduced to the string `Number.prototype.toString()` would produce.

use tplfold_core::QuoteStyle;

/// Decode the body of a quoted string literal (without the quotes)
///
/// Returns `None` when an escape is malformed or denotes a lone surrogate,
/// which a Rust string cannot hold.
pub fn cook_string(raw: &str) -> Option<String> {
    cook(raw)
}

/// Decode one literal segment of a template string
///
/// Line terminators are normalised to `\n` before escapes are processed.
pub fn cook_template(raw: &str) -> Option<String> {
    if raw.contains('\r') {
        cook(&raw.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        cook(raw)
    }
}

fn cook(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('\\') {
        out.push_str(&rest[..pos]);
        let mut chars = rest[pos + 1..].chars();
        let escape = chars.next()?;
        rest = chars.as_str();

        match escape {
            'n' => out.push('\n'),
            'r' => out.push('\r'),
            't' => out.push('\t'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'v' => out.push('\u{b}'),
            'x' => {
                out.push(parse_hex(rest.get(..2)).and_then(char::from_u32)?);
                rest = &rest[2..];
            }
            'u' => {
                let (decoded, consumed) = unicode_escape(rest)?;
                out.push(decoded);
                rest = &rest[consumed..];
            }
            '0'..='7' => {
                let (decoded, consumed) = octal_escape(escape, rest);
                out.push(decoded);
                rest = &rest[consumed..];
            }
            // line continuation
            '\r' => rest = rest.strip_prefix('\n').unwrap_or(rest),
            '\n' | '\u{2028}' | '\u{2029}' => {}
            other => out.push(other),
        }
    }

    out.push_str(rest);
    Some(out)
}

fn parse_hex(digits: Option<&str>) -> Option<u32> {
    let digits = digits.filter(|d| !d.is_empty() && d.chars().all(|c| c.is_ascii_hexdigit()))?;
    u32::from_str_radix(digits, 16).ok()
}

/// Decode `XXXX` or `{X...}` following `\u`; returns the char and bytes consumed
///
/// Surrogate pairs written as two `\uXXXX` escapes are combined. A lone
/// surrogate or an out-of-range code point yields `None`.
fn unicode_escape(rest: &str) -> Option<(char, usize)> {
    if let Some(braced) = rest.strip_prefix('{') {
        let close = braced.find('}')?;
        let c = parse_hex(braced.get(..close)).and_then(char::from_u32)?;
        return Some((c, close + 2));
    }

    let unit = parse_hex(rest.get(..4))?;
    if (0xD800..=0xDBFF).contains(&unit) {
        let low = rest
            .get(4..)
            .and_then(|tail| tail.strip_prefix("\\u"))
            .and_then(|tail| parse_hex(tail.get(..4)))
            .filter(|low| (0xDC00..=0xDFFF).contains(low))?;
        let code = 0x10000 + ((unit - 0xD800) << 10) + (low - 0xDC00);
        return char::from_u32(code).map(|c| (c, 10));
    }

    char::from_u32(unit).map(|c| (c, 4))
}

/// Legacy octal escape: up to three digits when the first is 0-3, else two
fn octal_escape(first: char, rest: &str) -> (char, usize) {
    let max_extra = if first <= '3' { 2 } else { 1 };
    let extra = rest
        .chars()
        .take(max_extra)
        .take_while(|c| ('0'..='7').contains(c))
        .count();

    let mut value = first.to_digit(8).unwrap_or(0);
    for digit in rest[..extra].chars() {
        value = value * 8 + digit.to_digit(8).unwrap_or(0);
    }

    (char::from_u32(value).unwrap_or('\0'), extra)
}

/// Canonical decimal text of a numeric literal
///
/// Returns `None` for BigInt literals (`10n`), which are not numeric literals.
pub fn canonical_number(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| *c != '_')
        .collect::<String>()
        .to_ascii_lowercase();

    if cleaned.ends_with('n') {
        return None;
    }

    let value = if let Some(digits) = cleaned.strip_prefix("0x") {
        parse_radix(digits, 16)?
    } else if let Some(digits) = cleaned.strip_prefix("0o") {
        parse_radix(digits, 8)?
    } else if let Some(digits) = cleaned.strip_prefix("0b") {
        parse_radix(digits, 2)?
    } else if is_legacy_octal(&cleaned) {
        parse_radix(&cleaned[1..], 8)?
    } else {
        cleaned.parse::<f64>().ok()?
    };

    Some(number_to_string(value))
}

fn parse_radix(digits: &str, radix: u32) -> Option<f64> {
    if digits.is_empty() {
        return None;
    }
    digits.chars().try_fold(0f64, |acc, c| {
        c.to_digit(radix)
            .map(|digit| acc * f64::from(radix) + f64::from(digit))
    })
}

fn is_legacy_octal(literal: &str) -> bool {
    literal.len() > 1
        && literal.starts_with('0')
        && literal.chars().all(|c| ('0'..='7').contains(&c))
}

/// `Number.prototype.toString()` for a finite or infinite double
pub fn number_to_string(value: f64) -> String {
    if value.is_nan() {
        return "NaN".to_string();
    }
    if value == 0.0 {
        return "0".to_string();
    }
    if value.is_infinite() {
        return if value > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if value < 0.0 {
        return format!("-{}", number_to_string(-value));
    }

    // Shortest round-trip digits, e.g. "1.2345e6"
    let scientific = format!("{value:e}");
    let (mantissa, exponent) = scientific
        .split_once('e')
        .unwrap_or((scientific.as_str(), "0"));
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let k = digits.len() as i32;
    let n = exponent.parse::<i32>().unwrap_or(0) + 1;

    if k <= n && n <= 21 {
        format!("{digits}{}", "0".repeat((n - k) as usize))
    } else if 0 < n && n <= 21 {
        let (int, frac) = digits.split_at(n as usize);
        format!("{int}.{frac}")
    } else if -6 < n && n <= 0 {
        format!("0.{}{digits}", "0".repeat((-n) as usize))
    } else {
        let e = n - 1;
        let sign = if e >= 0 { '+' } else { '-' };
        let (lead, tail) = digits.split_at(1);
        if tail.is_empty() {
            format!("{lead}e{sign}{}", e.abs())
        } else {
            format!("{lead}.{tail}e{sign}{}", e.abs())
        }
    }
}

/// Source text of a new string literal node carrying `text`
pub fn render_string_literal(text: &str, quote: QuoteStyle) -> String {
    let quote = quote.as_char();
    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => out.push_str("\\\\"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\u{8}' => out.push_str("\\b"),
            '\u{b}' => out.push_str("\\v"),
            '\u{c}' => out.push_str("\\f"),
            '\0' => {
                if chars.peek().is_some_and(|next| next.is_ascii_digit()) {
                    out.push_str("\\x00");
                } else {
                    out.push_str("\\0");
                }
            }
            '\u{85}' | '\u{2028}' | '\u{2029}' => out.push_str(&format!("\\u{:04X}", c as u32)),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }

    out.push(quote);
    out
}
