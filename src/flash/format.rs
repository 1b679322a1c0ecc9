//! `printf`-style message formatting.
//!
//! Flash messages are formatted once, when they are queued, and stored as the
//! finished string. The specifier set and fallbacks follow Node's
//! `util.format`:
//!
//! | Specifier | Renders |
//! |---|---|
//! | `%s` | strings verbatim, anything else as JSON text |
//! | `%d` | the numeric value (`Number(arg)`), `NaN` when not numeric |
//! | `%i` | the integer part (`parseInt`), `NaN` when not numeric |
//! | `%f` | the float value (`parseFloat`), `NaN` when not numeric |
//! | `%j` `%o` `%O` | JSON text |
//! | `%c` | nothing (the argument is consumed) |
//! | `%%` | a literal `%`, consumes nothing |
//!
//! With no arguments at all the template is returned untouched, `%%`
//! included. Otherwise a specifier without a matching argument stays literal,
//! as does an unknown one (`%x`) and a trailing `%`. Leftover arguments are
//! appended, each after a single space.
//!
//! Numbers print as JavaScript prints them: integers below `1e21` in full,
//! exponent notation (`1e+21`, `1.5e-7`) outside `[1e-6, 1e21)`.

use serde_json::Value;

/// Renders `template` with positional `args`.
///
/// ```rust
/// use flash_session::format_message;
/// use serde_json::json;
///
/// assert_eq!(format_message("sent to %s", &[json!("alice")]), "sent to alice");
/// assert_eq!(format_message("%s has %d new", &[json!("bob")]), "bob has %d new");
/// assert_eq!(format_message("done", &[json!(3), json!("x")]), "done 3 x");
/// ```
pub fn format_message(template: &str, args: &[Value]) -> String {
    if args.is_empty() {
        return template.to_owned();
    }

    let mut out = String::with_capacity(template.len());
    let mut args = args.iter();
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '%' {
            out.push(c);
            continue;
        }
        match chars.peek().copied() {
            Some('%') => {
                chars.next();
                out.push('%');
            }
            Some(spec @ ('s' | 'd' | 'i' | 'f' | 'j' | 'o' | 'O' | 'c')) => match args.next() {
                Some(arg) => {
                    chars.next();
                    out.push_str(&render(spec, arg));
                }
                // Out of arguments: the specifier is copied through unchanged.
                None => out.push('%'),
            },
            _ => out.push('%'),
        }
    }

    for arg in args {
        out.push(' ');
        out.push_str(&as_text(arg));
    }
    out
}

fn render(spec: char, arg: &Value) -> String {
    match spec {
        's' => as_text(arg),
        'd' => match arg {
            Value::Number(n) if n.is_i64() || n.is_u64() => n.to_string(),
            _ => js_number(to_number(arg)),
        },
        'i' => js_number(parse_int(arg)),
        'f' => js_number(parse_float(arg)),
        'c' => String::new(),
        _ => arg.to_string(),
    }
}

fn as_text(arg: &Value) -> String {
    match arg {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ── Numeric coercions ─────────────────────────────────────────────────────────

/// `Number(arg)`.
fn to_number(arg: &Value) -> f64 {
    match arg {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::Bool(b) => f64::from(u8::from(*b)),
        Value::Null => 0.0,
        Value::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                0.0
            } else {
                strict_float(s).unwrap_or(f64::NAN)
            }
        }
        Value::Array(_) | Value::Object(_) => f64::NAN,
    }
}

/// `parseInt(arg)`: leading sign and digits only.
fn parse_int(arg: &Value) -> f64 {
    match arg {
        Value::Number(n) => n.as_f64().map_or(f64::NAN, f64::trunc),
        Value::String(s) => {
            let s = s.trim_start();
            let digits = numeric_prefix(s, false);
            digits.parse::<f64>().map_or(f64::NAN, f64::trunc)
        }
        _ => f64::NAN,
    }
}

/// `parseFloat(arg)`: the longest leading decimal literal.
fn parse_float(arg: &Value) -> f64 {
    match arg {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => {
            let s = s.trim_start();
            let unsigned = s.trim_start_matches(['+', '-']);
            if unsigned.starts_with("Infinity") {
                return if s.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY };
            }
            numeric_prefix(s, true).parse::<f64>().unwrap_or(f64::NAN)
        }
        _ => f64::NAN,
    }
}

/// Whole-string decimal parse that refuses Rust-only spellings like `inf`.
fn strict_float(s: &str) -> Option<f64> {
    let unsigned = s.trim_start_matches(['+', '-']);
    if unsigned == "Infinity" {
        return Some(if s.starts_with('-') { f64::NEG_INFINITY } else { f64::INFINITY });
    }
    if numeric_prefix(s, true).len() != s.len() {
        return None;
    }
    s.parse().ok()
}

/// Longest prefix of `s` shaped like `[+-]digits[.digits][e[+-]digits]`.
///
/// With `fractional == false` only the sign and integer digits are taken.
fn numeric_prefix(s: &str, fractional: bool) -> &str {
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_start = end;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
    }
    let mut has_digits = end > int_start;

    if fractional {
        if end < bytes.len() && bytes[end] == b'.' {
            let frac_start = end + 1;
            let mut frac_end = frac_start;
            while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
                frac_end += 1;
            }
            if has_digits || frac_end > frac_start {
                end = frac_end;
                has_digits = true;
            }
        }
        if has_digits && end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
            let mut exp_end = end + 1;
            if matches!(bytes.get(exp_end), Some(b'+' | b'-')) {
                exp_end += 1;
            }
            let exp_digits = exp_end;
            while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
                exp_end += 1;
            }
            if exp_end > exp_digits {
                end = exp_end;
            }
        }
    }

    if has_digits { &s[..end] } else { "" }
}

/// Prints a number the way JavaScript does for the common cases.
fn js_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_owned()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity".to_owned() } else { "-Infinity".to_owned() }
    } else if n != 0.0 && (n.abs() >= 1e21 || n.abs() < 1e-6) {
        let sci = format!("{n:e}");
        match sci.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{mantissa}e+{exp}"),
            _ => sci,
        }
    } else if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        n.to_string()
    }
}
