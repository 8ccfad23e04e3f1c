//! Reader for JavaScript object-literal layouts.
//!
//! KLE "raw data" is usually pasted as a JavaScript literal rather than JSON: keys are bare
//! identifiers, strings may be single-quoted and arrays may carry trailing commas. This module
//! rewrites such text into strict JSON, which is then handed to `serde_json`.

use serde_json::Value;

/// Rewrite `input` into JSON and parse it.
pub fn parse_relaxed(input: &str) -> Result<Value, String> {
    let json = to_json(input)?;
    serde_json::from_str(&json).map_err(|e| e.to_string())
}

fn to_json(input: &str) -> Result<String, String> {
    let chars: Vec<char> = input.chars().collect();
    let mut out = String::with_capacity(input.len() + 16);
    let mut pending_comma = false;
    let mut i = 0usize;

    while i < chars.len() {
        let c = chars[i];

        if c.is_whitespace() {
            i += 1;
            continue;
        }
        if c == '/' && chars.get(i + 1) == Some(&'/') {
            while i < chars.len() && chars[i] != '\n' {
                i += 1;
            }
            continue;
        }
        if c == '/' && chars.get(i + 1) == Some(&'*') {
            let start = i;
            i += 2;
            loop {
                if i + 1 >= chars.len() {
                    return Err(format!("unterminated block comment at {start}"));
                }
                if chars[i] == '*' && chars[i + 1] == '/' {
                    i += 2;
                    break;
                }
                i += 1;
            }
            continue;
        }

        if c == ',' {
            if pending_comma {
                return Err(format!("unexpected ',' at {i}"));
            }
            pending_comma = true;
            i += 1;
            continue;
        }

        // Trailing commas before a closing bracket are dropped.
        if pending_comma && c != ']' && c != '}' {
            out.push(',');
        }
        pending_comma = false;

        match c {
            '[' | ']' | '{' | '}' | ':' => {
                out.push(c);
                i += 1;
            }
            '"' | '\'' => {
                let (s, next) = read_string(&chars, i)?;
                out.push_str(&serde_json::to_string(&s).map_err(|e| e.to_string())?);
                i = next;
            }
            c if c.is_ascii_digit() || matches!(c, '-' | '+' | '.') => {
                let (n, next) = read_number(&chars, i)?;
                out.push_str(&n);
                i = next;
            }
            c if is_ident_start(c) => {
                let start = i;
                while i < chars.len() && is_ident_continue(chars[i]) {
                    i += 1;
                }
                let ident: String = chars[start..i].iter().collect();
                match ident.as_str() {
                    "true" | "false" | "null" => out.push_str(&ident),
                    "undefined" => out.push_str("null"),
                    _ => {
                        if next_significant(&chars, i) != Some(':') {
                            return Err(format!("unexpected identifier {ident:?} at {start}"));
                        }
                        out.push_str(&serde_json::to_string(&ident).map_err(|e| e.to_string())?);
                    }
                }
            }
            other => return Err(format!("unexpected character {other:?} at {i}")),
        }
    }

    if pending_comma {
        return Err("unexpected trailing ',' at end of input".to_string());
    }
    Ok(out)
}

fn read_string(chars: &[char], start: usize) -> Result<(String, usize), String> {
    let quote = chars[start];
    let mut s = String::new();
    let mut i = start + 1;
    while i < chars.len() {
        let c = chars[i];
        if c == quote {
            return Ok((s, i + 1));
        }
        if c == '\\' {
            let Some(&esc) = chars.get(i + 1) else {
                break;
            };
            i += 2;
            match esc {
                'n' => s.push('\n'),
                't' => s.push('\t'),
                'r' => s.push('\r'),
                'b' => s.push('\u{8}'),
                'f' => s.push('\u{c}'),
                '0' => s.push('\0'),
                'u' => {
                    let hex: String = chars.get(i..i + 4).unwrap_or_default().iter().collect();
                    let code = u32::from_str_radix(&hex, 16)
                        .map_err(|_| format!("invalid \\u escape at {}", i - 2))?;
                    s.push(char::from_u32(code).unwrap_or(char::REPLACEMENT_CHARACTER));
                    i += 4;
                }
                // Line continuation.
                '\n' => {}
                other => s.push(other),
            }
            continue;
        }
        s.push(c);
        i += 1;
    }
    Err(format!("unterminated string starting at {start}"))
}

fn read_number(chars: &[char], start: usize) -> Result<(String, usize), String> {
    let mut i = start;
    let mut negative = false;
    if matches!(chars.get(i), Some('+') | Some('-')) {
        negative = chars[i] == '-';
        i += 1;
    }

    if chars.get(i) == Some(&'0') && matches!(chars.get(i + 1), Some('x') | Some('X')) {
        let digits_start = i + 2;
        let mut j = digits_start;
        while j < chars.len() && chars[j].is_ascii_hexdigit() {
            j += 1;
        }
        let digits: String = chars[digits_start..j].iter().collect();
        let value = i64::from_str_radix(&digits, 16)
            .map_err(|_| format!("invalid hex literal at {start}"))?;
        let value = if negative { -value } else { value };
        return Ok((value.to_string(), j));
    }

    let body_start = i;
    while i < chars.len()
        && (chars[i].is_ascii_digit()
            || matches!(chars[i], '.' | 'e' | 'E')
            || (matches!(chars[i], '+' | '-') && matches!(chars[i - 1], 'e' | 'E')))
    {
        i += 1;
    }
    let body: String = chars[body_start..i].iter().collect();
    if body.is_empty() {
        return Err(format!("expected a number at {start}"));
    }
    if body.chars().all(|c| c.is_ascii_digit())
        && let Ok(int) = body.parse::<i64>()
    {
        let int = if negative { -int } else { int };
        return Ok((int.to_string(), i));
    }
    let value: f64 = body
        .parse()
        .map_err(|_| format!("invalid number {body:?} at {start}"))?;
    let value = if negative { -value } else { value };
    let number = serde_json::Number::from_f64(value)
        .ok_or_else(|| format!("non-finite number at {start}"))?;
    Ok((number.to_string(), i))
}

fn next_significant(chars: &[char], mut i: usize) -> Option<char> {
    while i < chars.len() && chars[i].is_whitespace() {
        i += 1;
    }
    chars.get(i).copied()
}

fn is_ident_start(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_' || c == '$'
}

fn is_ident_continue(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '$'
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_keys_and_single_quotes() {
        let v = parse_relaxed("[{r:15,rx:1,'ry':2},'Q\\nSW3']").unwrap();
        assert_eq!(v, json!([{"r": 15, "rx": 1, "ry": 2}, "Q\nSW3"]));
    }

    #[test]
    fn trailing_commas_and_comments() {
        let v = parse_relaxed("[\n  // first row\n  [\"A\", \"B\",],\n  /* second */ [\"C\"],\n]")
            .unwrap();
        assert_eq!(v, json!([["A", "B"], ["C"]]));
    }

    #[test]
    fn loose_numbers() {
        let v = parse_relaxed("[{x:.5, y:-.25, w:+2, h:0x2}]").unwrap();
        assert_eq!(v, json!([{"x": 0.5, "y": -0.25, "w": 2, "h": 2}]));
    }

    #[test]
    fn rejects_stray_identifiers() {
        let err = parse_relaxed("[foo]").unwrap_err();
        assert!(err.contains("foo"), "{err}");
    }

    #[test]
    fn rejects_unterminated_strings() {
        assert!(parse_relaxed("[\"abc").is_err());
    }
}
