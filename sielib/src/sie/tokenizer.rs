//! Splitting one line into tokens.
//!
//! Tokens are returned raw: quotes, escapes and braces are kept so the reader
//! can tell `""` from a missing field and parse `{...}` object lists itself.

/// Split `line` on spaces and tabs outside quotes and brace lists.
///
/// ```
/// use sielib::sie::tokenizer::tokenize;
/// let tokens = tokenize(r#"#OIB 0 2421 {1 "1"} -12513.00"#);
/// assert_eq!(tokens, ["#OIB", "0", "2421", r#"{1 "1"}"#, "-12513.00"]);
/// ```
pub fn tokenize(line: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut in_braces = false;
    let mut escaped = false;

    for c in line.chars() {
        if escaped {
            escaped = false;
            current.push(c);
            continue;
        }
        match c {
            '\\' => {
                escaped = true;
                current.push(c);
            }
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '{' if !in_quotes => {
                in_braces = true;
                current.push(c);
            }
            '}' if !in_quotes => {
                in_braces = false;
                current.push(c);
            }
            ' ' | '\t' if !in_quotes && !in_braces => {
                if !current.is_empty() {
                    tokens.push(std::mem::take(&mut current));
                }
            }
            _ => current.push(c),
        }
    }
    if !current.is_empty() {
        tokens.push(current);
    }
    tokens
}

/// Strip one layer of surrounding quotes and resolve `\"` and `\\`.
pub fn unquote(token: &str) -> String {
    let inner = match token.strip_prefix('"') {
        Some(rest) => rest.strip_suffix('"').unwrap_or(rest),
        None => token,
    };
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(&next) = chars.peek() {
                if next == '"' || next == '\\' {
                    out.push(next);
                    chars.next();
                    continue;
                }
            }
        }
        out.push(c);
    }
    out
}

/// Wrap text in quotes, escaping quotes and backslashes.
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

/// Contents of a `{...}` token, tokenized. `None` when `token` is not a list.
pub fn brace_items(token: &str) -> Option<Vec<String>> {
    let inner = token.strip_prefix('{')?.strip_suffix('}')?;
    Some(tokenize(inner))
}
