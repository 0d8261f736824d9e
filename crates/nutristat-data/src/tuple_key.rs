//! Tuple-shaped string keys such as `('Ohio', 'Age (years)', '18 - 24')`.
//!
//! Result consumers match on this exact rendering, so quoting follows the
//! usual literal rules: single quotes unless the text itself contains a
//! single quote and no double quote.

/// Renders a single string element with quotes.
pub fn quote(text: &str) -> String {
    let quote = if text.contains('\'') && !text.contains('"') {
        '"'
    } else {
        '\''
    };

    let mut out = String::with_capacity(text.len() + 2);
    out.push(quote);
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c == quote => {
                out.push('\\');
                out.push(c);
            }
            c => out.push(c),
        }
    }
    out.push(quote);
    out
}

/// Renders a tuple of strings, e.g. `('a', 'b')`.
pub fn tuple_key(parts: &[&str]) -> String {
    let rendered: Vec<String> = parts.iter().map(|p| quote(p)).collect();
    match rendered.len() {
        1 => format!("({},)", rendered[0]),
        _ => format!("({})", rendered.join(", ")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_three_part_key() {
        assert_eq!(
            tuple_key(&["Ohio", "Age (years)", "18 - 24"]),
            "('Ohio', 'Age (years)', '18 - 24')"
        );
    }

    #[test]
    fn test_two_part_key() {
        assert_eq!(
            tuple_key(&["Income", "$15,000 - $24,999"]),
            "('Income', '$15,000 - $24,999')"
        );
    }

    #[test]
    fn test_apostrophe_switches_quotes() {
        assert_eq!(quote("Don't know"), "\"Don't know\"");
        assert_eq!(quote(r#"it's "x""#), r#"'it\'s "x"'"#);
    }

    #[test]
    fn test_single_element() {
        assert_eq!(tuple_key(&["Total"]), "('Total',)");
    }
}
