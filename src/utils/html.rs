use std::borrow::Cow;

/// Escapes the characters that have meaning in HTML text and
/// attribute values
pub fn escape(value: &str) -> Cow<'_, str> {
    if !value.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(value);
    }

    let mut output = String::with_capacity(value.len() + 8);
    for ch in value.chars() {
        match ch {
            '&' => output.push_str("&amp;"),
            '<' => output.push_str("&lt;"),
            '>' => output.push_str("&gt;"),
            '"' => output.push_str("&quot;"),
            '\'' => output.push_str("&#x27;"),
            ch => output.push(ch),
        }
    }
    Cow::Owned(output)
}

#[cfg(test)]
mod test {
    use super::escape;
    use std::borrow::Cow;

    #[test]
    fn test_escape() {
        let values = [
            ("plain", "plain"),
            ("<script>", "&lt;script&gt;"),
            ("Tom & Jerry", "Tom &amp; Jerry"),
            (r#""quoted" 'single'"#, "&quot;quoted&quot; &#x27;single&#x27;"),
        ];

        for (value, expected) in values {
            assert_eq!(escape(value), expected);
        }
    }

    #[test]
    fn test_escape_borrows() {
        assert!(matches!(escape("Nur Aisyah"), Cow::Borrowed(_)));
    }
}
