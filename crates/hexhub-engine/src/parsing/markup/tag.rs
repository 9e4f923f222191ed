use super::cursor::Cursor;

/// A parsed open or close tag. Names are lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub name: String,
    pub attrs: Vec<(String, String)>,
    pub self_closing: bool,
}

impl Tag {
    /// Value of the first attribute called `name`, entities decoded.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

/// Parses the raw text of a tag token such as `<a href="x">` or `</p>`.
///
/// Returns `None` when there is no tag name.
pub fn parse_tag(raw: &str) -> Option<Tag> {
    let inner = raw.strip_prefix('<')?.strip_suffix('>')?;
    let inner = inner.strip_prefix('/').unwrap_or(inner).trim_end();
    let (inner, self_closing) = match inner.strip_suffix('/') {
        Some(rest) => (rest, true),
        None => (inner, false),
    };

    let mut cur = Cursor::new(inner);
    let name = cur.take_while(|b| b.is_ascii_alphanumeric());
    if name.is_empty() {
        return None;
    }

    let mut attrs = Vec::new();
    loop {
        cur.skip_whitespace();
        if cur.eof() {
            break;
        }
        let key = cur.take_while(|b| !b.is_ascii_whitespace() && b != b'=');
        if key.is_empty() {
            // A stray '=' with no attribute name
            cur.bump();
            continue;
        }
        cur.skip_whitespace();
        let value = if cur.peek() == Some(b'=') {
            cur.bump();
            cur.skip_whitespace();
            match cur.peek() {
                Some(quote @ (b'"' | b'\'')) => {
                    cur.bump();
                    cur.take_until(quote)
                }
                _ => cur.take_while(|b| !b.is_ascii_whitespace()),
            }
        } else {
            ""
        };
        attrs.push((
            key.to_ascii_lowercase(),
            html_escape::decode_html_entities(value).into_owned(),
        ));
    }

    Some(Tag {
        name: name.to_ascii_lowercase(),
        attrs,
        self_closing,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_plain_tags() {
        let tag = parse_tag("<P>").unwrap();
        assert_eq!(tag.name, "p");
        assert!(tag.attrs.is_empty());
        assert_eq!(parse_tag("</Blockquote >").unwrap().name, "blockquote");
    }

    #[test]
    fn parses_quoted_and_bare_attributes() {
        let source = r#"<a HREF="https://x.y/?a=1&amp;b=2" target='_blank' data-x=raw hidden>"#;
        let tag = parse_tag(source).unwrap();
        assert_eq!(tag.attr("href"), Some("https://x.y/?a=1&b=2"));
        assert_eq!(tag.attr("target"), Some("_blank"));
        assert_eq!(tag.attr("data-x"), Some("raw"));
        assert_eq!(tag.attr("hidden"), Some(""));
        assert_eq!(tag.attr("missing"), None);
    }

    #[test]
    fn spaces_around_equals_are_allowed() {
        let tag = parse_tag(r#"<span style = "color:red">"#).unwrap();
        assert_eq!(tag.attr("style"), Some("color:red"));
    }

    #[test]
    fn detects_self_closing() {
        assert!(parse_tag("<br/>").unwrap().self_closing);
        assert!(parse_tag("<img src=x />").unwrap().self_closing);
        assert_eq!(parse_tag("<img src=x />").unwrap().attr("src"), Some("x"));
        assert!(!parse_tag("<br>").unwrap().self_closing);
    }

    #[test]
    fn rejects_nameless_tags() {
        assert_eq!(parse_tag("<>"), None);
        assert_eq!(parse_tag("</ >"), None);
        assert_eq!(parse_tag("not a tag"), None);
    }
}
