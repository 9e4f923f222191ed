// Shared by several bench targets; each target only uses some of these
#[allow(dead_code)]
pub fn generate_markup(sections: usize) -> String {
    let base = concat!(
        r#"<h1>Title</h1><p>Paragraph with <b>bold</b>, <i>italic</i> and <a href="https://example.com">a link</a>.</p>"#,
        r#"<ul><li>First item</li><li><span style="font-size:18px;color:#336699">Styled item</span></li></ul>"#,
        r#"<blockquote>Quoted text</blockquote><pre>fn example() {}</pre>"#,
    );
    base.repeat(sections)
}

#[allow(dead_code)]
pub fn generate_legacy_markup(sections: usize) -> String {
    let base = concat!(
        r#"<div style="text-align: center"><strong>Heading-ish</strong></div>"#,
        r##"<div><font color="#ff0000" size="4">red</font> and <em>slanted</em><br></div>"##,
        "<div><br></div>",
    );
    base.repeat(sections)
}

#[allow(dead_code)]
pub fn generate_markdown(sections: usize) -> String {
    let base = "# Title\n\nParagraph with **bold** and *italic*.\n\n- Bullet point\n- Another item\n\n```\nfn example() {}\n```\n\n";
    base.repeat(sections)
}
