use hexhub_engine::editing::*;
use hexhub_engine::markup;
use pretty_assertions::assert_eq;

fn leaf_ids(doc: &Document) -> Vec<BlockId> {
    doc.leaves().map(|leaf| leaf.id).collect()
}

fn texts(doc: &Document) -> Vec<String> {
    doc.leaves().map(TextBlock::text).collect()
}

fn bold() -> RunStyle {
    RunStyle {
        bold: true,
        ..RunStyle::default()
    }
}

#[test]
fn type_then_toggle_bold_twice() {
    // Given an empty document
    let mut doc = Document::new();
    let caret = Selection::caret(doc.start_position());

    // When typing into it
    let caret = doc.apply(&caret, &Cmd::InsertText("Hello".into())).unwrap();

    // Then the caret sits after the text
    assert!(caret.is_caret());
    assert_eq!(doc.char_offset(&caret.focus), Some(5));

    // And bolding the word gives one bold run
    let block = leaf_ids(&doc)[0];
    let selection = doc.select(block, 0, 5).unwrap();
    let selection = doc.apply(&selection, &Cmd::ToggleBold).unwrap();
    assert_eq!(
        doc.leaves().next().unwrap().runs,
        vec![Run::new("Hello", bold())]
    );

    // And toggling again removes it
    doc.apply(&selection, &Cmd::ToggleBold).unwrap();
    assert_eq!(doc.leaves().next().unwrap().runs, vec![Run::plain("Hello")]);
}

#[test]
fn bold_part_of_a_run_splits_it() {
    let mut doc = markup::parse("<p>Hello World</p>");
    let block = leaf_ids(&doc)[0];
    let selection = doc.select(block, 0, 5).unwrap();

    doc.apply(&selection, &Cmd::ToggleBold).unwrap();

    assert_eq!(
        doc.leaves().next().unwrap().runs,
        vec![Run::new("Hello", bold()), Run::plain(" World")]
    );
}

#[test]
fn toggle_twice_on_uniform_selection_restores_document() {
    let original = markup::parse("<p>one <i>two</i></p><p>three</p>");
    let mut doc = original.clone();
    let selection = doc.select_all();

    for cmd in [Cmd::ToggleUnderline, Cmd::ToggleUnderline] {
        doc.apply(&selection, &cmd).unwrap();
    }

    assert_eq!(doc, original);
}

#[test]
fn insert_link_with_empty_href_is_rejected() {
    let mut doc = markup::parse("<p>Hello</p>");
    let before = doc.clone();
    let selection = doc.select_all();

    let result = doc.apply(
        &selection,
        &Cmd::InsertLink {
            href: String::new(),
            display_text: Some("Hello".into()),
        },
    );

    assert!(matches!(result, Err(CommandError::InvalidArgument(_))));
    assert_eq!(doc, before);
}

#[test]
fn insert_link_over_range_links_selected_text() {
    let mut doc = markup::parse("<p>read the docs</p>");
    let block = leaf_ids(&doc)[0];
    let selection = doc.select(block, 9, 13).unwrap();

    let after = doc
        .apply(
            &selection,
            &Cmd::InsertLink {
                href: "https://docs.rs".into(),
                display_text: None,
            },
        )
        .unwrap();

    assert_eq!(
        markup::serialize(&doc),
        r#"<p>read the <a href="https://docs.rs">docs</a></p>"#
    );
    assert_eq!(doc.selected_text(&after), "docs");
}

#[test]
fn list_toggle_round_trip_over_several_blocks() {
    let mut doc = markup::parse("<p>a</p><p>b</p><p>c</p>");
    let ids = leaf_ids(&doc);
    let selection = Selection::range(
        doc.position_at(ids[0], 0).unwrap(),
        doc.position_at(ids[1], 1).unwrap(),
    );

    let selection = doc
        .apply(&selection, &Cmd::ToggleList(ListKind::Unordered))
        .unwrap();
    assert_eq!(
        markup::serialize(&doc),
        "<ul><li>a</li><li>b</li></ul><p>c</p>"
    );

    // Switching kind converts the whole list
    let selection = doc
        .apply(&selection, &Cmd::ToggleList(ListKind::Ordered))
        .unwrap();
    assert_eq!(
        markup::serialize(&doc),
        "<ol><li>a</li><li>b</li></ol><p>c</p>"
    );

    doc.apply(&selection, &Cmd::ToggleList(ListKind::Ordered))
        .unwrap();
    assert_eq!(markup::serialize(&doc), "<p>a</p><p>b</p><p>c</p>");
}

#[test]
fn toggling_list_next_to_existing_list_joins_it() {
    let mut doc = markup::parse("<ul><li>a</li></ul><p>b</p>");
    let ids = leaf_ids(&doc);
    let caret = Selection::caret(doc.position_at(ids[1], 0).unwrap());

    doc.apply(&caret, &Cmd::ToggleList(ListKind::Unordered))
        .unwrap();

    assert_eq!(markup::serialize(&doc), "<ul><li>a</li><li>b</li></ul>");
}

#[test]
fn heading_conversion_preserves_runs() {
    let mut doc = markup::parse("<p>plain <b>bold</b></p>");
    let caret = Selection::caret(doc.start_position());

    let heading = Cmd::SetHeading(BlockType::Heading(HeadingLevel::H1));
    doc.apply(&caret, &heading).unwrap();
    assert_eq!(markup::serialize(&doc), "<h1>plain <b>bold</b></h1>");

    doc.apply(&caret, &Cmd::SetHeading(BlockType::BlockQuote))
        .unwrap();
    assert_eq!(
        markup::serialize(&doc),
        "<blockquote>plain <b>bold</b></blockquote>"
    );

    doc.apply(&caret, &Cmd::SetHeading(BlockType::Paragraph))
        .unwrap();
    assert_eq!(markup::serialize(&doc), "<p>plain <b>bold</b></p>");
}

#[test]
fn cross_block_deletion_merges_into_first_block() {
    let mut doc = markup::parse("<h2>Heading</h2><ul><li>item</li></ul><p>tail end</p>");
    let ids = leaf_ids(&doc);
    let selection = Selection::range(
        doc.position_at(ids[2], 4).unwrap(),
        doc.position_at(ids[0], 4).unwrap(),
    );

    let after = doc.apply(&selection, &Cmd::DeleteSelection).unwrap();

    assert_eq!(markup::serialize(&doc), "<h2>Head end</h2>");
    assert!(after.is_caret());
    assert_eq!(after.focus.block, ids[0]);
    assert_eq!(doc.char_offset(&after.focus), Some(4));
}

#[test]
fn backward_deletion_walks_back_through_blocks() {
    let mut doc = markup::parse("<p>ab</p><p>c</p>");
    let ids = leaf_ids(&doc);
    let mut selection = Selection::caret(doc.position_at(ids[1], 1).unwrap());

    let mut seen = Vec::new();
    for _ in 0..5 {
        selection = doc.apply(&selection, &Cmd::DeleteBackward).unwrap();
        seen.push(texts(&doc).join("|"));
    }

    // "c" goes, the empty block merges away, then "b" and "a"; the last step is a no-op
    assert_eq!(seen, vec!["ab|", "ab", "a", "", ""]);
    assert_eq!(doc, Document::new());
}

#[test]
fn typing_replaces_a_cross_block_range() {
    let mut doc = markup::parse("<p>first</p><p>second</p>");
    let selection = doc.select_all();

    let insert = Cmd::InsertText("new".into());
    let caret = doc.apply(&selection, &insert).unwrap();

    assert_eq!(texts(&doc), vec!["new".to_string()]);
    assert_eq!(doc.char_offset(&caret.focus), Some(3));
}

#[test]
fn formatting_sizes_colors_and_highlight() {
    let mut doc = markup::parse("<p>color me</p>");
    let selection = doc.select_all();

    for cmd in [
        Cmd::SetFontSize(FontSize::new(24).unwrap()),
        Cmd::SetTextColor("#336699".parse().unwrap()),
        Cmd::SetHighlightColor("#fff59d".parse().unwrap()),
        Cmd::SetAlign(Align::Center),
    ] {
        doc.apply(&selection, &cmd).unwrap();
    }

    assert_eq!(
        markup::serialize(&doc),
        r#"<p style="text-align:center"><span style="font-size:24px;color:#336699;background-color:#fff59d">color me</span></p>"#
    );
}

#[test]
fn active_style_reports_caret_style() {
    let doc = markup::parse(r#"<p><span style="font-size:20px">big</span> small</p>"#);
    let block = leaf_ids(&doc)[0];

    let inside_big = Selection::caret(doc.position_at(block, 2).unwrap());
    assert_eq!(
        doc.active_style(&inside_big).font_size,
        FontSize::new(20).unwrap()
    );

    let inside_small = Selection::caret(doc.position_at(block, 6).unwrap());
    assert_eq!(doc.active_style(&inside_small).font_size, FontSize::DEFAULT);
}

#[test]
fn enter_inserts_a_newline_into_the_block() {
    let mut doc = markup::parse("<p>line</p>");
    let caret = Selection::caret(doc.end_position());

    let caret = doc.apply(&caret, &Cmd::InsertText("\n".into())).unwrap();
    doc.apply(&caret, &Cmd::InsertText("next".into())).unwrap();

    assert_eq!(texts(&doc), vec!["line\nnext".to_string()]);
    assert_eq!(doc.leaf_count(), 1);
}

#[test]
fn commands_from_text_drive_the_engine() {
    let mut doc = markup::parse("<p>Hello</p>");
    let mut selection = doc.select_all();

    for line in ["toggleItalic", "setFontSize 18", "setAlign right"] {
        let cmd = parse_command(line).unwrap();
        selection = doc.apply(&selection, &cmd).unwrap();
    }

    assert_eq!(
        markup::serialize(&doc),
        r#"<p style="text-align:right"><span style="font-size:18px"><i>Hello</i></span></p>"#
    );
}
