use criterion::{Criterion, criterion_group, criterion_main};
use hexhub_engine::editing::{Cmd, NoteEditor, Selection};
use hexhub_engine::markup;
mod common;

fn bench_command_operations(c: &mut Criterion) {
    let mut group = c.benchmark_group("commands");
    group.sample_size(10);

    let content = common::generate_markup(100);
    let doc = markup::parse(&content);
    let middle = doc.leaves().nth(doc.leaf_count() / 2).map(|leaf| leaf.id);

    group.bench_function("insert_text", |b| {
        let mut d = doc.clone();
        let mut selection = Selection::caret(d.end_position());
        b.iter(|| {
            let cmd = Cmd::InsertText(std::hint::black_box("test".to_string()));
            selection = d.apply(&selection, &cmd).unwrap();
        });
    });

    group.bench_function("toggle_bold_all", |b| {
        let mut d = doc.clone();
        let mut selection = d.select_all();
        b.iter(|| {
            selection = d
                .apply(std::hint::black_box(&selection), &Cmd::ToggleBold)
                .unwrap();
        });
    });

    group.bench_function("editor_apply_with_serialize", |b| {
        let mut editor = NoteEditor::new();
        editor.set_content(&content);
        if let Some(id) = middle
            && let Some(selection) = editor.document().and_then(|d| d.select(id, 0, 1))
        {
            editor.set_selection(selection);
        }
        b.iter(|| {
            let patch = editor.apply(&Cmd::ToggleItalic);
            std::hint::black_box(patch).unwrap();
        });
    });

    group.finish();
}

criterion_group!(benches, bench_command_operations);
criterion_main!(benches);
