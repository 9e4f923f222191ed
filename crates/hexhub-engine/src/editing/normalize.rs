//! Canonical form of a [`Document`].
//!
//! A normalized document has no empty or mergeable runs, no empty leaf blocks
//! other than one trailing empty paragraph, and no two adjacent lists of the
//! same kind. Every command and every parse ends here.

use crate::editing::document::{Document, Leaf, TextBlock, TextKind};
use crate::editing::style::Run;

/// Returns the normalized form of `doc`.
pub fn normalize(mut doc: Document) -> Document {
    normalize_in_place(&mut doc);
    doc
}

pub(crate) fn normalize_in_place(doc: &mut Document) {
    doc.edit_leaves(|leaves| {
        for leaf in leaves.iter_mut() {
            match (leaf.list.is_some(), leaf.block.kind) {
                (true, kind) if kind != TextKind::ListItem => leaf.block.kind = TextKind::ListItem,
                (false, TextKind::ListItem) => leaf.block.kind = TextKind::Paragraph,
                _ => {}
            }
            merge_runs(&mut leaf.block.runs);
        }

        let last = leaves.len().saturating_sub(1);
        let mut index = 0;
        leaves.retain(|leaf| {
            let keep = !leaf.block.is_empty() || (index == last && is_plain_paragraph(leaf));
            index += 1;
            keep
        });

        if leaves.is_empty() {
            leaves.push(Leaf::top_level(TextBlock::paragraph()));
        }
    });
}

fn is_plain_paragraph(leaf: &Leaf) -> bool {
    leaf.list.is_none() && leaf.block.kind == TextKind::Paragraph
}

fn merge_runs(runs: &mut Vec<Run>) {
    let mut merged: Vec<Run> = Vec::with_capacity(runs.len());
    for run in runs.drain(..) {
        if run.text.is_empty() {
            continue;
        }
        match merged.last_mut() {
            Some(last) if last.style == run.style => last.text.push_str(&run.text),
            _ => merged.push(run),
        }
    }
    *runs = merged;
}
