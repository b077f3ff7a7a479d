//! End-to-end editing scenarios against the public buffer API.

use std::sync::Arc;
use std::thread;

use etch_core::{EolType, Position, Range, TextBuffer};

fn range(start: (usize, usize), end: (usize, usize)) -> Range {
    Range::new(Position::new(start.0, start.1), Position::new(end.0, end.1))
}

#[test]
fn hello_world_basics() {
    let buffer = TextBuffer::new();
    buffer.insert(Position::new(0, 0), "Hello, World!").unwrap();
    assert_eq!(buffer.text(), "Hello, World!");
    assert_eq!(buffer.line_count(), 1);
    assert_eq!(buffer.len(), 13);
}

#[test]
fn insert_delete_undo_redo_cycle() {
    let buffer = TextBuffer::new();
    buffer.insert(Position::new(0, 0), "Hello, World!").unwrap();

    buffer.insert(Position::new(0, 7), " Go").unwrap();
    assert_eq!(buffer.text(), "Hello,  GoWorld!");

    buffer.delete(range((0, 7), (0, 10))).unwrap();
    assert_eq!(buffer.text(), "Hello, World!");

    buffer.undo().unwrap();
    assert_eq!(buffer.text(), "Hello,  GoWorld!");

    buffer.redo().unwrap();
    assert_eq!(buffer.text(), "Hello, World!");
}

#[test]
fn line_addressing() {
    let buffer = TextBuffer::new();
    buffer.set_text("Line 1\nLine 2\nLine 3");
    assert_eq!(buffer.line_count(), 3);
    assert_eq!(buffer.line_content(1), "Line 2\n");
    assert_eq!(buffer.line_content(2), "Line 3");
    assert_eq!(buffer.position_at(8), Position::new(1, 1));
    assert_eq!(buffer.offset_at(Position::new(1, 1)), 8);
}

#[test]
fn lines_concatenate_to_text() {
    let buffer = TextBuffer::new();
    for text in ["", "solo", "a\nb\nc", "trailing\n", "\n\n"] {
        buffer.set_text(text);
        assert_eq!(buffer.lines().concat(), text, "case {text:?}");
        let newlines = text.chars().filter(|&c| c == '\n').count();
        assert_eq!(buffer.line_count(), newlines + 1, "case {text:?}");
    }
}

#[test]
fn insert_then_undo_is_a_text_noop() {
    let buffer = TextBuffer::new();
    buffer.set_text("base\ntext");
    let before = buffer.text();

    for (position, inserted) in [
        (Position::new(0, 0), "x"),
        (Position::new(0, 4), "long insertion\nwith newline"),
        (Position::new(1, 2), "日本語"),
        (Position::new(99, 99), "clamped"),
    ] {
        buffer.insert(position, inserted).unwrap();
        buffer.undo().unwrap();
        assert_eq!(buffer.text(), before, "insert {inserted:?} at {position:?}");
    }
}

#[test]
fn delete_then_undo_is_a_text_noop() {
    let buffer = TextBuffer::new();
    buffer.set_text("alpha\nbeta\ngamma");
    let before = buffer.text();

    for (start, end) in [((0, 0), (0, 2)), ((0, 3), (1, 1)), ((1, 0), (2, 5))] {
        buffer.delete(range(start, end)).unwrap();
        buffer.undo().unwrap();
        assert_eq!(buffer.text(), before, "delete {start:?}..{end:?}");
    }
}

#[test]
fn undo_then_redo_restores_exactly() {
    let buffer = TextBuffer::new();
    buffer.set_text("seed");
    buffer.insert(Position::new(0, 4), " grown").unwrap();
    buffer.replace(range((0, 0), (0, 4)), "tree").unwrap();
    let latest = buffer.text();

    buffer.undo().unwrap();
    let earlier = buffer.text();
    buffer.redo().unwrap();
    assert_eq!(buffer.text(), latest);

    buffer.undo().unwrap();
    assert_eq!(buffer.text(), earlier);
}

#[test]
fn undo_depth_is_bounded() {
    let buffer = TextBuffer::new();
    for i in 0..150 {
        buffer.insert(Position::new(0, 0), &format!("{i},")).unwrap();
    }
    let mut undone = 0;
    while buffer.undo().is_ok() {
        undone += 1;
    }
    assert_eq!(undone, 100);
}

#[test]
fn eol_normalisation_scenario() {
    let buffer = TextBuffer::new();
    buffer.set_text("Line 1\nLine 2\r\nLine 3\rLine 4");
    buffer.set_eol_type(EolType::Unix);
    assert_eq!(buffer.text(), "Line 1\nLine 2\nLine 3\nLine 4");
    assert_eq!(buffer.line_count(), 4);
}

#[test]
fn eol_round_trip_through_windows() {
    let buffer = TextBuffer::new();
    buffer.set_text("a\nb\nc");
    buffer.set_eol_type(EolType::Windows);
    assert_eq!(buffer.text(), "a\r\nb\r\nc");
    assert_eq!(buffer.eol_string(), "\r\n");
    buffer.set_eol_type(EolType::Unix);
    assert_eq!(buffer.text(), "a\nb\nc");
}

#[test]
fn unicode_round_trip_properties() {
    let buffer = TextBuffer::new();
    buffer.set_text("héllo wörld\n日本語のテキスト\nemoji: 🦀 done");
    for offset in 0..=buffer.len() {
        let position = buffer.position_at(offset);
        assert_eq!(buffer.offset_at(position), offset, "offset {offset}");
    }
    assert_eq!(buffer.lines().concat(), buffer.text());
}

#[test]
fn clamped_positions_never_panic() {
    let buffer = TextBuffer::new();
    buffer.set_text("short\ntext");
    assert_eq!(buffer.offset_at(Position::new(99, 99)), buffer.len());
    assert_eq!(buffer.position_at(10_000), buffer.position_at(buffer.len()));
    buffer.insert(Position::new(99, 0), "!").unwrap();
    assert_eq!(buffer.text(), "short\ntext!");
}

#[test]
fn concurrent_readers_and_writer() {
    let buffer = Arc::new(TextBuffer::new());
    buffer.set_text("tick\n");

    let writer = {
        let buffer = Arc::clone(&buffer);
        thread::spawn(move || {
            for _ in 0..200 {
                let end = buffer.len();
                let position = buffer.position_at(end);
                buffer.insert(position, "tick\n").unwrap();
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let buffer = Arc::clone(&buffer);
            thread::spawn(move || {
                for _ in 0..200 {
                    // Each read sees a consistent snapshot: whole "tick\n"
                    // units only, never a partially applied insert.
                    let text = buffer.text();
                    assert!(text.len() % 5 == 0, "partial write observed");
                    assert_eq!(text.chars().filter(|&c| c == '\n').count() * 5, text.len());
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
    assert_eq!(buffer.line_count(), 202);
}
