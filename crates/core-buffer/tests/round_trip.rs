//! Cross-cutting editing laws: apply/revert symmetry over whole edit
//! scripts, line-chain consistency, and the disk round-trip after the
//! save-time cleanups.

use core_buffer::{Buffer, Cursor};
use core_text::LineId;

fn from_str(s: &str) -> Buffer {
    Buffer::from_reader(s.as_bytes()).unwrap()
}

fn contents(b: &Buffer) -> Vec<u8> {
    b.contents()
}

fn cursor_at(b: &Buffer, line_num: usize, boffset: usize) -> Cursor {
    let mut id = b.first_line();
    for _ in 1..line_num {
        id = b.arena()[id].next.unwrap();
    }
    Cursor::new(id, line_num, boffset)
}

/// Walk the chain and cross-check it against the buffer's own accounting.
fn assert_consistent(b: &Buffer) {
    let mut count = 1;
    let mut bytes = b.arena()[b.first_line()].data.len();
    let mut id: LineId = b.first_line();
    assert!(b.arena()[id].prev.is_none());
    while let Some(next) = b.arena()[id].next {
        assert_eq!(b.arena()[next].prev, Some(id));
        bytes += b.arena()[next].data.len();
        id = next;
        count += 1;
    }
    assert_eq!(id, b.last_line());
    assert_eq!(count, b.num_lines());
    assert_eq!(bytes, b.num_bytes());
}

#[test]
fn scripted_edits_keep_the_chain_consistent() {
    let mut b = from_str("alpha\nbeta\ngamma\n");
    assert_consistent(&b);

    b.insert(cursor_at(&b, 1, 5), b" one\ntwo".to_vec());
    assert_consistent(&b);
    b.delete(cursor_at(&b, 2, 0), 4);
    assert_consistent(&b);
    b.insert_rune(cursor_at(&b, 3, 0), '\n');
    assert_consistent(&b);
    b.delete_rune_backward(cursor_at(&b, 4, 0));
    assert_consistent(&b);
    b.delete_rune(cursor_at(&b, 1, 0));
    assert_consistent(&b);
}

#[test]
fn undo_all_then_redo_all_converges_byte_for_byte() {
    let mut b = from_str("one\ntwo\nthree\n");
    let initial = contents(&b);

    // three separate groups of mixed edits
    b.insert(cursor_at(&b, 1, 3), b"!\ninserted".to_vec());
    b.finalize_action_group();
    b.delete(cursor_at(&b, 3, 0), 4);
    b.finalize_action_group();
    let mut c = cursor_at(&b, 2, 0);
    c = b.insert_rune(c, 'x');
    c = b.insert_rune(c, 'y');
    b.insert_rune(c, '\r');
    b.finalize_action_group();
    let edited = contents(&b);
    assert_consistent(&b);

    for _ in 0..3 {
        b.undo();
    }
    assert_eq!(contents(&b), initial);
    assert_consistent(&b);

    for _ in 0..3 {
        b.redo();
    }
    assert_eq!(contents(&b), edited);
    assert_consistent(&b);

    // and once more around, now through recycled group state
    for _ in 0..3 {
        b.undo();
    }
    assert_eq!(contents(&b), initial);
    for _ in 0..3 {
        b.redo();
    }
    assert_eq!(contents(&b), edited);
    assert_consistent(&b);
}

#[test]
fn undo_past_the_start_is_a_stable_no_op() {
    let mut b = from_str("stable\n");
    let initial = contents(&b);
    b.insert_rune(cursor_at(&b, 1, 0), 'x');
    b.undo();
    for _ in 0..4 {
        b.undo();
    }
    assert_eq!(contents(&b), initial);
    assert_consistent(&b);
}

#[test]
fn saved_file_reloads_to_identical_normalized_contents() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("law.txt");

    let mut b = from_str("keep  \n\ttabs\tstay  \nlast line");
    b.save_as(&path).unwrap();
    let first_pass = std::fs::read(&path).unwrap();

    // reloading and saving again must be a fixed point
    let mut reloaded = Buffer::from_reader(first_pass.as_slice()).unwrap();
    assert_eq!(contents(&reloaded), first_pass);
    let path2 = dir.path().join("law2.txt");
    reloaded.save_as(&path2).unwrap();
    assert_eq!(std::fs::read(&path2).unwrap(), first_pass);

    // the cleanups themselves stay undoable
    b.undo();
    assert_consistent(&b);
}

#[test]
fn multiline_delete_and_revert_preserve_line_identity() {
    let mut b = from_str("aa\nbb\ncc\ndd\n");
    let second = b.arena()[b.first_line()].next.unwrap();
    let third = b.arena()[second].next.unwrap();

    // delete lines 2-3 wholesale
    b.delete(cursor_at(&b, 2, 0), 6);
    assert_eq!(contents(&b), b"aa\ndd\n");
    b.undo();
    assert_eq!(contents(&b), b"aa\nbb\ncc\ndd\n");

    // the same line slots are spliced back in, contents rebuilt
    let second_again = b.arena()[b.first_line()].next.unwrap();
    assert_eq!(second_again, second);
    assert_eq!(b.arena()[second].next, Some(third));
    assert_eq!(b.arena()[second].data, b"bb");
    assert_eq!(b.arena()[third].data, b"cc");
    assert_consistent(&b);
}
