//! Find, find next/previous and replace through `Editor::execute`.

mod common;

use common::{lines, pos, run, test_editor};
use nib::{Clipboard, Command, EditorError};

fn find(query: &str, case_sensitive: bool) -> Command {
    Command::Find {
        query: query.to_string(),
        case_sensitive,
    }
}

fn replace(query: &str, replacement: &str, all: bool) -> Command {
    Command::Replace {
        query: query.to_string(),
        replacement: replacement.to_string(),
        all,
    }
}

#[test]
fn test_find_next_until_pass_is_exhausted() {
    let mut ed = test_editor("Foo\nbar", 0, 0);
    let mut clip = Clipboard::new();

    run(&mut ed, &mut clip, &[find("o", false)]);
    assert_eq!(ed.cursor(), pos(0, 1));

    run(&mut ed, &mut clip, &[Command::FindNext]);
    assert_eq!(ed.cursor(), pos(0, 2));

    let status = run(&mut ed, &mut clip, &[Command::FindNext]);
    assert!(status.is_error());
    assert_eq!(
        status.message(),
        Some(EditorError::NotFound("o".to_string()).to_string().as_str())
    );
    assert_eq!(ed.cursor(), pos(0, 2));
}

#[test]
fn test_search_restarts_from_top_after_not_found() {
    let mut ed = test_editor("Foo\nbar", 0, 0);
    let mut clip = Clipboard::new();
    run(
        &mut ed,
        &mut clip,
        &[find("o", false), Command::FindNext, Command::FindNext],
    );

    run(&mut ed, &mut clip, &[Command::FindNext]);
    assert_eq!(ed.cursor(), pos(0, 1));
}

#[test]
fn test_find_selects_the_match() {
    let mut ed = test_editor("alpha beta gamma", 0, 0);
    let mut clip = Clipboard::new();
    run(&mut ed, &mut clip, &[find("beta", false)]);
    let span = ed.selection().unwrap();
    assert_eq!((span.start, span.end), (pos(0, 6), pos(0, 10)));
    assert_eq!(ed.cursor(), pos(0, 6));
}

#[test]
fn test_find_wraps_around_to_the_top() {
    let mut ed = test_editor("x one\ny two\nx three", 1, 0);
    let mut clip = Clipboard::new();
    let status = run(&mut ed, &mut clip, &[find("x", true)]);
    assert_eq!(ed.cursor(), pos(2, 0));
    assert!(!status.is_error());

    let status = run(&mut ed, &mut clip, &[Command::FindNext]);
    assert_eq!(ed.cursor(), pos(0, 0));
    assert_eq!(status.message(), Some("Match 1 of 2; search wrapped"));
}

#[test]
fn test_find_with_cursor_on_match_ends_after_one_pass() {
    let mut ed = test_editor("foo foo", 0, 0);
    let mut clip = Clipboard::new();

    run(&mut ed, &mut clip, &[find("foo", false)]);
    assert_eq!(ed.cursor(), pos(0, 4));

    let status = run(&mut ed, &mut clip, &[Command::FindNext]);
    assert_eq!(ed.cursor(), pos(0, 0));
    assert_eq!(status.message(), Some("Match 1 of 2; search wrapped"));

    let status = run(&mut ed, &mut clip, &[Command::FindNext]);
    assert!(status.is_error());
    assert_eq!(ed.cursor(), pos(0, 0));
}

#[test]
fn test_single_char_query_on_cursor_ends_after_one_pass() {
    let mut ed = test_editor("oFoo\nbar", 0, 0);
    let mut clip = Clipboard::new();

    run(&mut ed, &mut clip, &[find("o", false)]);
    assert_eq!(ed.cursor(), pos(0, 2));
    run(&mut ed, &mut clip, &[Command::FindNext]);
    assert_eq!(ed.cursor(), pos(0, 3));
    run(&mut ed, &mut clip, &[Command::FindNext]);
    assert_eq!(ed.cursor(), pos(0, 0));

    let status = run(&mut ed, &mut clip, &[Command::FindNext]);
    assert_eq!(
        status.message(),
        Some(EditorError::NotFound("o".to_string()).to_string().as_str())
    );
    assert_eq!(ed.cursor(), pos(0, 0));
}

#[test]
fn test_find_reports_match_index() {
    let mut ed = test_editor("a\nb a\na", 0, 0);
    let mut clip = Clipboard::new();

    let status = run(&mut ed, &mut clip, &[find("a", true)]);
    assert_eq!(ed.cursor(), pos(1, 2));
    assert_eq!(status.message(), Some("Match 2 of 3"));

    let status = run(&mut ed, &mut clip, &[Command::FindNext]);
    assert_eq!(status.message(), Some("Match 3 of 3"));

    let status = run(&mut ed, &mut clip, &[Command::FindPrevious]);
    assert_eq!(status.message(), Some("Match 2 of 3"));
}

#[test]
fn test_case_sensitivity() {
    let mut ed = test_editor("Hello hello", 0, 0);
    let mut clip = Clipboard::new();

    run(&mut ed, &mut clip, &[find("HELLO", false)]);
    assert_eq!(ed.cursor(), pos(0, 6));

    let status = run(&mut ed, &mut clip, &[find("HELLO", true)]);
    assert!(status.is_error());
}

#[test]
fn test_find_previous_walks_backwards() {
    let mut ed = test_editor("ab ab ab", 0, 0);
    let mut clip = Clipboard::new();
    run(
        &mut ed,
        &mut clip,
        &[find("ab", false), Command::FindNext],
    );
    assert_eq!(ed.cursor(), pos(0, 6));

    run(&mut ed, &mut clip, &[Command::FindPrevious]);
    assert_eq!(ed.cursor(), pos(0, 3));
}

#[test]
fn test_empty_query_is_rejected() {
    let mut ed = test_editor("abc", 0, 0);
    let mut clip = Clipboard::new();
    let status = run(&mut ed, &mut clip, &[find("", false)]);
    assert_eq!(status.message(), Some("search query is empty"));
    assert!(ed.search().is_none());
}

#[test]
fn test_replace_one_selects_then_replaces() {
    let mut ed = test_editor("cat cat", 0, 0);
    let mut clip = Clipboard::new();

    let status = run(&mut ed, &mut clip, &[replace("cat", "dog", false)]);
    assert_eq!(
        status.message(),
        Some("Match selected; replace again to confirm")
    );
    assert_eq!(lines(&ed), vec!["cat cat"]);

    let status = run(&mut ed, &mut clip, &[replace("cat", "dog", false)]);
    assert_eq!(status.message(), Some("Replaced 1 occurrence"));
    assert_eq!(lines(&ed), vec!["dog cat"]);
    assert_eq!(ed.cursor(), pos(0, 4));

    let status = run(&mut ed, &mut clip, &[replace("cat", "dog", false)]);
    assert_eq!(
        status.message(),
        Some("Replaced 1 occurrence; no more matches")
    );
    assert_eq!(lines(&ed), vec!["dog dog"]);
}

#[test]
fn test_replace_all_counts_occurrences() {
    let mut ed = test_editor("aa\nxaax\naa", 1, 2);
    let mut clip = Clipboard::new();
    let status = run(&mut ed, &mut clip, &[replace("aa", "a", true)]);
    assert_eq!(status.message(), Some("Replaced 3 occurrences"));
    assert_eq!(lines(&ed), vec!["a", "xax", "a"]);
}

#[test]
fn test_replace_all_does_not_rescan_inserted_text() {
    let mut ed = test_editor("a a", 0, 0);
    let mut clip = Clipboard::new();
    let status = run(&mut ed, &mut clip, &[replace("a", "aa", true)]);
    assert_eq!(status.message(), Some("Replaced 2 occurrences"));
    assert_eq!(lines(&ed), vec!["aa aa"]);
}

#[test]
fn test_replace_all_with_no_match_is_not_found() {
    let mut ed = test_editor("abc", 0, 0);
    let mut clip = Clipboard::new();
    let status = run(&mut ed, &mut clip, &[replace("zz", "y", true)]);
    assert!(status.is_error());
    assert_eq!(lines(&ed), vec!["abc"]);
    assert!(!ed.document().is_modified());
}
