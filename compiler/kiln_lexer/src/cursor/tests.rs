use super::*;

#[test]
fn test_current_and_peek_past_end() {
    let mut cursor = Cursor::new("ab");
    assert_eq!(cursor.current(), b'a');
    assert_eq!(cursor.peek(), b'b');
    cursor.advance_n(2);
    assert!(cursor.is_eof());
    assert_eq!(cursor.current(), 0);
    assert_eq!(cursor.peek(), 0);
}

#[test]
fn test_advance_char_steps_whole_characters() {
    let mut cursor = Cursor::new("é!");
    cursor.advance_char();
    assert_eq!(cursor.pos(), 2);
    assert_eq!(cursor.current(), b'!');
}

#[test]
fn test_eat_until_newline() {
    let mut cursor = Cursor::new("// comment\nnext");
    cursor.eat_until_newline_or_eof();
    assert_eq!(cursor.current(), b'\n');

    let mut cursor = Cursor::new("// no newline");
    cursor.eat_until_newline_or_eof();
    assert!(cursor.is_eof());
}

#[test]
fn test_block_comment_body() {
    let mut cursor = Cursor::new(" body */x");
    assert!(cursor.eat_block_comment_body());
    assert_eq!(cursor.current(), b'x');

    let mut cursor = Cursor::new(" never closed");
    assert!(!cursor.eat_block_comment_body());
    assert!(cursor.is_eof());
}

#[test]
fn test_skip_to_string_delim() {
    let mut cursor = Cursor::new("hello\\n world\"");
    assert_eq!(cursor.skip_to_string_delim(), b'\\');
    assert_eq!(cursor.pos(), 5);

    let mut cursor = Cursor::new("text\r\n\"");
    assert_eq!(cursor.skip_to_string_delim(), b'\r');

    let mut cursor = Cursor::new("open");
    assert_eq!(cursor.skip_to_string_delim(), 0);
    assert!(cursor.is_eof());
}

#[test]
fn test_slice_from() {
    let mut cursor = Cursor::new("Add(");
    cursor.eat_while(|b| b.is_ascii_alphabetic());
    assert_eq!(cursor.slice_from(0), "Add");
}
