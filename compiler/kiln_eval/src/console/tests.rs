use super::*;

#[test]
fn buffer_console_captures_lines() {
    let console = buffer_console();
    console.write_line("hello");
    console.write_line("world");
    assert_eq!(console.output(), "hello\nworld\n");
    console.clear();
    assert_eq!(console.output(), "");
}

#[test]
fn silent_console_discards() {
    let console = silent_console();
    console.write_line("hello");
    assert_eq!(console.output(), "");
}
