//! Built-in print family: formatting contracts of the host runtime.

use zeroc::runtime::{
    color_code, format_ex, format_fstring, format_log, format_piped, format_traced,
};

#[test]
fn test_color_codes() {
    assert_eq!(color_code("red"), Some("\x1b[31m"));
    assert_eq!(color_code("green"), Some("\x1b[32m"));
    assert_eq!(color_code("yellow"), Some("\x1b[33m"));
    assert_eq!(color_code("blue"), Some("\x1b[34m"));
    assert_eq!(color_code("magenta"), Some("\x1b[35m"));
    assert_eq!(color_code("cyan"), Some("\x1b[36m"));
    assert_eq!(color_code("white"), Some("\x1b[37m"));
    assert_eq!(color_code("reset"), Some("\x1b[0m"));
    assert_eq!(color_code("mauve"), None);
}

#[test]
fn test_format_log_with_ansi() {
    assert_eq!(
        format_log("alert", Some("red"), true),
        "\x1b[31malert\x1b[0m"
    );
}

#[test]
fn test_format_log_without_ansi_is_plain() {
    assert_eq!(format_log("alert", Some("red"), false), "alert");
}

#[test]
fn test_format_log_unknown_color_is_plain() {
    assert_eq!(format_log("alert", Some("mauve"), true), "alert");
    assert_eq!(format_log("alert", None, true), "alert");
}

#[test]
fn test_format_traced() {
    assert_eq!(format_traced("step", true), "[TRACE] step");
    assert_eq!(format_traced("step", false), "step");
    assert_eq!(format_traced("", true), "[TRACE] ");
}

#[test]
fn test_format_piped() {
    assert_eq!(format_piped("42", Some("result")), "result: 42");
    assert_eq!(format_piped("42", None), "42");
    // An empty label counts as no label.
    assert_eq!(format_piped("42", Some("")), "42");
}

#[test]
fn test_format_fstring_concatenates() {
    let parts = vec!["Value: ".to_owned(), "10".to_owned(), "!".to_owned()];
    assert_eq!(format_fstring(&parts), "Value: 10!");
    assert_eq!(format_fstring(&[]), "");
}

#[test]
fn test_format_ex_modes() {
    assert_eq!(format_ex("msg", 0, None), "msg");
    assert_eq!(format_ex("msg", 1, None), "[TRACE] msg");
    assert_eq!(format_ex("100", 2, Some("computed")), "computed: 100");
    assert_eq!(format_ex("100", 2, None), "100");
    // Unknown modes fall back to plain printing.
    assert_eq!(format_ex("msg", 99, None), "msg");
    assert_eq!(format_ex("msg", -1, Some("x")), "msg");
}
