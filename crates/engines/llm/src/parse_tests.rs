use super::*;

#[test]
fn test_explicit_marker() {
    assert_eq!(parse_choice("ACTION: 3", 4), Some(3));
    assert_eq!(parse_choice("I like 2 a lot. BET = 7", 16), Some(7));
    assert_eq!(parse_choice("choice:`12`", 16), Some(12));
}

#[test]
fn test_last_marker_wins() {
    let reply = "Action: 1 would be safe.\nFinal answer: 2";
    assert_eq!(parse_choice(reply, 4), Some(2));
}

#[test]
fn test_think_block_is_ignored() {
    let reply = "<think>Maybe 9, or 12? ACTION: 11</think>\nMy answer: **5**";
    assert_eq!(parse_choice(reply, 16), Some(5));
}

#[test]
fn test_unclosed_think_block_still_parsed() {
    assert_eq!(parse_choice("<think>going with 3", 4), Some(3));
}

#[test]
fn test_markers_match_whole_words_only() {
    assert_eq!(marker_value("alphabet 3"), None);
    assert_eq!(marker_value("prefinal: 2"), None);
    assert_eq!(parse_choice("alphabet 3 is long, so 1", 4), Some(1));
    assert_eq!(parse_choice("prefinal: 2, final: 0", 4), Some(0));
    assert_eq!(parse_choice("(bet: 2)", 4), Some(2));
}

#[test]
fn test_bold_number() {
    assert_eq!(parse_choice("I pick **5** this time, not 6", 8), Some(5));
}

#[test]
fn test_last_standalone_integer() {
    assert_eq!(parse_choice("I'd go with 4, then 2", 8), Some(2));
    assert_eq!(parse_choice("score 1.5 so 3", 8), Some(3));
    assert_eq!(parse_choice("well-2", 8), Some(2));
}

#[test]
fn test_numbers_glued_to_words_are_skipped() {
    assert_eq!(parse_choice("model r1 says 3b", 8), None);
}

#[test]
fn test_illegal_values_fail() {
    assert_eq!(parse_choice("ACTION: 20", 16), None);
    assert_eq!(parse_choice("-1", 4), None);
    assert_eq!(parse_choice("", 4), None);
    assert_eq!(parse_choice("no idea", 4), None);
}

#[test]
fn test_illegal_marker_falls_through_to_bold() {
    assert_eq!(parse_choice("ACTION: 20 (I mean **2**)", 4), Some(2));
}

#[test]
fn test_strip_think_blocks() {
    assert_eq!(
        strip_think_blocks("a<think>x</think>b<think>y</think>c"),
        "abc"
    );
    assert_eq!(strip_think_blocks("no tags"), "no tags");
}
