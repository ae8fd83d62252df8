use super::*;

#[test]
fn test_plain_fields_are_not_quoted() {
    assert_eq!(escape("gpt-4o"), "gpt-4o");
    assert_eq!(escape("a,b"), "\"a,b\"");
    assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
}

#[test]
fn test_to_csv_layout() {
    let text = to_csv(&["rank", "model"], vec![vec!["1", "x,y"], vec!["2", "z"]]);
    assert_eq!(text, "rank,model\n1,\"x,y\"\n2,z\n");
}

#[test]
fn test_parse_reads_back_quoted_fields() {
    let text = to_csv(
        &["model", "note"],
        vec![vec!["a \"quoted\", name", "line\nbreak"], vec!["plain", ""]],
    );
    let records = parse(&text).unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(records[1].fields, vec!["a \"quoted\", name", "line\nbreak"]);
    assert_eq!(records[2].line, 4);
    assert_eq!(records[2].fields, vec!["plain", ""]);
}

#[test]
fn test_parse_skips_blank_lines_and_crlf() {
    let records = parse("a,b\r\n\r\n1,2\r\n").unwrap();
    assert_eq!(records.len(), 2);
    assert_eq!(records[1].line, 3);
    assert_eq!(records[1].get(1), Some("2"));
}

#[test]
fn test_parse_errors_carry_line_numbers() {
    match parse("a,b\n1,\"open\n") {
        Err(RatingError::Csv { line, .. }) => assert_eq!(line, 2),
        other => panic!("expected csv error, got {other:?}"),
    }
    match parse("a,b\n1,2\nx\"y,3\n") {
        Err(RatingError::Csv { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected csv error, got {other:?}"),
    }
}
