use tin_yaml::tokenizer::StrInput;
use tin_yaml::{assert_eq_event, Event, EventIterator, Options};

fn parse_errors(input: &str) -> Vec<String> {
    let options = Options {
        throw_on_error: false,
        ..Options::default()
    };
    let mut iterator = EventIterator::with_options(StrInput::from(input), options);
    while iterator.next_event().expect("no raising configured") != Event::End {}
    iterator.errors().iter().map(|d| d.to_string()).collect()
}

const ROOT_SCALAR_INPUT: &str = "hello\n";
const ROOT_SCALAR_EVENTS: &str = r#"
 =VAL hello
 -END"#;

const ROOT_MULTILINE_INPUT: &str = "a\n b\n";
const ROOT_MULTILINE_EVENTS: &str = r#"
 =VAL a b
 -END"#;

#[test]
fn root_scalars() {
    assert_eq_event(ROOT_SCALAR_INPUT, ROOT_SCALAR_EVENTS);
    assert_eq_event(ROOT_MULTILINE_INPUT, ROOT_MULTILINE_EVENTS);
}

const FOLD_INPUT: &str = "k: one\n  two\n";
const FOLD_EVENTS: &str = r#"
 +OBJ
  =KEY k
  =VAL one two
 -OBJ
 -END"#;

const BLANK_FOLD_INPUT: &str = "k: one\n\n  two\n";
const BLANK_FOLD_EVENTS: &str = r#"
 +OBJ
  =KEY k
  =VAL one\ntwo
 -OBJ
 -END"#;

#[test]
fn multiline_folding() {
    assert_eq_event(FOLD_INPUT, FOLD_EVENTS);
    assert_eq_event(BLANK_FOLD_INPUT, BLANK_FOLD_EVENTS);
}

const COMMENT_INPUT: &str = "k: v # note\n";
const COMMENT_LINE_INPUT: &str = "k: v\n  # note\n";
const COMMENT_EVENTS: &str = r#"
 +OBJ
  =KEY k
  =VAL v
 -OBJ
 -END"#;

#[test]
fn comments_end_plain_scalars() {
    assert_eq_event(COMMENT_INPUT, COMMENT_EVENTS);
    assert_eq_event(COMMENT_LINE_INPUT, COMMENT_EVENTS);
}

const COLON_INPUT: &str = "k: a:b\n";
const COLON_EVENTS: &str = r#"
 +OBJ
  =KEY k
  =VAL a:b
 -OBJ
 -END"#;

const QUESTION_INPUT: &str = "k: ?x\n";
const QUESTION_EVENTS: &str = r#"
 +OBJ
  =KEY k
  =VAL ?x
 -OBJ
 -END"#;

const DASH_INPUT: &str = "-1\n";
const DASH_EVENTS: &str = r#"
 =VAL -1
 -END"#;

#[test]
fn indicator_lookalikes_stay_plain() {
    assert_eq_event(COLON_INPUT, COLON_EVENTS);
    assert_eq_event(QUESTION_INPUT, QUESTION_EVENTS);
    assert_eq_event(DASH_INPUT, DASH_EVENTS);
}

// a tab after `:` is separation, not indentation
const TAB_SEPARATED_INPUT: &str = "a:\tb\n";
const TAB_SEPARATED_EVENTS: &str = r#"
 +OBJ
  =KEY a
  =VAL b
 -OBJ
 -END"#;

#[test]
fn tab_separates_value_from_colon() {
    assert!(parse_errors(TAB_SEPARATED_INPUT).is_empty());
    assert_eq_event(TAB_SEPARATED_INPUT, TAB_SEPARATED_EVENTS);
}

const EMPTY_KEY_INPUT: &str = ": v\n";
const EMPTY_KEY_EVENTS: &str = r#"
 +OBJ
  =KEY
  =VAL v
 -OBJ
 -END"#;

#[test]
fn bare_colon_makes_an_empty_key() {
    assert_eq_event(EMPTY_KEY_INPUT, EMPTY_KEY_EVENTS);
}

const KEY_VALUE_EVENTS: &str = r#"
 +OBJ
  =KEY k
  =VAL v
 -OBJ
 -END"#;

// `k: v` and the explicit `? k` / `: v` form are equivalent
#[test]
fn explicit_key_form() {
    assert_eq_event("k: v\n", KEY_VALUE_EVENTS);
    assert_eq_event("? k\n: v\n", KEY_VALUE_EVENTS);
}

const MISSING_COLON_INPUT: &str = "a: 1\nb\n";
const MISSING_COLON_EVENTS: &str = r#"
 +OBJ
  =KEY a
  =VAL 1
  =KEY
  =VAL b
 -OBJ
 -END"#;

#[test]
fn scalar_without_colon_in_key_slot() {
    let errors = parse_errors(MISSING_COLON_INPUT);
    assert!(
        errors.iter().any(|e| e.contains("expected ':' after mapping key")),
        "got {errors:?}"
    );
    assert_eq_event(MISSING_COLON_INPUT, MISSING_COLON_EVENTS);
}

const TAG_INPUT: &str = "k: !custom v\n";
const TAG_EVENTS: &str = r#"
 +OBJ
  =KEY k
  =VAL v
 -OBJ
 -END"#;

#[test]
fn tags_are_lexed_and_ignored() {
    assert_eq_event(TAG_INPUT, TAG_EVENTS);
}

const QUESTION_IN_SEQ_INPUT: &str = "- a\n? b\n";

#[test]
fn key_indicator_inside_sequence_is_reported() {
    let errors = parse_errors(QUESTION_IN_SEQ_INPUT);
    assert!(
        errors.iter().any(|e| e.contains("unexpected '?' inside a sequence")),
        "got {errors:?}"
    );
}

// `- ? b` instead opens a mapping inside the sequence item
const QUESTION_ITEM_INPUT: &str = "- ? b\n";
const QUESTION_ITEM_EVENTS: &str = r#"
 +ARR
  +OBJ
   =KEY b
   =VAL
  -OBJ
 -ARR
 -END"#;

#[test]
fn explicit_key_opens_map_in_seq_item() {
    assert_eq_event(QUESTION_ITEM_INPUT, QUESTION_ITEM_EVENTS);
}
