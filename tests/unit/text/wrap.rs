use super::*;

/// 10 px per char, like a monospace font.
fn mono(s: &str) -> f32 {
    s.chars().count() as f32 * 10.0
}

#[test]
fn empty_text_emits_one_empty_line() {
    assert_eq!(wrap_words("", 100.0, mono), vec![String::new()]);
    assert_eq!(wrap_words("   \t ", 100.0, mono), vec![String::new()]);
}

#[test]
fn short_text_stays_on_one_line() {
    assert_eq!(wrap_words("hello world", 200.0, mono), vec!["hello world"]);
}

#[test]
fn wraps_when_candidate_with_trailing_space_overflows() {
    // "aaa bbb " is 80 px; the trailing space counts toward the measurement.
    assert_eq!(wrap_words("aaa bbb", 79.0, mono), vec!["aaa", "bbb"]);
    assert_eq!(wrap_words("aaa bbb", 80.0, mono), vec!["aaa bbb"]);
}

#[test]
fn overlong_word_is_kept_whole_on_its_own_line() {
    let lines = wrap_words("hi supercalifragilistic yo", 60.0, mono);
    assert_eq!(lines, vec!["hi", "supercalifragilistic", "yo"]);
}

#[test]
fn leading_overlong_word_does_not_emit_an_empty_line() {
    let lines = wrap_words("enormousword x", 30.0, mono);
    assert_eq!(lines, vec!["enormousword", "x"]);
}

#[test]
fn rtl_text_is_split_on_whitespace_like_any_other() {
    let lines = wrap_words("مرحبا بكم في   الفيديو", 70.0, mono);
    assert_eq!(lines, vec!["مرحبا", "بكم في", "الفيديو"]);
}

#[test]
fn lines_rejoin_to_original_words_and_respect_max_width() {
    let text = "the quick brown fox jumps over the lazy dog and keeps running far away";
    for max in [25.0f32, 60.0, 95.0, 140.0, 1000.0] {
        let lines = wrap_words(text, max, mono);
        let rejoined = lines.join(" ");
        assert_eq!(
            rejoined.split_whitespace().collect::<Vec<_>>(),
            text.split_whitespace().collect::<Vec<_>>()
        );
        for line in &lines {
            let single_word = !line.contains(' ');
            assert!(mono(line) <= max || single_word, "{line:?} overflows {max}");
        }
    }
}

#[test]
fn emitted_lines_end_flush_for_right_alignment() {
    let lines = wrap_words("aaa bbb ccc", 79.0, mono);
    assert_eq!(lines, vec!["aaa", "bbb", "ccc"]);
    assert!(lines.iter().all(|l| !l.ends_with(' ')));
    assert_eq!(mono(&lines[0]), 30.0);
}
