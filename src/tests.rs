use crate::{Doc, LexFlags, Match, Matcher, MatcherError, Options, PhraseMatcher, StrId, callback, pattern};
use proptest::prelude::*;
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

fn matcher_with(key: &str, patterns: &[Value]) -> Matcher {
    let mut m = Matcher::new();
    m.add(key, None, patterns).unwrap();
    m
}

fn windows(m: &Matcher, words: &[&str]) -> Vec<(usize, usize)> {
    m.find(&Doc::from_words(words)).into_iter().map(|x| (x.start, x.end)).collect()
}

#[test]
fn empty_description_matches_any_token() {
    let m = matcher_with("A.C", &[pattern![{"ORTH": "a"}, {}, {"ORTH": "c"}]]);
    assert_eq!(windows(&m, &["a", "b", "c"]), vec![(0, 3)]);

    let m = matcher_with("A.", &[pattern![{"ORTH": "a"}, {}]]);
    assert_eq!(windows(&m, &["a", "b", "c"]), vec![(0, 2)]);
}

#[test]
fn plus_does_not_shadow_following_token() {
    let m = matcher_with("A.C", &[pattern![{"ORTH": "a"}, {"IS_ALPHA": true, "OP": "+"}, {"ORTH": "c"}]]);
    assert_eq!(windows(&m, &["a", "b", "c"]), vec![(0, 3)]);
}

#[test]
fn quoted_span_with_negated_punct() {
    let words1: Vec<&str> = "He said , \" some words \" ...".split_whitespace().collect();
    let words2: Vec<&str> = "He said , \" some three words \" ...".split_whitespace().collect();

    let mut m = Matcher::new();
    m.add(
        "Quote",
        None,
        &[pattern![
            {"ORTH": "\""},
            {"OP": "!", "IS_PUNCT": true},
            {"OP": "!", "IS_PUNCT": true},
            {"ORTH": "\""}
        ]],
    )
    .unwrap();
    assert_eq!(windows(&m, &words1), vec![(3, 7)]);
    assert!(windows(&m, &words2).is_empty());

    m.add(
        "Quote",
        None,
        &[pattern![{"ORTH": "\""}, {"IS_PUNCT": true}, {"IS_PUNCT": true}, {"IS_PUNCT": true}, {"ORTH": "\""}]],
    )
    .unwrap();
    assert!(windows(&m, &words2).is_empty());
}

#[test]
fn quoted_span_with_star() {
    let words: Vec<&str> = "He said , \" some words \" ...".split_whitespace().collect();
    let m = matcher_with("Quote", &[pattern![{"ORTH": "\""}, {"OP": "*", "IS_PUNCT": false}, {"ORTH": "\""}]]);
    assert_eq!(windows(&m, &words), vec![(3, 7)]);
}

#[test]
fn one_plus_collapses_repeated_name() {
    let doc = Doc::from_words(["Philippe", "Philippe"]);

    let control = matcher_with("BasicPhilippe", &[pattern![{"ORTH": "Philippe"}]]);
    assert_eq!(control.find(&doc).len(), 2);

    let kleene =
        matcher_with("KleenePhilippe", &[pattern![{"ORTH": "Philippe", "OP": "1"}, {"ORTH": "Philippe", "OP": "+"}]]);
    let found: Vec<_> = kleene.find(&doc).into_iter().map(|x| (x.start, x.end)).collect();
    assert_eq!(found, vec![(0, 2)]);
}

#[test]
fn operator_combos() {
    let cases = [
        ("aaab", "a a a b", true),
        ("aaab", "a+ b", true),
        ("aaab", "a+ a+ b", true),
        ("aaab", "a+ a+ a b", true),
        ("aaab", "a+ a+ a+ b", true),
        ("aaab", "a+ a a b", true),
        ("aaab", "a+ a a", true),
        ("aaab", "a+", true),
        ("aaa", "a+ b", false),
        ("aaa", "a+ a+ b", false),
        ("aaa", "a+ a+ a+ b", false),
        ("aaa", "a+ a b", false),
        ("aaa", "a+ a a b", false),
        ("aaab", "a+ a b", true),
    ];

    for (string, pattern_str, expected) in cases {
        let words: Vec<String> = string.chars().map(String::from).collect();
        let doc = Doc::from_words(&words);
        let pattern: Vec<Value> = pattern_str
            .split_whitespace()
            .map(|part| match part.strip_suffix('+') {
                Some(text) => json!({"ORTH": text, "OP": "+"}),
                None => json!({"ORTH": part}),
            })
            .collect();
        let m = matcher_with("PATTERN", &[Value::Array(pattern)]);
        assert_eq!(!m.find(&doc).is_empty(), expected, "{string:?} against {pattern_str:?}");
    }
}

#[test]
fn trailing_star_window_counts() {
    let m = matcher_with("TSTEND", &[pattern![{"ORTH": "a"}, {"ORTH": "b", "OP": "*"}]]);
    let cases = [("a", 1), ("a b", 2), ("a c", 1), ("a b c", 2), ("a b b c", 3), ("a b b", 3)];
    for (text, expected) in cases {
        assert_eq!(m.find(&Doc::from_text(text)).len(), expected, "{text:?}");
    }
}

#[test]
fn any_token_star_reports_growing_windows() {
    let m = matcher_with("TEST", &[pattern![{"ORTH": "test"}, {"OP": "*"}]]);
    let doc = Doc::from_words(["test", "hello", "world"]);
    let texts: Vec<String> = m.find(&doc).iter().map(|x| doc.span_text(x.start, x.end)).collect();
    assert_eq!(texts, vec!["test", "test hello", "test hello world"]);
}

#[test]
fn matches_from_several_rules_are_sorted() {
    let mut m = Matcher::new();
    m.add("B", None, &[pattern![{"ORTH": "y"}]]).unwrap();
    m.add("A", None, &[pattern![{"ORTH": "x"}, {"ORTH": "y"}], pattern![{"ORTH": "x"}]]).unwrap();
    let found: Vec<_> = m
        .find(&Doc::from_text("y x y"))
        .into_iter()
        .map(|x| (m.key_name(x.key).unwrap().to_string(), x.start, x.end))
        .collect();
    assert_eq!(
        found,
        vec![("B".to_string(), 0, 1), ("A".to_string(), 1, 2), ("A".to_string(), 1, 3), ("B".to_string(), 2, 3)]
    );
}

#[test]
fn usage_docs_callback_merges_and_sets_norm() {
    let text = "Wow 😀 This is really cool! 😂 😂";
    let mut doc = Doc::from_words(text.split(' '));
    let emoji = ["😀", "😃", "😂", "🤣", "😊", "😍"];
    let patterns: Vec<Value> = emoji.iter().map(|e| pattern![{"ORTH": e}]).collect();

    let sentiment = Arc::new(Mutex::new(0.0_f64));
    let score = Arc::clone(&sentiment);
    let mut m = Matcher::new();
    m.add(
        "HAPPY",
        callback(move |doc, i, matches| {
            let Match { start, end, .. } = matches[i];
            *score.lock().unwrap() += 0.1;
            if let Some(merged) = doc.merge(start, end) {
                doc.set_norm(merged, "happy emoji");
            }
            Ok(())
        }),
        &patterns,
    )
    .unwrap();

    let matches = m.run(&mut doc).unwrap();
    assert_eq!(matches.len(), 3);
    assert!(*sentiment.lock().unwrap() > 0.0);
    assert_eq!(doc.resolve(doc.tokens()[1].norm), Some("happy emoji"));
}

#[test]
fn callback_sees_index_into_full_list() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let mut m = Matcher::new();
    m.add("PLAIN", None, &[pattern![{"ORTH": "b"}]]).unwrap();
    m.add(
        "CB",
        callback(move |_, i, matches| {
            sink.lock().unwrap().push((i, matches.len(), matches[i].start));
            Ok(())
        }),
        &[pattern![{"ORTH": "a"}]],
    )
    .unwrap();

    let mut doc = Doc::from_text("a b a b a");
    m.run(&mut doc).unwrap();
    assert_eq!(*seen.lock().unwrap(), vec![(0, 5, 0), (2, 5, 2), (4, 5, 4)]);
}

#[test]
fn callback_error_aborts_remaining_callbacks() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut m = Matcher::new();
    m.add(
        "FAIL",
        callback(move |_, i, _| {
            counter.fetch_add(1, Ordering::SeqCst);
            if i == 1 { Err("second match rejected".into()) } else { Ok(()) }
        }),
        &[pattern![{"ORTH": "x"}]],
    )
    .unwrap();

    let mut doc = Doc::from_text("x x x");
    let err = m.run(&mut doc).unwrap_err();
    assert!(matches!(err, MatcherError::Callback { ref key, index: 1, .. } if key == "FAIL"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
    assert!(m.contains("FAIL"));
    assert_eq!(m.find(&doc).len(), 3);
}

#[test]
fn merges_do_not_shift_reported_indices() {
    let mut m = Matcher::new();
    m.add(
        "AB",
        callback(|doc, i, matches| {
            doc.merge(matches[i].start, matches[i].end);
            Ok(())
        }),
        &[pattern![{"ORTH": "a"}, {"ORTH": "b"}]],
    )
    .unwrap();
    let mut doc = Doc::from_text("a b a b");
    let matches = m.run(&mut doc).unwrap();
    assert_eq!(matches.iter().map(|x| (x.start, x.end)).collect::<Vec<_>>(), vec![(0, 2), (2, 4)]);
    // The second callback still sees 2..4, which no longer fits the shortened doc.
    assert_eq!(doc.len(), 3);
    assert_eq!(doc.text_at(0), "a b");
}

#[test]
fn pipe_runs_each_document() {
    let m = matcher_with("JS", &[pattern![{"LOWER": "javascript"}]]);
    let mut docs = vec![Doc::from_text("JavaScript rocks"), Doc::from_text("no match"), Doc::from_text("javascript")];
    let results = m.pipe(docs.iter_mut()).unwrap();
    assert_eq!(results.iter().map(Vec::len).collect::<Vec<_>>(), vec![1, 0, 1]);
}

#[test]
fn tagger_attributes_and_flags() {
    let mut doc = Doc::from_text("Apple buys U.K. startup for $1 billion");
    doc.set_ent_type(0, "ORG");
    doc.set_pos(1, "VERB");
    let m = matcher_with("ACQ", &[pattern![{"ENT_TYPE": "ORG"}, {"POS": "VERB"}, {"IS_ALPHA": false, "OP": "?"}]]);
    assert_eq!(m.find(&doc).iter().map(|x| (x.start, x.end)).collect::<Vec<_>>(), vec![(0, 2), (0, 3)]);

    let money = matcher_with("NUM", &[pattern![{"LIKE_NUM": true}, {"LOWER": "billion"}]]);
    assert!(money.find(&doc).is_empty());
    let mut doc = Doc::from_text("1 billion");
    doc.set_flag(0, LexFlags::LIKE_NUM, true);
    assert_eq!(money.find(&doc).len(), 1);
}

#[test]
fn unknown_attributes_follow_policy() {
    let mut strict = Matcher::new();
    assert!(matches!(
        strict.add("S", None, &[pattern![{"SENTIMENT": "pos"}]]),
        Err(MatcherError::UnknownAttribute { .. })
    ));

    let mut lenient =
        Matcher::with_options(Options { unknown_attributes: crate::UnknownAttributePolicy::Ignore, ..Options::default() });
    lenient.add("S", None, &[pattern![{"SENTIMENT": "pos"}]]).unwrap();
    lenient.add("N", None, &[pattern![{"ORTH": "a"}, {"SENTIMENT": "pos", "OP": "!"}]]).unwrap();
    let found = lenient.find(&Doc::from_text("a b"));
    assert_eq!(found, vec![Match { key: StrId::of("N"), start: 0, end: 2 }]);
}

#[test]
fn trigger_scan_does_not_change_results() {
    let patterns = [
        pattern![{"ORTH": "Google"}, {"ORTH": "Now", "OP": "?"}],
        pattern![{"LOWER": "java"}, {"OP": "*"}],
        pattern![{"IS_PUNCT": true, "OP": "!"}, {"ORTH": "."}],
    ];
    let mut with = Matcher::new();
    let mut without = Matcher::with_options(Options { trigger_scan: false, ..Options::default() });
    with.add("R", None, &patterns).unwrap();
    without.add("R", None, &patterns).unwrap();

    for text in ["I like Google Now .", "java and Java !", "nothing here", "Google"] {
        let doc = Doc::from_text(text);
        assert_eq!(with.find(&doc), without.find(&doc), "{text:?}");
    }
}

#[test]
fn phrase_matcher_scenario() {
    let mut m = PhraseMatcher::new();
    m.add("COMPANY", None, [&Doc::from_words(["Google", "Now"])]).unwrap();
    let doc = Doc::from_words(["I", "like", "Google", "Now", "best"]);
    let found = m.find(&doc);
    assert_eq!(found.len(), 1);
    assert_eq!((found[0].start, found[0].end), (2, 4));
}

proptest! {
    #[test]
    fn fixed_patterns_match_exactly_where_the_words_are(
        words in proptest::collection::vec(prop_oneof![Just("a"), Just("b"), Just("c")], 0..12),
        needle in proptest::collection::vec(prop_oneof![Just("a"), Just("b"), Just("c")], 1..4),
    ) {
        let pattern: Vec<Value> = needle.iter().map(|w| json!({"ORTH": w})).collect();
        let m = matcher_with("P", &[Value::Array(pattern)]);
        let found = windows(&m, &words);

        let expected: Vec<(usize, usize)> = (0..words.len())
            .filter(|&s| words[s..].starts_with(&needle))
            .map(|s| (s, s + needle.len()))
            .collect();
        prop_assert_eq!(found, expected);
    }

    #[test]
    fn trailing_star_counts_follow_run_length(run in 0usize..6, tail in prop_oneof![Just("c"), Just("a")]) {
        let mut words = vec!["a"];
        words.extend(std::iter::repeat_n("b", run));
        words.push(tail);
        let m = matcher_with("P", &[pattern![{"ORTH": "a"}, {"ORTH": "b", "OP": "*"}]]);
        let from_zero = windows(&m, &words).into_iter().filter(|&(s, _)| s == 0).count();
        prop_assert_eq!(from_zero, run + 1);
    }

    #[test]
    fn results_are_sorted_and_distinct(
        words in proptest::collection::vec(prop_oneof![Just("a"), Just("b"), Just(",")], 0..10),
    ) {
        let mut m = Matcher::new();
        m.add("X", None, &[pattern![{"ORTH": "a", "OP": "+"}, {"OP": "*"}], pattern![{"IS_PUNCT": true, "OP": "!"}]]).unwrap();
        m.add("Y", None, &[pattern![{"ORTH": "b", "OP": "?"}, {"ORTH": "a"}]]).unwrap();
        let found = m.find(&Doc::from_words(&words));
        for pair in found.windows(2) {
            prop_assert!((pair[0].start, pair[0].end) <= (pair[1].start, pair[1].end));
            prop_assert!(pair[0] != pair[1]);
        }
        for x in &found {
            prop_assert!(x.start < x.end && x.end <= words.len());
        }
    }
}
