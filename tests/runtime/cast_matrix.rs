#[path = "../support/mod.rs"]
mod support;

use refc::runtime::{
    CastKind, Value, cast,
    casts::{NAMED_CASTS, cast_int_to_string, cast_string_to_int},
    make::*,
};
use support::{assert_no_leaks, tracked};

fn samples() -> Vec<Value> {
    vec![
        make_int(-191),
        make_double(66.75),
        make_char(b'z'),
        make_string(" 300xyz"),
        make_integer_literal("4294967361"),
    ]
}

fn render_table(sources: &[Value]) -> String {
    let mut lines = Vec::new();
    for source in sources {
        let from = CastKind::of(source.kind()).unwrap();
        for target in CastKind::ALL {
            lines.push(format!("{} -> {}: {}", from, target, cast(source, target)));
        }
    }
    lines.join("\n")
}

#[test]
fn cast_table() {
    insta::assert_snapshot!(render_table(&samples()), @r#"
    Int -> Int: -191
    Int -> Double: -191
    Int -> Char: 'A'
    Int -> String: "-191"
    Int -> Bits8: 65
    Int -> Bits16: 65345
    Int -> Bits32: 4294967105
    Int -> Bits64: 18446744073709551425
    Int -> Integer: -191
    Double -> Int: 66
    Double -> Double: 66.75
    Double -> Char: 'B'
    Double -> String: "66.750000"
    Double -> Bits8: 66
    Double -> Bits16: 66
    Double -> Bits32: 66
    Double -> Bits64: 66
    Double -> Integer: 66
    Char -> Int: 122
    Char -> Double: 122
    Char -> Char: 'z'
    Char -> String: "z"
    Char -> Bits8: 122
    Char -> Bits16: 122
    Char -> Bits32: 122
    Char -> Bits64: 122
    Char -> Integer: 122
    String -> Int: 300
    String -> Double: 300
    String -> Char: ' '
    String -> String: " 300xyz"
    String -> Bits8: 44
    String -> Bits16: 300
    String -> Bits32: 300
    String -> Bits64: 300
    String -> Integer: 0
    Integer -> Int: 4294967361
    Integer -> Double: 4294967361
    Integer -> Char: 'A'
    Integer -> String: "4294967361"
    Integer -> Bits8: 65
    Integer -> Bits16: 65
    Integer -> Bits32: 65
    Integer -> Bits64: 4294967361
    Integer -> Integer: 4294967361
    "#);
}

#[test]
fn every_cast_allocates_exactly_one_value() {
    tracked(|| {
        let sources = samples();
        let before = support::stats().allocs();
        for source in &sources {
            for target in CastKind::ALL {
                drop(cast(source, target));
            }
        }
        let after = support::stats().allocs();
        assert_eq!(after - before, (sources.len() * CastKind::ALL.len()) as u64);
        assert!(sources.iter().all(Value::is_unique));

        drop(sources);
        assert_no_leaks();
    });
}

#[test]
fn named_casts_agree_with_the_generic_cast() {
    let sources = samples();
    for (source_kind, target, function) in NAMED_CASTS {
        let Some(source) = sources.iter().find(|v| CastKind::of(v.kind()) == Some(*source_kind))
        else {
            continue;
        };
        assert_eq!(
            function(source).to_string(),
            cast(source, *target).to_string(),
            "{source_kind} -> {target}"
        );
    }
}

#[test]
fn int_string_round_trip_over_the_range() {
    let mut n = i64::MIN;
    let step = i64::MAX / 997;
    loop {
        let text = cast_int_to_string(&make_int(n));
        assert_eq!(cast_string_to_int(&text).as_int(), Some(n));
        match n.checked_add(step) {
            Some(next) => n = next,
            None => break,
        }
    }
    let text = cast_int_to_string(&make_int(i64::MAX));
    assert_eq!(cast_string_to_int(&text).as_int(), Some(i64::MAX));
}
