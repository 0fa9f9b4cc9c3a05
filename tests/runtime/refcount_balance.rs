#[path = "../support/mod.rs"]
mod support;

use refc::runtime::{ValueKind, make::*, new_reference, remove_reference};
use support::{assert_no_leaks, stats, tracked};

#[test]
fn n_values_and_m_extra_references_balance() {
    tracked(|| {
        let values = vec![
            make_int(1),
            make_double(2.0),
            make_char(b'c'),
            make_string("four"),
            make_bits8(5),
            make_bits16(6),
            make_bits32(7),
            make_bits64(8),
            make_integer_literal("9"),
            make_world(),
        ];
        let extra: Vec<_> = values
            .iter()
            .flat_map(|v| [new_reference(v), new_reference(v)])
            .collect();
        assert_eq!(stats().live(), values.len() as u64);

        for value in extra.into_iter().chain(values) {
            remove_reference(value);
        }
        assert_no_leaks();
        assert_eq!(stats().allocs(), 10);
    });
}

#[test]
fn nested_composites_release_everything() {
    tracked(|| {
        let mut inner = new_constructor(2, 1, Some("Just"));
        inner.fill_slot(0, make_string("payload")).unwrap();
        inner.fill_slot(1, make_array(3)).unwrap();

        let mut outer = make_array(2);
        outer.fill_slot(0, inner.clone()).unwrap();
        outer.fill_slot(1, inner).unwrap();

        let kinds = stats();
        assert_eq!(kinds.live_of(ValueKind::Array), 2);
        assert_eq!(kinds.live_of(ValueKind::Constructor), 1);

        remove_reference(outer);
        assert_no_leaks();
    });
}

#[test]
fn overwriting_an_array_slot_releases_the_old_element() {
    tracked(|| {
        let array = make_array(1);
        let elements = array.as_array().unwrap();
        elements.set(0, make_string("old")).unwrap();
        elements.set(0, make_string("new")).unwrap();

        assert_eq!(stats().live_of(ValueKind::String), 1);
        assert_eq!(elements.get(0).unwrap().as_str(), Some("new"));

        drop(array);
        assert_no_leaks();
    });
}

#[test]
fn leak_report_names_the_leaking_kind() {
    tracked(|| {
        let leaked = make_bits32(1);
        let report = stats().to_string();
        assert_eq!(
            report,
            "value allocs: 1  frees: 0  live: 1  potential leak: Bits32=1"
        );
        drop(leaked);
        assert_eq!(
            stats().to_string(),
            "value allocs: 1  frees: 1  live: 0  (no leaks detected)"
        );
    });
}
