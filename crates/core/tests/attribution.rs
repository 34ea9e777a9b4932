use build_stats_core::analysis::{
    attribute_objects, attribute_target, classify_final_symbols, mangled_marker,
    split_namespaces, target_size, SymbolFilter, SIMD_NAMESPACES,
};
use build_stats_core::model::Symbol;

fn sym(name: &str, kind: char, size: u64) -> Symbol {
    Symbol::new(name, kind).with_address(0x1000).with_size(size)
}

fn final_binary() -> Vec<Symbol> {
    vec![sym("A", 't', 10), sym("B", 'w', 4)]
}

#[test]
fn first_object_gets_credit_for_a_shared_weak_symbol() {
    let used = classify_final_symbols(&final_binary()).used;
    let object1 = vec![sym("A", 'T', 10), sym("B", 'w', 4)];
    let object2 = vec![sym("B", 'w', 4)];

    let stats =
        attribute_objects(&used, [("object1.o", &object1[..]), ("object2.o", &object2[..])]);
    assert_eq!(stats[0].name, "object1.o");
    assert_eq!(stats[0].total_size(), 14);
    assert_eq!(stats[1].total_size(), 0);
    assert!(stats[1].is_empty());
    assert!(stats.iter().all(|s| s.counts_toward_partition));
}

#[test]
fn swapping_the_order_swaps_the_weak_credit() {
    let used = classify_final_symbols(&final_binary()).used;
    let object1 = vec![sym("A", 'T', 10), sym("B", 'w', 4)];
    let object2 = vec![sym("B", 'w', 4)];

    let stats =
        attribute_objects(&used, [("object2.o", &object2[..]), ("object1.o", &object1[..])]);
    assert_eq!(stats[0].total_size(), 4);
    assert_eq!(stats[0].size_of('w'), 4);
    assert_eq!(stats[1].total_size(), 10);
    assert_eq!(stats[1].size_of('t'), 10);
    assert_eq!(stats[1].size_of('w'), 0);
}

#[test]
fn local_symbols_are_consumed_but_globals_are_not() {
    let used = classify_final_symbols(&[sym("helper", 't', 8), sym("Global", 'D', 16)]).used;
    let mut filter = SymbolFilter::new(&used);

    let first = filter.attribute(&[sym("helper", 't', 8), sym("Global", 'D', 16)]);
    assert_eq!(first.get(&'t'), Some(&8));
    assert_eq!(first.get(&'d'), Some(&16));
    assert!(!filter.contains("helper"));
    assert!(filter.contains("Global"));

    let second = filter.attribute(&[sym("helper", 't', 8), sym("Global", 'D', 16)]);
    assert_eq!(second.get(&'t'), None);
    assert_eq!(second.get(&'d'), Some(&16));
}

#[test]
fn duplicate_locals_within_one_object_count_once() {
    let used = classify_final_symbols(&[sym("kTable", 'r', 64)]).used;
    let mut filter = SymbolFilter::new(&used);
    let sizes = filter.attribute(&[sym("kTable", 'r', 64), sym("kTable", 'r', 64)]);
    assert_eq!(sizes.get(&'r'), Some(&64));
    assert!(filter.is_empty());
}

#[test]
fn symbols_missing_from_the_binary_are_not_credited() {
    let used = classify_final_symbols(&[sym("Kept", 'T', 4)]).used;
    let stats = attribute_objects(&used, [("a.o", &[sym("Dropped", 'T', 100)][..])]);
    assert!(stats[0].is_empty());
}

#[test]
fn unsized_and_zero_sized_symbols_are_skipped() {
    let symbols = vec![Symbol::new("undef", 'U'), sym("empty", 'T', 0), sym("real", 'T', 3)];
    let classification = classify_final_symbols(&symbols);
    assert_eq!(classification.used.len(), 1);
    assert!(classification.used.contains("real"));
    assert_eq!(target_size(&symbols).get(&'t'), Some(&3));
}

#[test]
fn imported_symbols_never_warn_or_count() {
    let symbols = vec![Symbol::new("I", 'U'), sym("A", 't', 10)];
    let classification = classify_final_symbols(&symbols);
    assert!(!classification.used.contains("I"));
    assert!(classification.warnings.is_empty());
}

#[test]
fn absolute_symbols_are_ignored_without_warning() {
    let classification = classify_final_symbols(&[sym("__abs", 'A', 4)]);
    assert!(classification.used.is_empty());
    assert!(classification.warnings.is_empty());
}

#[test]
fn unknown_kinds_are_collected_as_warnings() {
    let classification = classify_final_symbols(&[sym("ifunc", 'i', 12), sym("A", 't', 1)]);
    assert_eq!(classification.warnings.len(), 1);
    assert_eq!(classification.warnings[0].to_string(), "Unknown: i ifunc");
    assert!(!classification.used.contains("ifunc"));
}

#[test]
fn final_binary_totals_ignore_the_filter() {
    let symbols = vec![sym("A", 'T', 10), sym("a", 't', 5), sym("bss", 'B', 7), sym("x", 'i', 2)];
    let sizes = target_size(&symbols);
    assert_eq!(sizes.get(&'t'), Some(&15));
    assert_eq!(sizes.get(&'b'), Some(&7));
    assert_eq!(sizes.get(&'i'), Some(&2));
}

#[test]
fn namespace_marker_is_length_prefixed() {
    assert_eq!(mangled_marker("N_AVX2"), "6N_AVX2");
    assert_eq!(mangled_marker("FOO"), "3FOO");
}

#[test]
fn namespaces_are_sliced_from_the_final_binary() {
    let symbols = vec![
        sym("_ZN3jxl6N_AVX27ConvolveEv", 'T', 100),
        sym("_ZN3jxl6N_AVX25TableE", 'r', 20),
        sym("_ZN3jxl6N_SSE47ConvolveEv", 'T', 80),
        sym("_ZN3jxl6DecodeEv", 'T', 500),
        Symbol::new("_ZN3jxl8N_SCALAR7ExternEv", 'U'),
    ];
    let slices = split_namespaces(&symbols, &SIMD_NAMESPACES);
    let names: Vec<&str> = slices.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["\\--> N_SSE4", "\\--> N_AVX2"]);
    assert_eq!(slices[1].size_of('t'), 100);
    assert_eq!(slices[1].size_of('r'), 20);
    assert!(slices.iter().all(|s| !s.counts_toward_partition));
}

#[test]
fn attribute_target_collects_every_step() {
    let binary = vec![sym("A", 't', 10), sym("B", 'w', 4), sym("_ZN6N_NEON1fEv", 'T', 6), sym("?", 'i', 1)];
    let object1 = vec![sym("A", 'T', 10), sym("B", 'w', 4)];
    let object2 = vec![sym("_ZN6N_NEON1fEv", 'T', 6)];

    let attribution = attribute_target(
        "tools/cjxl",
        &binary,
        [("object1.o", &object1[..]), ("object2.o", &object2[..])],
        &["N_NEON"],
    );
    assert_eq!(attribution.binary.name, "tools/cjxl");
    assert!(!attribution.binary.counts_toward_partition);
    assert_eq!(attribution.binary.total_size(), 21);
    assert_eq!(attribution.namespaces.len(), 1);
    assert_eq!(attribution.objects[0].total_size(), 14);
    assert_eq!(attribution.objects[1].total_size(), 6);
    assert_eq!(attribution.warnings.len(), 1);
}
