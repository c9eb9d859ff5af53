use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use jml::parser::parse_path;
use jml::{Element, EvaluateOptions, Tree, compile_path, evaluate};
use std::hint::black_box;

fn create_large_document() -> Tree {
    let mut catalog = Element::new("ns:catalog").with_attribute("xmlns:ns", "urn:catalog");
    for i in 0..100 {
        let mut section = Element::new("ns:section").with_attribute("id", format!("section-{i}"));
        for j in 0..20 {
            let entry = Element::new("entry")
                .with_attribute("index", j.to_string())
                .with_child(Element::new("ns:title").with_text(format!("Entry {j} in section {i}")))
                .with_child(Element::new("price").with_text(format!("{}.{:02}", j * 3, i % 100)));
            section = section.with_child(entry);
        }
        catalog = catalog.with_child(section);
    }
    Tree::new(Element::new("root").with_child(catalog))
}

const PATHS: &[(&str, &str)] = &[
    ("descendant", "//entry"),
    ("qualified", "/c:catalog/c:section/entry/c:title/text()"),
    ("attribute_predicate", r#"//c:section[@id="section-50"]/entry/@index"#),
    ("numeric_predicate", "//entry[./price > 40]/c:title/text()"),
    ("positional", "//entry[1000]/@index"),
    ("nested_predicate", r#"//c:section[.//c:title/text()="Entry 3 in section 7"]/@id"#),
];

fn benchmark_parse(c: &mut Criterion) {
    let mut group = c.benchmark_group("parse");
    for (name, path) in PATHS {
        group.bench_with_input(BenchmarkId::from_parameter(name), path, |b, path| {
            b.iter(|| parse_path(black_box(path)).unwrap());
        });
    }
    group.finish();
}

fn benchmark_evaluate(c: &mut Criterion) {
    let document = create_large_document();
    let options = EvaluateOptions::new().with_namespace("c", "urn:catalog");
    let mut group = c.benchmark_group("evaluate");
    for (name, path) in PATHS {
        group.bench_with_input(BenchmarkId::new("uncompiled", name), path, |b, path| {
            b.iter(|| evaluate(black_box(path), black_box(&document), &options).unwrap());
        });
        let compiled = compile_path(path).unwrap();
        group.bench_with_input(BenchmarkId::new("compiled", name), &compiled, |b, compiled| {
            b.iter(|| compiled.evaluate(black_box(&document), &options).unwrap());
        });
    }
    group.finish();
}

criterion_group!(benches, benchmark_parse, benchmark_evaluate);
criterion_main!(benches);
