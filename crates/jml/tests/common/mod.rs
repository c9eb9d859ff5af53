#![allow(dead_code)]

use jml::{EvaluateOptions, QueryResult, Tree};
use serde_json::json;

pub const NS1: &str = "http://example.com/ns/1";
pub const NS2: &str = "http://example.com/ns/2";
pub const OTHER: &str = "http://example.com/2";

fn el(name: &str, attributes: serde_json::Value, elements: Vec<serde_json::Value>) -> serde_json::Value {
    let mut element = json!({"type": "element", "name": name});
    if attributes.as_object().is_some_and(|a| !a.is_empty()) {
        element["attributes"] = attributes;
    }
    if !elements.is_empty() {
        element["elements"] = serde_json::Value::Array(elements);
    }
    element
}

fn leaf(name: &str, text: &str) -> serde_json::Value {
    el(name, json!({}), vec![json!({"type": "text", "text": text})])
}

fn address(street: &str, number: &str, city: &str) -> serde_json::Value {
    el(
        "address",
        json!({"xmlns": OTHER}),
        vec![leaf("street", street), leaf("ns2:number", number), leaf("ns2:city", city)],
    )
}

/// ```xml
/// <root xmlns:ns1="http://example.com/ns/1" xmlns:ns2="http://example.com/ns/2">
///   <planets><inner>Earth</inner><inner>Mars</inner></planets>
///   <ns1:persons xmlns="http://example.com/ns/1">
///     <person birth="1946-09-05">
///       <ns1:name><ns1:first>Freddie</ns1:first><ns1:last>Mercury</ns1:last></ns1:name>
///       <address xmlns="http://example.com/2">
///         <street>Fake street</street><ns2:number>123</ns2:number><ns2:city>London</ns2:city>
///       </address>
///     </person>
///     <ns1:person birth="1947-07-19">
///       <ns1:name><first>Brian</first><last>May</last></ns1:name>
///     </ns1:person>
///   </ns1:persons>
///   <ns2:places xmlns="http://example.com/ns/1">
///     <ns2:place>
///       <ns2:name>Last address</ns2:name>
///       <address xmlns="http://example.com/2">
///         <street>Another street</street><ns2:number>4712</ns2:number><ns2:city>Brighton</ns2:city>
///       </address>
///     </ns2:place>
///   </ns2:places>
/// </root>
/// ```
pub fn document_json() -> serde_json::Value {
    let planets = el("planets", json!({}), vec![leaf("inner", "Earth"), leaf("inner", "Mars")]);
    let freddie = el(
        "person",
        json!({"birth": "1946-09-05"}),
        vec![
            el("ns1:name", json!({}), vec![leaf("ns1:first", "Freddie"), leaf("ns1:last", "Mercury")]),
            address("Fake street", "123", "London"),
        ],
    );
    let brian = el(
        "ns1:person",
        json!({"birth": "1947-07-19"}),
        vec![el("ns1:name", json!({}), vec![leaf("first", "Brian"), leaf("last", "May")])],
    );
    let persons = el("ns1:persons", json!({"xmlns": NS1}), vec![freddie, brian]);
    let places = el(
        "ns2:places",
        json!({"xmlns": NS1}),
        vec![el(
            "ns2:place",
            json!({}),
            vec![leaf("ns2:name", "Last address"), address("Another street", "4712", "Brighton")],
        )],
    );
    json!({
        "elements": [el("root", json!({"xmlns:ns1": NS1, "xmlns:ns2": NS2}), vec![planets, persons, places])]
    })
}

pub fn document() -> Tree {
    Tree::from_value(document_json()).expect("fixture document")
}

/// `<outer><inner>some text</inner></outer>`
pub fn simple() -> Tree {
    Tree::from_value(json!({"elements": [el("outer", json!({}), vec![leaf("inner", "some text")])]})).expect("simple")
}

pub fn ns_options() -> EvaluateOptions {
    EvaluateOptions::new().with_namespace("ns1", NS1).with_namespace("ns2", NS2)
}

pub fn values(results: &[QueryResult]) -> Vec<&str> {
    results.iter().map(|r| r.as_value().expect("value result")).collect()
}

pub fn names(results: &[QueryResult]) -> Vec<&str> {
    results.iter().map(|r| r.element().expect("tree result").name.as_str()).collect()
}
