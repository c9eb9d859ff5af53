use jml::predicate::ComparisonOp;
use jml::{Element, EvaluateOptions, QueryResult, Tree, evaluate};
use proptest::prelude::*;

fn numbered(values: &[i64]) -> Tree {
    let mut list = Element::new("list");
    for value in values {
        list = list.with_child(Element::new("item").with_attribute("n", value.to_string()));
    }
    Tree::new(list)
}

fn name_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9]{0,6}"
}

// Property: ordering operators on integers agree with integer ordering, whatever the digit count.
proptest! {
    #[test]
    fn prop_numeric_ordering(a in -100_000i64..100_000, b in -100_000i64..100_000) {
        let (l, r) = (a.to_string(), b.to_string());
        prop_assert_eq!(ComparisonOp::Lt.compare(&l, &r), a < b);
        prop_assert_eq!(ComparisonOp::Le.compare(&l, &r), a <= b);
        prop_assert_eq!(ComparisonOp::Gt.compare(&l, &r), a > b);
        prop_assert_eq!(ComparisonOp::Ge.compare(&l, &r), a >= b);
    }

    #[test]
    fn prop_predicate_filter_matches_manual_filter(values in prop::collection::vec(-1_000i64..1_000, 0..20), pivot in -1_000i64..1_000) {
        let tree = numbered(&values);
        let results = evaluate(&format!("/item[@n >= {pivot}]/@n"), &tree, &EvaluateOptions::default()).unwrap();
        let expected: Vec<QueryResult> = values.iter().filter(|v| **v >= pivot).map(|v| QueryResult::Value(v.to_string())).collect();
        prop_assert_eq!(results, expected);
    }

    #[test]
    fn prop_empty_path_is_identity(root in name_strategy(), children in prop::collection::vec(name_strategy(), 0..8)) {
        let mut element = Element::new(root);
        for child in children {
            element = element.with_child(Element::new(child).with_text("t"));
        }
        let tree = Tree::new(element);
        let results = evaluate("", &tree, &EvaluateOptions::default()).unwrap();
        prop_assert_eq!(results, vec![QueryResult::Tree(tree)]);
    }

    #[test]
    fn prop_positional_index_picks_nth(count in 1usize..12, index in 1usize..16) {
        let values: Vec<i64> = (0..count as i64).collect();
        let tree = numbered(&values);
        let results = evaluate(&format!("//item[{index}]/@n"), &tree, &EvaluateOptions::default()).unwrap();
        if index <= count {
            prop_assert_eq!(results, vec![QueryResult::Value((index - 1).to_string())]);
        } else {
            prop_assert!(results.is_empty());
        }
    }
}
