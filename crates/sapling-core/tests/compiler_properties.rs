//! Properties of compiled statements that must hold for any intent.

use std::collections::HashSet;

use sapling_core::ast::{LogicalOperator, Predicate, QueryIntent};
use sapling_core::compiler::{compile, is_placeholder, RandomPlaceholders, SequentialPlaceholders};
use sapling_core::{Error, PlaceholderSource, SqlValue};

fn intents() -> Vec<QueryIntent> {
    vec![
        QueryIntent::read("users"),
        QueryIntent::read("users").select(["id", "email"]).limit(5),
        QueryIntent::find("users", "id", 7),
        QueryIntent::find_many("users", "id", [1, 2, 3, 4]),
        QueryIntent::read("users").filter(Predicate::and(vec![
            Predicate::like("email", "%@example.com"),
            Predicate::not(Predicate::between("age", 0, 17)),
            Predicate::or(vec![Predicate::eq("role", "admin"), Predicate::is_in("team", ["a", "b"])]),
        ])),
        QueryIntent::read("orders")
            .select(["customer_id"])
            .group_by(["customer_id"])
            .having(Predicate::gt("customer_id", 10))
            .order_by(Predicate::columns(["customer_id"]))
            .offset(3),
    ]
}

/// A source that keeps returning the same name a few times before moving on.
#[derive(Debug, Default)]
struct Stuttering(SequentialPlaceholders, std::sync::Mutex<Option<(String, u8)>>);

impl PlaceholderSource for Stuttering {
    fn next_name(&self) -> String {
        let mut last = self.1.lock().unwrap();
        match last.as_mut() {
            Some((name, repeats)) if *repeats < 3 => {
                *repeats += 1;
                name.clone()
            }
            _ => {
                let name = self.0.next_name();
                *last = Some((name.clone(), 0));
                name
            }
        }
    }
}

#[test]
fn test_every_placeholder_fragment_is_bound_and_every_value_is_used() {
    for intent in intents() {
        let stmt = compile(&intent, &RandomPlaceholders).unwrap();
        let placeholders: Vec<&String> = stmt.sql.iter().filter(|f| is_placeholder(f)).collect();

        assert_eq!(placeholders.len(), stmt.values.len(), "{intent:?}");
        for fragment in placeholders {
            assert!(stmt.is_bound(fragment));
        }
    }
}

#[test]
fn test_placeholder_names_are_unique_across_statements() {
    let source = RandomPlaceholders;
    let mut seen = HashSet::new();
    for _ in 0..50 {
        for intent in intents() {
            for name in compile(&intent, &source).unwrap().values.into_keys() {
                assert!(seen.insert(name), "placeholder reused");
            }
        }
    }
}

#[test]
fn test_colliding_names_are_regenerated() {
    let intent = QueryIntent::find_many("users", "id", [1, 2, 3]);
    let stmt = compile(&intent, &Stuttering::default()).unwrap();
    assert_eq!(stmt.values.len(), 3);
    assert_eq!(
        stmt.values.values().cloned().collect::<Vec<_>>(),
        vec![SqlValue::Int(1), SqlValue::Int(2), SqlValue::Int(3)]
    );
}

#[test]
fn test_compilation_is_deterministic_for_the_same_source_state() {
    for intent in intents() {
        let a = compile(&intent, &SequentialPlaceholders::new()).unwrap();
        let b = compile(&intent, &SequentialPlaceholders::new()).unwrap();
        assert_eq!(a, b);
    }
}

#[test]
fn test_hostile_values_never_reach_sql_text() {
    let payloads = ["'; DROP TABLE users; --", "1 OR 1=1", "\" OR \"\"=\"", "%' --"];
    for payload in payloads {
        let intent = QueryIntent::read("users").filter(Predicate::or(vec![
            Predicate::eq("name", payload),
            Predicate::like("email", payload),
            Predicate::is_in("role", [payload]),
        ]));
        let stmt = compile(&intent, &RandomPlaceholders).unwrap();
        for fragment in &stmt.sql {
            assert!(!fragment.contains(payload), "{payload} leaked into {fragment}");
        }
    }
}

#[test]
fn test_hostile_identifiers_are_rejected() {
    let names = ["users; DROP TABLE users", "users--", "1users", "", "a b", "a-b"];
    for name in names {
        assert!(matches!(
            compile(&QueryIntent::read(name), &RandomPlaceholders),
            Err(Error::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            compile(
                &QueryIntent::read("users").filter(Predicate::eq(name, 1)),
                &RandomPlaceholders
            ),
            Err(Error::InvalidIdentifier { .. })
        ));
        assert!(matches!(
            compile(
                &QueryIntent::read("users").filter(Predicate::logical(
                    name,
                    LogicalOperator::Like,
                    vec![Predicate::value("x")]
                )),
                &RandomPlaceholders
            ),
            Err(Error::InvalidIdentifier { .. })
        ));
    }
}
