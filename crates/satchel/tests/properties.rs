use proptest::prelude::*;
use satchel::{Backend, ManualClock, MemoryBackend, Options, Satchel};
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

fn satchel() -> (Satchel, Arc<MemoryBackend>, ManualClock) {
    let backend = Arc::new(MemoryBackend::new());
    let clock = ManualClock::new(1_000_000);
    let satchel = Satchel::builder().backend(Arc::clone(&backend)).clock(clock.clone()).build();
    (satchel, backend, clock)
}

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::from),
        any::<i64>().prop_map(Value::from),
        "\\PC{0,16}".prop_map(Value::from),
        "[\u{D7F0}-\u{D7FF}\u{E000}-\u{E00F}\u{10FFF0}-\u{10FFFF}a-z]{1,8}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|map| Value::Object(map.into_iter().collect())),
        ]
    })
}

fn options() -> impl Strategy<Value = Options> {
    (any::<bool>(), prop::option::of(1_u64..10_000), prop::option::of(any::<i64>())).prop_map(
        |(encrypt, ttl_ms, secret)| {
            let mut options = Options::new().encrypt(encrypt);
            if let Some(ms) = ttl_ms {
                options = options.ttl(Duration::from_millis(ms));
            }
            if let Some(secret) = secret {
                options = options.secret(secret);
            }
            options
        },
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn any_value_round_trips(value in json_value(), options in options(), key in "\\PC{1,24}") {
        let (satchel, _, _) = satchel();
        prop_assert!(satchel.set(&key, &value, Some(&options)));
        prop_assert_eq!(satchel.get::<Value>(&key, Some(&options)), Some(value));
    }

    #[test]
    fn prefixes_never_leak(
        key in "[a-z]{1,8}",
        left in "[a-m]{1,4}:",
        right in "[n-z]{1,4}:",
        a in any::<i32>(),
        b in any::<i32>(),
    ) {
        let (satchel, backend, _) = satchel();
        let l = Options::new().prefix(left.clone());
        let r = Options::new().prefix(right);

        prop_assert!(satchel.set(&key, &a, Some(&l)));
        prop_assert!(satchel.set(&key, &b, Some(&r)));
        prop_assert_eq!(satchel.get::<i32>(&key, Some(&l)), Some(a));
        prop_assert_eq!(satchel.get::<i32>(&key, Some(&r)), Some(b));

        prop_assert!(satchel.clear(Some(&l)));
        prop_assert_eq!(satchel.get::<i32>(&key, Some(&l)), None);
        prop_assert_eq!(satchel.get::<i32>(&key, Some(&r)), Some(b));
        prop_assert!(backend.keys().unwrap().iter().all(|k| !k.starts_with(&left)));
    }

    #[test]
    fn entries_live_exactly_their_ttl(ttl_ms in 1_u64..100_000, value in any::<u32>()) {
        let (satchel, _, clock) = satchel();
        let options = Options::new().ttl(Duration::from_millis(ttl_ms));

        prop_assert!(satchel.set("k", &value, Some(&options)));
        clock.advance(Duration::from_millis(ttl_ms));
        prop_assert_eq!(satchel.get::<u32>("k", None), Some(value));
        clock.advance(Duration::from_millis(1));
        prop_assert_eq!(satchel.get::<u32>("k", None), None);
    }

    #[test]
    fn wrong_secret_never_panics(value in json_value(), stored in any::<i64>(), read in -300_i64..300) {
        let (satchel, _, _) = satchel();
        prop_assert!(satchel.set("k", &value, Some(&Options::new().encrypt(true).secret(stored))));

        let result = satchel.get::<Value>("k", Some(&Options::new().encrypt(true).secret(read)));
        prop_assert!(result.is_some());
        if stored == read {
            prop_assert_eq!(result, Some(value));
        }
    }
}

#[test]
fn plain_entries_survive_forced_flush() {
    let (satchel, backend, _) = satchel();
    for i in 0..10 {
        let options = if i % 2 == 0 { Options::new() } else { Options::new().ttl_secs(60) };
        assert!(satchel.set(&format!("k{i}"), &json!(i), Some(&options)));
    }

    assert!(satchel.flush(true, None));
    assert_eq!(backend.len(), 5);
}
