//! Property tests for configuration lookups

use nautodog_core::config::ConfigManager;
use proptest::prelude::*;
use serde_yaml::Value;

/// Strategy for mapping keys that YAML reads as plain strings
fn key_strategy() -> impl Strategy<Value = String> {
    "[a-z][a-z0-9_]{0,8}".prop_filter("not a YAML keyword", |k| {
        !matches!(k.as_str(), "true" | "false" | "null")
    })
}

proptest! {
    /// Property: a value stored under a dotted path is found under that path
    #[test]
    fn nested_value_is_found(
        keys in prop::collection::vec(key_strategy(), 1..5),
        value in "[a-zA-Z0-9]{1,16}",
    ) {
        let mut yaml = String::new();
        for (depth, key) in keys.iter().enumerate() {
            yaml.push_str(&"  ".repeat(depth));
            yaml.push_str(key);
            yaml.push(':');
            if depth + 1 == keys.len() {
                yaml.push_str(&format!(" \"{value}\""));
            }
            yaml.push('\n');
        }
        let config = ConfigManager::from_yaml_str(&yaml).unwrap();

        prop_assert_eq!(config.get(&keys.join(".")).unwrap(), Value::from(value));
        prop_assert!(config.missing_keys().is_empty());
    }

    /// Property: sequence indices address list items
    #[test]
    fn sequence_index_resolves(items in prop::collection::vec(0i64..1000, 1..10), pick in any::<prop::sample::Index>()) {
        let index = pick.index(items.len());
        let yaml = format!("items: [{}]\n", items.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "));
        let config = ConfigManager::from_yaml_str(&yaml).unwrap();

        prop_assert_eq!(config.get(&format!("items.{index}")).unwrap(), Value::from(items[index]));
        let out_of_range = format!("items.{}", items.len());
        prop_assert!(config.get(&out_of_range).is_err());
    }

    /// Property: every failed lookup is counted
    #[test]
    fn misses_are_counted(attempts in 1u32..6, key in "[a-z]{1,8}") {
        let config = ConfigManager::from_yaml_str("present: 1\n").unwrap();
        let path = format!("absent.{key}");
        for _ in 0..attempts {
            let _ = config.get(&path);
        }
        let missing = config.missing_keys();
        prop_assert_eq!(missing.len(), 1);
        prop_assert_eq!(&missing[0].path, &path);
        prop_assert_eq!(missing[0].attempts, attempts);
    }
}
