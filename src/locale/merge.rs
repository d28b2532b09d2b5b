use super::Mapping;

/// Overlay `overlay` onto `base`, key by key.
///
/// Shallow: a nested object or array in `overlay` replaces the base value
/// wholesale. Keys keep the base order, new keys are appended.
pub fn merge(base: &Mapping, overlay: &Mapping) -> Mapping {
    let mut merged = base.clone();
    for (key, value) in overlay {
        merged.insert(key.clone(), value.clone());
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn mapping(value: Value) -> Mapping {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected object"),
        }
    }

    #[test]
    fn test_override_wins() {
        let dict = mapping(json!({"title": "Home"}));
        let page = mapping(json!({"title": "Custom"}));
        assert_eq!(merge(&dict, &page), mapping(json!({"title": "Custom"})));
    }

    #[test]
    fn test_dictionary_keys_kept() {
        let dict = mapping(json!({"title": "Home", "nav": {"home": "Home"}, "footer": "(c)"}));
        let page = mapping(json!({"title": "Blog", "author": "Sam"}));
        let merged = merge(&dict, &page);

        assert_eq!(merged["title"], json!("Blog"));
        assert_eq!(merged["author"], json!("Sam"));
        assert_eq!(merged["nav"], dict["nav"]);
        assert_eq!(merged["footer"], dict["footer"]);
        assert_eq!(merged.len(), 4);
    }

    #[test]
    fn test_nested_values_replaced_not_merged() {
        let dict = mapping(json!({"nav": {"home": "Home", "blog": "Blog"}}));
        let page = mapping(json!({"nav": {"home": "Start"}}));
        let merged = merge(&dict, &page);
        assert_eq!(merged["nav"], json!({"home": "Start"}));
    }

    #[test]
    fn test_empty_overlay_is_identity() {
        let dict = mapping(json!({"a": 1, "b": [1, 2]}));
        assert_eq!(merge(&dict, &Mapping::new()), dict);
    }

    #[test]
    fn test_merge_idempotent() {
        let dict = mapping(json!({"a": 1, "b": 2}));
        let page = mapping(json!({"b": 3, "c": 4}));
        let once = merge(&dict, &page);
        assert_eq!(merge(&once, &Mapping::new()), once);
        assert_eq!(merge(&once, &page), once);
    }

    #[test]
    fn test_key_order_preserved() {
        let dict = mapping(json!({"z": 1, "a": 2}));
        let page = mapping(json!({"m": 3, "z": 4}));
        let keys: Vec<_> = merge(&dict, &page).keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }
}
