// Property tests for size parsing and the square policy
use proptest::prelude::*;
use serde_json::json;

use iconforge_core::{normalize_icon, parse_size, resolve_icons, Dimension, RawIconSpec, SizeToken};

fn raw(value: serde_json::Value) -> RawIconSpec {
    serde_json::from_value(value).unwrap()
}

proptest! {
    #[test]
    fn dimensions_string_parses_both_axes(w in 1u32..10_000, h in 1u32..10_000) {
        let parsed = parse_size(&SizeToken::Text(format!("{}x{}", w, h)));
        prop_assert_eq!(parsed.width, Some(w as i64));
        prop_assert_eq!(parsed.height, Some(h as i64));
    }

    #[test]
    fn bare_integer_is_square(n in 1u32..10_000) {
        let from_text = parse_size(&SizeToken::Text(n.to_string()));
        let from_number = parse_size(&SizeToken::Number(n as f64));
        prop_assert_eq!(from_text, from_number);
        prop_assert_eq!(from_text.width, from_text.height);
        prop_assert_eq!(from_text.width, Some(n as i64));
    }

    #[test]
    fn squared_unless_aspect_ratio_preserved(
        sizes in prop::collection::vec((1u32..4096, 1u32..4096), 1..8),
        preserve in any::<bool>(),
    ) {
        let declared: Vec<String> = sizes.iter().map(|(w, h)| format!("{}x{}", w, h)).collect();
        let icon = normalize_icon(raw(json!({
            "src": "icon.png",
            "sizes": declared,
            "preserve_aspect_ratio": preserve
        }))).unwrap();

        prop_assert_eq!(icon.sizes.len(), sizes.len());
        for (dimension, (w, h)) in icon.sizes.iter().zip(&sizes) {
            let expected = if preserve { Dimension::new(*w, *h) } else { Dimension::square(*w) };
            prop_assert_eq!(*dimension, expected);
        }
    }

    #[test]
    fn resolve_strips_icon_keys(key in prop::sample::select(vec!["icon", "icons"]), n in 1u32..512) {
        let mut config = serde_json::Map::new();
        config.insert(key.to_string(), json!({"src": "a.png", "size": n}));
        config.insert("short_name".to_string(), json!("PWA"));

        let resolved = resolve_icons(config).unwrap();
        prop_assert_eq!(resolved.icons.len(), 1);
        prop_assert!(!resolved.residual.contains_key(key));

        let again = resolve_icons(resolved.residual.clone()).unwrap();
        prop_assert!(again.icons.is_empty());
    }
}
