// THEORY:
// The `mapping` module is the serialization boundary for the token→color map.
// The export format is deliberately the simplest thing that round-trips: a flat
// JSON object from token string to `#rrggbb` string. A mapping exported from one
// session and imported into another reproduces the same colors for every token
// present at export time, which is what makes random-mode palettes shareable.

use crate::core_modules::palette::ColorMap;

/// Serializes the token→color mapping as a flat, pretty-printed JSON object.
pub fn export_color_map(color_map: &ColorMap) -> serde_json::Result<String> {
    serde_json::to_string_pretty(color_map)
}

/// Parses a mapping produced by `export_color_map` and merges it into
/// `color_map`, overwriting colors for tokens present in both.
pub fn import_color_map(json: &str, color_map: &mut ColorMap) -> serde_json::Result<()> {
    let imported: ColorMap = serde_json::from_str(json)?;
    color_map.extend(imported);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn export_then_import_round_trips_every_token() {
        let mut original = ColorMap::new();
        original.insert("alpha".to_string(), "#3264c8".to_string());
        original.insert("beta".to_string(), "#c86432".to_string());
        original.insert("with \"quotes\"".to_string(), "#646464".to_string());

        let json = export_color_map(&original).expect("export succeeds");
        let mut restored = ColorMap::new();
        import_color_map(&json, &mut restored).expect("import succeeds");
        assert_eq!(restored, original);
    }

    #[test]
    fn import_merges_into_the_existing_map() {
        let mut map = ColorMap::new();
        map.insert("kept".to_string(), "#111111".to_string());
        map.insert("overwritten".to_string(), "#222222".to_string());

        import_color_map(
            r##"{"overwritten": "#333333", "added": "#444444"}"##,
            &mut map,
        )
        .expect("import succeeds");

        assert_eq!(map["kept"], "#111111");
        assert_eq!(map["overwritten"], "#333333");
        assert_eq!(map["added"], "#444444");
    }

    #[test]
    fn malformed_json_surfaces_an_error_without_touching_the_map() {
        let mut map = ColorMap::new();
        map.insert("kept".to_string(), "#111111".to_string());
        assert!(import_color_map("not json", &mut map).is_err());
        assert_eq!(map.len(), 1);
    }
}
