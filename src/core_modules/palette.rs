// THEORY:
// The `palette` module is the assignment layer sitting on top of the dumb `color`
// leaf. Its job is to answer exactly one question: "what color does this token
// display as?" — and to answer it the same way for every occurrence of the token
// within a run.
//
// Key architectural principles:
// 1.  **Owned Accumulator**: The token→color mapping is an explicitly owned
//     `ColorMap` passed `&mut` into pure functions. There is no ambient or global
//     state; the caller (normally `MosaicPipeline`) decides how long the map lives
//     and when it is cleared.
// 2.  **Two Assignment Strategies**: `Standard` mode derives the color from a
//     32-bit rolling hash of the token, so the same token always maps to the same
//     color, across runs and across machines. `Random` mode rolls three uniform
//     channels and relies on memoization in the map for stability within a run.
// 3.  **Channel Floor**: Both strategies floor every channel at 50 so that no
//     token lands on a near-black color that would disappear against dark trend
//     highlights.

use crate::core_modules::color::color::{Channel, HexColor};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The lowest value any channel of an assigned color may take.
pub const CHANNEL_FLOOR: Channel = 50;

/// The owned token→color accumulator. One entry per distinct token.
pub type ColorMap = HashMap<String, HexColor>;

/// How colors are chosen for tokens that are not yet in the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ColorMode {
    /// Deterministic: a pure function of the token string.
    Standard,
    /// Uniform random channels, memoized per token for the life of the map.
    Random,
}

impl ColorMode {
    /// `"standard"` selects the deterministic hash; every other tag is random.
    pub fn from_tag(tag: &str) -> Self {
        if tag == "standard" {
            ColorMode::Standard
        } else {
            ColorMode::Random
        }
    }
}

/// 32-bit rolling hash over the token's code points:
/// `h = (h << 5) - h + codepoint (mod 2^32)`.
pub fn hash_string(s: &str) -> u32 {
    let mut h: u32 = 0;
    for c in s.chars() {
        h = (h << 5).wrapping_sub(h).wrapping_add(c as u32);
    }
    h
}

/// Maps a hash to `#rrggbb` by taking bits 16-23, 8-15 and 0-7 as the three
/// channels, floored at `CHANNEL_FLOOR`.
pub fn hash_to_color(h: u32) -> HexColor {
    let red = ((h & 0xFF0000) >> 16) as Channel;
    let green = ((h & 0x00FF00) >> 8) as Channel;
    let blue = (h & 0x0000FF) as Channel;
    format!(
        "#{:02x}{:02x}{:02x}",
        red.max(CHANNEL_FLOOR),
        green.max(CHANNEL_FLOOR),
        blue.max(CHANNEL_FLOOR)
    )
}

/// Three independent uniform channels in `[CHANNEL_FLOOR, 255]`.
pub fn random_color() -> HexColor {
    let mut rng = rand::thread_rng();
    format!(
        "#{:02x}{:02x}{:02x}",
        rng.gen_range(CHANNEL_FLOOR..=255),
        rng.gen_range(CHANNEL_FLOOR..=255),
        rng.gen_range(CHANNEL_FLOOR..=255)
    )
}

/// Incremental contract: returns the token's color, assigning and memoizing one
/// if the map does not hold the token yet.
pub fn get_or_assign_color(token: &str, mode: ColorMode, color_map: &mut ColorMap) -> HexColor {
    if let Some(color) = color_map.get(token) {
        return color.clone();
    }
    let color = match mode {
        ColorMode::Standard => hash_to_color(hash_string(token)),
        ColorMode::Random => random_color(),
    };
    color_map.insert(token.to_string(), color.clone());
    color
}

/// Bulk contract: fills the map for every distinct token in one pass. Tokens
/// already present are skipped, so previously assigned random colors survive
/// incremental calls. Faster than calling `get_or_assign_color` per occurrence
/// when the input has millions of tokens.
pub fn fill_color_map(tokens: &[String], mode: ColorMode, color_map: &mut ColorMap) {
    match mode {
        ColorMode::Standard => {
            for token in tokens {
                if !color_map.contains_key(token) {
                    color_map.insert(token.clone(), hash_to_color(hash_string(token)));
                }
            }
        }
        ColorMode::Random => {
            for token in tokens {
                if !color_map.contains_key(token) {
                    color_map.insert(token.clone(), random_color());
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::color::color::Rgb;

    #[test]
    fn standard_color_is_a_pure_function_of_the_token() {
        let mut first = ColorMap::new();
        let mut second = ColorMap::new();
        let a = get_or_assign_color("ferris", ColorMode::Standard, &mut first);
        let b = get_or_assign_color("ferris", ColorMode::Standard, &mut second);
        assert_eq!(a, b);
    }

    #[test]
    fn every_assigned_channel_respects_the_floor() {
        let mut map = ColorMap::new();
        for (i, mode) in [ColorMode::Standard, ColorMode::Random].iter().enumerate() {
            for token in ["a", "zz", "the quick brown fox", "0", "\n"] {
                let hex = get_or_assign_color(&format!("{token}{i}"), *mode, &mut map);
                let rgb = Rgb::from_hex(&hex).expect("assigned colors are well-formed");
                assert!(rgb.red >= CHANNEL_FLOOR);
                assert!(rgb.green >= CHANNEL_FLOOR);
                assert!(rgb.blue >= CHANNEL_FLOOR);
            }
        }
    }

    #[test]
    fn random_colors_are_memoized_within_a_map() {
        let mut map = ColorMap::new();
        let first = get_or_assign_color("token", ColorMode::Random, &mut map);
        let second = get_or_assign_color("token", ColorMode::Random, &mut map);
        assert_eq!(first, second);
    }

    #[test]
    fn bulk_fill_assigns_one_color_per_distinct_token() {
        let tokens: Vec<String> = ["a", "b", "a", "c", "b"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let mut map = ColorMap::new();
        fill_color_map(&tokens, ColorMode::Standard, &mut map);
        assert_eq!(map.len(), 3);
        assert_eq!(map["a"], hash_to_color(hash_string("a")));
    }

    #[test]
    fn bulk_fill_preserves_existing_entries() {
        let tokens: Vec<String> = vec!["kept".to_string(), "new".to_string()];
        let mut map = ColorMap::new();
        map.insert("kept".to_string(), "#123456".to_string());
        fill_color_map(&tokens, ColorMode::Random, &mut map);
        assert_eq!(map["kept"], "#123456");
        assert!(map.contains_key("new"));
    }

    #[test]
    fn mode_tags_parse_like_the_desktop_app() {
        assert_eq!(ColorMode::from_tag("standard"), ColorMode::Standard);
        assert_eq!(ColorMode::from_tag("random"), ColorMode::Random);
        assert_eq!(ColorMode::from_tag("anything-else"), ColorMode::Random);
    }
}
