// THEORY:
// The `color` module is the most fundamental unit of the mosaic system. It is a
// "dumb" data container for a single RGB color plus the small set of conversions
// and metrics every other layer is built on. Anything that decides *which* color a
// token gets belongs in the higher-level `palette` module; anything that groups
// colors belongs in `emphasis`.
//
// Key architectural principles:
// 1.  **Single Representation**: Colors travel through the system as `#rrggbb` hex
//     strings (the wire/export format) and are lifted into `Rgb` only at the point
//     where channel math is needed.
// 2.  **Total Functions**: Parsing a malformed hex string yields `None`, and a
//     distance involving a malformed color is infinite, so it can never fall inside
//     a similarity threshold. No input makes this module panic or return an error.
// 3.  **Euclidean Metric**: Color similarity everywhere in the system is straight
//     Euclidean distance in RGB space, normalized against the diagonal of the RGB
//     cube (black to white).

pub mod color {
    pub type Channel = u8;
    pub type HexColor = String;
    pub type Distance = f64;

    /// A "dumb" data container representing a single RGB color.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Rgb {
        /// The red channel value (0-255).
        pub red: Channel,
        /// The green channel value (0-255).
        pub green: Channel,
        /// The blue channel value (0-255).
        pub blue: Channel,
    }

    impl Rgb {
        /// Parses a `#rrggbb` (or bare `rrggbb`) string. Returns `None` for anything
        /// that is not exactly six hex digits.
        pub fn from_hex(hex: &str) -> Option<Rgb> {
            let hex = hex.strip_prefix('#').unwrap_or(hex);
            if hex.len() != 6 || !hex.is_ascii() {
                return None;
            }
            Some(Rgb {
                red: Channel::from_str_radix(&hex[0..2], 16).ok()?,
                green: Channel::from_str_radix(&hex[2..4], 16).ok()?,
                blue: Channel::from_str_radix(&hex[4..6], 16).ok()?,
            })
        }

        pub fn to_hex(&self) -> HexColor {
            format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
        }
    }

    /// Re-encodes fractional channel values (e.g. a bin average) as `#rrggbb`,
    /// rounding to the nearest integer and wrapping into the byte range.
    pub fn rgb_to_hex(red: f64, green: f64, blue: f64) -> HexColor {
        format!(
            "#{:02x}{:02x}{:02x}",
            (red.round() as i64 & 255) as Channel,
            (green.round() as i64 & 255) as Channel,
            (blue.round() as i64 & 255) as Channel,
        )
    }

    /// Euclidean distance between two hex colors in RGB space.
    /// A malformed color yields an infinite distance, so it never matches any
    /// similarity threshold.
    pub fn color_distance(a: &str, b: &str) -> Distance {
        match (Rgb::from_hex(a), Rgb::from_hex(b)) {
            (Some(a), Some(b)) => {
                let dr = a.red as f64 - b.red as f64;
                let dg = a.green as f64 - b.green as f64;
                let db = a.blue as f64 - b.blue as f64;
                (dr * dr + dg * dg + db * db).sqrt()
            }
            _ => Distance::INFINITY,
        }
    }

    /// The largest possible RGB distance: black to white across the cube diagonal.
    pub fn max_color_distance() -> Distance {
        (255.0_f64 * 255.0 * 3.0).sqrt()
    }
}
