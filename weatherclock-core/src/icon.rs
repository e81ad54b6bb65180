//! Provider condition code to display glyph.

pub const CLEAR: &str = "☀";
pub const PARTLY_CLOUDY: &str = "⛅";
pub const OVERCAST: &str = "☁";
pub const THUNDERSTORM: &str = "⛈";
pub const RAIN: &str = "🌧";
pub const SNOW: &str = "🌨";
pub const FOG: &str = "🌫";

/// Map a QWeather condition code to a glyph. Unknown codes render as overcast.
pub fn map_icon(code: &str) -> &'static str {
    match code {
        "100" | "150" => CLEAR,
        "101" | "102" | "103" | "151" | "152" => PARTLY_CLOUDY,
        "104" | "153" | "800" | "801" | "802" => OVERCAST,
        "302" | "303" | "304" => THUNDERSTORM,
        c if c.starts_with('3') => RAIN,
        c if c.starts_with('4') => SNOW,
        c if c.starts_with('5') => FOG,
        _ => OVERCAST,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documented_codes() {
        assert_eq!(map_icon("302"), "⛈");
        assert_eq!(map_icon("310"), "🌧");
        assert_eq!(map_icon("100"), "☀");
        assert_eq!(map_icon("401"), "🌨");
        assert_eq!(map_icon("500"), "🌫");
    }

    #[test]
    fn explicit_table_entries() {
        for c in ["101", "102", "103", "151", "152"] {
            assert_eq!(map_icon(c), PARTLY_CLOUDY, "code {c}");
        }
        for c in ["104", "153", "800", "801", "802"] {
            assert_eq!(map_icon(c), OVERCAST, "code {c}");
        }
        assert_eq!(map_icon("150"), CLEAR);
        assert_eq!(map_icon("304"), THUNDERSTORM);
        assert_eq!(map_icon("399"), RAIN);
    }

    #[test]
    fn unknown_codes_default_to_overcast() {
        for c in ["", "999", "105", "200", "700", "abc", "9"] {
            assert_eq!(map_icon(c), OVERCAST, "code {c:?}");
        }
    }
}
