//! Condition code mapping.
//!
//! WeatherAPI describes conditions as free text ("Partly cloudy", "Lluvia
//! moderada"); OpenWeather uses a numeric taxonomy. This module maps text
//! onto the numeric codes so that one taxonomy drives the ambient-state
//! logic regardless of which provider answered.

/// Map a free-text condition description (English or Spanish, any casing)
/// onto the numeric condition taxonomy.
///
/// Categories are tested in a fixed priority order: storm, rain, snow,
/// mist, clear, clouds. Storm and precipitation keywords come before the
/// generic cloud keywords because provider text commonly embeds both
/// ("cloudy with thunderstorms"). Unmatched text maps to 800 (clear).
pub fn code_from_description(description: &str) -> u16 {
    let desc = description.to_lowercase();
    let has = |kw: &str| desc.contains(kw);

    if has("thunder") || has("tormenta") {
        return 200;
    }

    if has("rain") || has("lluvia") || has("drizzle") || has("llovizna") {
        if has("heavy") || has("torrencial") {
            return 502;
        }
        if has("light") || has("ligera") {
            return 500;
        }
        return 501;
    }

    if has("snow") || has("nieve") || has("sleet") {
        return 600;
    }

    if has("mist") || has("fog") || has("niebla") {
        return 741;
    }

    if has("clear") || has("despejado") || has("sunny") || has("soleado") {
        return 800;
    }

    if has("cloud") || has("nublado") || has("overcast") || has("nube") {
        if has("partly") || has("parcialmente") {
            return 801;
        }
        if has("broken") || has("scattered") {
            return 803;
        }
        return 804;
    }

    800
}

/// Short group label for a numeric condition code, in the style of
/// OpenWeather's `weather.main` field.
pub fn label_for(code: u16) -> &'static str {
    match code {
        200..=299 => "Thunderstorm",
        300..=399 => "Drizzle",
        500..=599 => "Rain",
        600..=699 => "Snow",
        701 | 721 | 741 => "Mist",
        700..=799 => "Haze",
        800 => "Clear",
        801..=899 => "Clouds",
        _ => "Unknown",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partly_cloudy_maps_to_801() {
        assert_eq!(code_from_description("Partly cloudy"), 801);
        assert_eq!(code_from_description("Parcialmente nublado"), 801);
    }

    #[test]
    fn rain_intensity_tiers() {
        assert_eq!(code_from_description("Heavy rain"), 502);
        assert_eq!(code_from_description("Light rain shower"), 500);
        assert_eq!(code_from_description("Moderate rain"), 501);
        assert_eq!(code_from_description("Lluvia torrencial"), 502);
        assert_eq!(code_from_description("Llovizna ligera"), 500);
    }

    #[test]
    fn thunderstorm_beats_cloud_keywords() {
        assert_eq!(code_from_description("Thunderstorm"), 200);
        // Both "cloudy" and "thunder" appear; storm has priority.
        assert_eq!(code_from_description("Cloudy with thunderstorms"), 200);
    }

    #[test]
    fn snow_and_mist() {
        assert_eq!(code_from_description("Patchy snow possible"), 600);
        assert_eq!(code_from_description("Sleet"), 600);
        assert_eq!(code_from_description("Mist"), 741);
        assert_eq!(code_from_description("Niebla"), 741);
    }

    #[test]
    fn cloud_tiers() {
        assert_eq!(code_from_description("Broken clouds"), 803);
        assert_eq!(code_from_description("Scattered clouds"), 803);
        assert_eq!(code_from_description("Overcast"), 804);
    }

    #[test]
    fn unmatched_defaults_to_clear() {
        assert_eq!(code_from_description("Sunny"), 800);
        assert_eq!(code_from_description(""), 800);
        assert_eq!(code_from_description("xyzzy"), 800);
    }

    #[test]
    fn labels_for_code_groups() {
        assert_eq!(label_for(200), "Thunderstorm");
        assert_eq!(label_for(502), "Rain");
        assert_eq!(label_for(600), "Snow");
        assert_eq!(label_for(741), "Mist");
        assert_eq!(label_for(731), "Haze");
        assert_eq!(label_for(800), "Clear");
        assert_eq!(label_for(804), "Clouds");
        assert_eq!(label_for(0), "Unknown");
    }
}
