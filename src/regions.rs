//! Coarse region names for event epicenters.

/// Fallback when no box matches.
pub const DEFAULT_REGION: &str = "Indonesia Region";

/// Named lat/lon boxes: (min_lat, max_lat, min_lon, max_lon, name).
const REGIONS: &[(f64, f64, f64, f64, &str)] = &[
    (-6.5, -5.5, 105.0, 107.0, "Southern Sumatra, Indonesia"),
    (-8.5, -7.0, 109.0, 111.0, "Central Java, Indonesia"),
    (-9.0, -7.5, 114.0, 116.0, "Bali, Indonesia"),
    (2.5, 4.5, 97.0, 99.0, "Aceh, Indonesia"),
    (-1.5, 0.5, 119.0, 121.0, "Sulawesi, Indonesia"),
];

/// Name of the first region box containing the point (edges inclusive).
#[must_use]
pub fn region_name(lat: f64, lon: f64) -> &'static str {
    REGIONS
        .iter()
        .find(|(min_lat, max_lat, min_lon, max_lon, _)| {
            (*min_lat..=*max_lat).contains(&lat) && (*min_lon..=*max_lon).contains(&lon)
        })
        .map_or(DEFAULT_REGION, |r| r.4)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_regions() {
        assert_eq!(region_name(-6.0, 106.0), "Southern Sumatra, Indonesia");
        assert_eq!(region_name(-7.5, 110.4), "Central Java, Indonesia");
        assert_eq!(region_name(3.3, 98.0), "Aceh, Indonesia");
        assert_eq!(region_name(0.5, 121.0), "Sulawesi, Indonesia"); // corner
    }

    #[test]
    fn test_fallback() {
        assert_eq!(region_name(35.0, 139.0), DEFAULT_REGION);
    }
}
