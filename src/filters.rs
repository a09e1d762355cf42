//! Event filtering logic.
//!
//! Filters are plain values applied to catalog records; nothing is pushed
//! down into a query.

use chrono::{Days, NaiveDate};

use crate::models::SeismicEvent;

/// Bounding box for geographic filtering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl std::str::FromStr for BBox {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let vals = s
            .split(',')
            .map(|p| p.trim().parse::<f64>())
            .collect::<Result<Vec<f64>, _>>()
            .map_err(|e| format!("invalid number in bbox: {e}"))?;

        let [min_lat, min_lon, max_lat, max_lon] = vals[..] else {
            return Err(format!(
                "bbox requires 4 values (minlat,minlon,maxlat,maxlon), got {}",
                vals.len()
            ));
        };

        for lat in [min_lat, max_lat] {
            if !(-90.0..=90.0).contains(&lat) {
                return Err(format!("latitude {lat} out of range [-90, 90]"));
            }
        }
        for lon in [min_lon, max_lon] {
            if !(-180.0..=180.0).contains(&lon) {
                return Err(format!("longitude {lon} out of range [-180, 180]"));
            }
        }
        if min_lat > max_lat {
            return Err(format!("min_lat {min_lat} must be <= max_lat {max_lat}"));
        }

        Ok(Self {
            min_lat,
            min_lon,
            max_lat,
            max_lon,
        })
    }
}

impl BBox {
    /// Check if a point is within the bounding box.
    ///
    /// A box with `min_lon > max_lon` wraps across the antimeridian.
    #[must_use]
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        let lat_ok = lat >= self.min_lat && lat <= self.max_lat;
        let lon_ok = if self.min_lon <= self.max_lon {
            lon >= self.min_lon && lon <= self.max_lon
        } else {
            lon >= self.min_lon || lon <= self.max_lon
        };
        lat_ok && lon_ok
    }
}

/// Inclusive calendar-day range (UTC): `start 00:00:00` to `end 23:59:59`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    /// # Errors
    ///
    /// Returns an error if `start` is after `end`.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self, String> {
        if start > end {
            return Err(format!("start date {start} is after end date {end}"));
        }
        Ok(Self { start, end })
    }

    /// Yesterday through `today`.
    #[must_use]
    pub fn last_day(today: NaiveDate) -> Self {
        Self {
            start: today.checked_sub_days(Days::new(1)).unwrap_or(today),
            end: today,
        }
    }

    #[must_use]
    pub fn contains(&self, event: &SeismicEvent) -> bool {
        let day = event.origin_time.date_naive();
        day >= self.start && day <= self.end
    }
}

/// Parse a `YYYY-MM-DD` date argument.
///
/// # Errors
///
/// Returns an error for anything else.
pub fn parse_date(s: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|e| format!("invalid date '{s}': {e}"))
}

/// Combined filter criteria.
#[derive(Debug, Default, Clone)]
pub struct EventFilter {
    pub min_magnitude: Option<f64>,
    pub max_depth: Option<f64>,
    pub bbox: Option<BBox>,
    pub date_range: Option<DateRange>,
    /// Substring of magnitude, latitude or longitude as text
    pub search: Option<String>,
}

impl EventFilter {
    /// Check if an event passes all filter criteria.
    #[must_use]
    pub fn matches(&self, event: &SeismicEvent) -> bool {
        self.check_magnitude(event)
            && self.check_depth(event)
            && self.check_bbox(event)
            && self.check_date(event)
            && self.check_search(event)
    }

    fn check_magnitude(&self, event: &SeismicEvent) -> bool {
        self.min_magnitude.is_none_or(|min| event.magnitude >= min)
    }

    fn check_depth(&self, event: &SeismicEvent) -> bool {
        self.max_depth.is_none_or(|max| event.depth_km <= max)
    }

    fn check_bbox(&self, event: &SeismicEvent) -> bool {
        self.bbox
            .is_none_or(|bbox| bbox.contains(event.latitude, event.longitude))
    }

    fn check_date(&self, event: &SeismicEvent) -> bool {
        self.date_range.is_none_or(|range| range.contains(event))
    }

    fn check_search(&self, event: &SeismicEvent) -> bool {
        let Some(text) = self.search.as_deref().map(str::trim) else {
            return true;
        };
        if text.is_empty() {
            return true;
        }
        // Plain rendering plus the precision the event summary displays.
        let rendered = [
            event.magnitude.to_string(),
            format!("{:.1}", event.magnitude),
            event.latitude.to_string(),
            format!("{:.4}", event.latitude),
            event.longitude.to_string(),
            format!("{:.4}", event.longitude),
        ];
        rendered.iter().any(|v| v.contains(text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::tests::sample_event;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn test_bbox_parse() {
        let bbox: BBox = "-11.0,94.0,6.0,141.0".parse().unwrap();
        assert!((bbox.min_lat - (-11.0)).abs() < 0.001);
        assert!((bbox.max_lon - 141.0).abs() < 0.001);
        assert!("1,2,3".parse::<BBox>().is_err());
        assert!("10,0,5,1".parse::<BBox>().is_err());
        assert!("0,0,1,200".parse::<BBox>().is_err());
    }

    #[test]
    fn test_bbox_contains() {
        let bbox: BBox = "-11.0,94.0,6.0,141.0".parse().unwrap();
        assert!(bbox.contains(-6.2, 106.8)); // Jakarta
        assert!(!bbox.contains(35.7, 139.7)); // Tokyo
    }

    #[test]
    fn test_bbox_across_antimeridian() {
        let bbox: BBox = "-30,170,-10,-170".parse().unwrap();
        assert!(bbox.contains(-20.0, 178.0));
        assert!(bbox.contains(-20.0, -175.0));
        assert!(!bbox.contains(-20.0, 0.0));
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let range = DateRange::new(date("2024-01-04"), date("2024-01-05")).unwrap();
        assert!(range.contains(&sample_event("a", "2024-01-04 00:00:00")));
        assert!(range.contains(&sample_event("b", "2024-01-05 23:59:59")));
        assert!(!range.contains(&sample_event("c", "2024-01-06 00:00:00")));
        assert!(!range.contains(&sample_event("d", "2024-01-03 23:59:59")));
    }

    #[test]
    fn test_date_range_order() {
        assert!(DateRange::new(date("2024-02-01"), date("2024-01-01")).is_err());
        let last = DateRange::last_day(date("2024-03-01"));
        assert_eq!(last.start, date("2024-02-29"));
    }

    #[test]
    fn test_search_matches_text() {
        let event = sample_event("a", "2024-01-04 00:00:00"); // M5.2, -6.1, 105.9
        let filter = |s: &str| EventFilter {
            search: Some(s.to_string()),
            ..Default::default()
        };
        assert!(filter("5.2").matches(&event));
        assert!(filter("105").matches(&event));
        assert!(filter("-6.1").matches(&event));
        assert!(filter("  ").matches(&event));
        assert!(!filter("7.7").matches(&event));
    }

    #[test]
    fn test_search_whole_magnitude_as_displayed() {
        let mut event = sample_event("a", "2024-01-04 00:00:00");
        event.magnitude = 5.0;
        event.latitude = -6.0;
        let filter = |s: &str| EventFilter {
            search: Some(s.to_string()),
            ..Default::default()
        };
        assert!(filter("5.0").matches(&event));
        assert!(filter("-6.0000").matches(&event));
        assert!(filter("105.9000").matches(&event));
        assert!(!filter("5.05").matches(&event));
    }

    #[test]
    fn test_combined_filter() {
        let event = sample_event("a", "2024-01-04 12:00:00");
        let filter = EventFilter {
            min_magnitude: Some(5.0),
            max_depth: Some(20.0),
            bbox: Some("-11.0,94.0,6.0,141.0".parse().unwrap()),
            date_range: Some(DateRange::last_day(date("2024-01-05"))),
            search: None,
        };
        assert!(filter.matches(&event));

        let shallow_only = EventFilter {
            max_depth: Some(5.0),
            ..Default::default()
        };
        assert!(!shallow_only.matches(&event));
    }
}
