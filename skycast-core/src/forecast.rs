//! Forecast day sampling.
//!
//! Reduces the dense 3-hourly forecast series into at most five
//! `DaySample` entries, one per UTC calendar date, in the order the dates
//! appear in the series. Min/max temperatures are true extrema over every
//! point of a day; the displayed condition, humidity and wind come from the
//! single representative point closest to noon.

use chrono::{DateTime, NaiveDate, Timelike};

use crate::{
    conditions,
    model::{Condition, DaySample, ForecastPoint},
};

const MAX_DAYS: usize = 5;

struct DayAccum {
    date: NaiveDate,
    temp_min: f64,
    temp_max: f64,
    /// Index into the input series of the current representative point.
    best_idx: usize,
    /// |hour − 12| for that point; ties keep the earlier point.
    best_dist: u32,
}

/// Sample the series down to a 5-day outlook.
///
/// Grouping is by the UTC calendar day of each point's timestamp. Points
/// whose timestamp cannot be represented are skipped; points belonging to
/// a sixth or later date are ignored, but every point of the first five
/// dates still feeds that day's extrema.
pub fn daily_outlook(points: &[ForecastPoint]) -> Vec<DaySample> {
    let mut days: Vec<DayAccum> = Vec::with_capacity(MAX_DAYS);

    for (idx, point) in points.iter().enumerate() {
        let Some(dt) = DateTime::from_timestamp(point.epoch, 0) else {
            continue;
        };
        let date = dt.date_naive();
        let dist = dt.hour().abs_diff(12);

        let day_count = days.len();
        match days.iter_mut().find(|d| d.date == date) {
            Some(day) => {
                day.temp_min = day.temp_min.min(point.temp_f);
                day.temp_max = day.temp_max.max(point.temp_f);
                if dist < day.best_dist {
                    day.best_dist = dist;
                    day.best_idx = idx;
                }
            }
            None if day_count < MAX_DAYS => {
                days.push(DayAccum {
                    date,
                    temp_min: point.temp_f,
                    temp_max: point.temp_f,
                    best_idx: idx,
                    best_dist: dist,
                });
            }
            None => {}
        }
    }

    days.sort_by_key(|d| d.date);

    days.into_iter()
        .map(|day| {
            let rep = &points[day.best_idx];
            DaySample {
                date: day.date,
                temp_max_f: day.temp_max,
                temp_min_f: day.temp_min,
                condition: Condition {
                    code: rep.condition_code,
                    label: conditions::label_for(rep.condition_code).to_string(),
                    description: rep.description.clone(),
                    icon: rep.icon.clone(),
                },
                humidity_pct: rep.humidity_pct,
                wind_mph: rep.wind_mph,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: i64 = 86_400;
    // 2023-11-15T00:00:00Z.
    const MIDNIGHT: i64 = 1_700_006_400;

    fn point(epoch: i64, temp: f64, description: &str) -> ForecastPoint {
        ForecastPoint {
            epoch,
            temp_f: temp,
            humidity_pct: 70,
            wind_mph: 8.0,
            condition_code: crate::conditions::code_from_description(description),
            description: description.to_string(),
            icon: String::new(),
        }
    }

    #[test]
    fn one_sample_per_date_capped_at_five() {
        let mut points = Vec::new();
        for day in 0..7 {
            for hour in [6, 12, 18] {
                points.push(point(MIDNIGHT + day * DAY + hour * 3600, 70.0, "Sunny"));
            }
        }

        let outlook = daily_outlook(&points);
        assert_eq!(outlook.len(), 5);

        // Ascending dates, starting at the first date in the series.
        for pair in outlook.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        assert_eq!(
            outlook[0].date,
            NaiveDate::from_ymd_opt(2023, 11, 15).unwrap()
        );
    }

    #[test]
    fn fewer_dates_than_cap_yields_fewer_samples() {
        let points = vec![
            point(MIDNIGHT + 9 * 3600, 70.0, "Sunny"),
            point(MIDNIGHT + DAY + 9 * 3600, 71.0, "Sunny"),
        ];
        assert_eq!(daily_outlook(&points).len(), 2);
        assert!(daily_outlook(&[]).is_empty());
    }

    #[test]
    fn extrema_span_the_whole_day_not_the_representative() {
        let points = vec![
            point(MIDNIGHT + 3 * 3600, 58.0, "Clear"),
            point(MIDNIGHT + 12 * 3600, 74.0, "Sunny"),
            point(MIDNIGHT + 21 * 3600, 63.0, "Clear"),
        ];

        let outlook = daily_outlook(&points);
        assert_eq!(outlook.len(), 1);
        assert_eq!(outlook[0].temp_min_f, 58.0);
        assert_eq!(outlook[0].temp_max_f, 74.0);
        assert!(outlook[0].temp_max_f >= outlook[0].temp_min_f);
    }

    #[test]
    fn representative_is_closest_to_noon_first_occurrence_on_tie() {
        // Hours 09:00, 11:00, 13:00 → distances 3, 1, 1; the 11:00 point
        // wins the tie by coming first.
        let points = vec![
            point(MIDNIGHT + 9 * 3600, 70.0, "Overcast"),
            point(MIDNIGHT + 11 * 3600, 72.0, "Sunny"),
            point(MIDNIGHT + 13 * 3600, 75.0, "Heavy rain"),
        ];

        let outlook = daily_outlook(&points);
        assert_eq!(outlook.len(), 1);
        assert_eq!(outlook[0].condition.description, "Sunny");
        assert_eq!(outlook[0].condition.code, 800);
        // Extrema still come from the whole day.
        assert_eq!(outlook[0].temp_max_f, 75.0);
        assert_eq!(outlook[0].temp_min_f, 70.0);
    }

    #[test]
    fn representative_supplies_humidity_and_wind() {
        let mut morning = point(MIDNIGHT + 6 * 3600, 65.0, "Mist");
        morning.humidity_pct = 95;
        morning.wind_mph = 2.0;
        let mut noon = point(MIDNIGHT + 12 * 3600, 75.0, "Sunny");
        noon.humidity_pct = 55;
        noon.wind_mph = 11.0;

        let outlook = daily_outlook(&[morning, noon]);
        assert_eq!(outlook[0].humidity_pct, 55);
        assert_eq!(outlook[0].wind_mph, 11.0);
    }

    #[test]
    fn points_past_the_fifth_date_do_not_add_days() {
        let mut points = Vec::new();
        for day in 0..6 {
            points.push(point(MIDNIGHT + day * DAY + 12 * 3600, 70.0 + day as f64, "Sunny"));
        }
        // A late extra point for day 0 must still update day 0's extrema.
        points.push(point(MIDNIGHT + 18 * 3600, 90.0, "Sunny"));

        let outlook = daily_outlook(&points);
        assert_eq!(outlook.len(), 5);
        assert_eq!(outlook[0].temp_max_f, 90.0);
    }
}
