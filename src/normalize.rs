//! Reshapes a [`RawAnalyticsDocument`] into the view models each dashboard
//! section renders. Every function here is total: missing data yields empty
//! series and zeroed scalars, never an error.

use crate::format::{ms_to_minutes, truncate_label};
use crate::models::{
    Behavior, CategoryValue, DailyHours, Dashboard, Entries, ExplorationCharts, HourlyMinutes,
    LoyaltyPieCharts, MonthCount, MonthlyHours, Platform, PlatformShare, PlatformUsagePoint,
    Quantity, RangeCount, RawAnalyticsDocument, Sessions, Streak, TimeSeries, TopEntities,
    TopEntity, WeekdayMinutes, WeeklyHours,
};

pub const SONG_LABEL_LIMIT: usize = 30;
pub const ARTIST_LABEL_LIMIT: usize = 25;
pub const ALBUM_LABEL_LIMIT: usize = 30;
pub const STREAK_LABEL_LIMIT: usize = 25;

pub fn normalize_dashboard(doc: &RawAnalyticsDocument) -> Dashboard {
    Dashboard {
        top_entities: normalize_top_entities(doc),
        time_series: normalize_time_series(doc),
        behavior: normalize_behavior(doc),
        platform: normalize_platform(doc),
        sessions: normalize_sessions(doc),
    }
}

pub fn normalize_top_entities(doc: &RawAnalyticsDocument) -> TopEntities {
    let section = &doc.section1;
    TopEntities {
        top_songs: top_entities(&section.top_songs, SONG_LABEL_LIMIT),
        top_artists: top_entities(&section.top_artists, ARTIST_LABEL_LIMIT),
        top_albums: top_entities(&section.top_albums, ALBUM_LABEL_LIMIT),
    }
}

fn top_entities(source: &Entries<Quantity>, limit: usize) -> Vec<TopEntity> {
    source
        .iter()
        .map(|(name, playtime_ms)| TopEntity {
            name: truncate_label(name, limit),
            full_name: name.to_string(),
            playtime: ms_to_minutes(playtime_ms.as_f64()),
            playtime_ms: playtime_ms.clone(),
        })
        .collect()
}

pub fn normalize_time_series(doc: &RawAnalyticsDocument) -> TimeSeries {
    let section = &doc.section2;
    TimeSeries {
        daily_hours: section
            .daily_hours
            .iter()
            .map(|(date, &hours)| DailyHours {
                date: date.to_string(),
                hours: round2(hours),
            })
            .collect(),
        weekly_hours: section
            .weekly_hours
            .iter()
            .map(|(week, &hours)| WeeklyHours {
                week: week.to_string(),
                hours: round2(hours),
            })
            .collect(),
        monthly_hours: section
            .monthly_hours
            .iter()
            .map(|(month, &hours)| MonthlyHours {
                month: month.to_string(),
                hours: round2(hours),
            })
            .collect(),
        hourly_minutes: section
            .hour_minutes
            .iter()
            .filter_map(|(hour, &minutes)| {
                Some(HourlyMinutes {
                    hour: parse_hour(hour)?,
                    minutes: round_whole(minutes),
                })
            })
            .collect(),
        weekday_minutes: section
            .weekday_minutes
            .iter()
            .map(|(day, &minutes)| WeekdayMinutes {
                day: day.to_string(),
                minutes: round_whole(minutes),
            })
            .collect(),
    }
}

/// Leading decimal digits of an hour key, so `"7"` and `"07:00"` both give 7.
/// Keys with no leading digit are not an hour and get skipped.
fn parse_hour(key: &str) -> Option<u32> {
    let trimmed = key.trim_start();
    let end = trimmed
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(trimmed.len());
    trimmed[..end].parse().ok()
}

pub fn normalize_behavior(doc: &RawAnalyticsDocument) -> Behavior {
    let section = &doc.section3;
    Behavior {
        skip_rate: percent_whole(section.skip_rate),
        loyalty_metric: percent_whole(section.loyalty),
        new_tracks_count: section.new_tracks.clone(),
        new_artists_count: section.new_artists.clone(),
        top_streaks: section
            .top_streaks
            .iter()
            .map(|item| Streak {
                track: truncate_label(&item.track, STREAK_LABEL_LIMIT),
                full_track: item.track.clone(),
                count: item.streak.clone(),
            })
            .collect(),
        track_playtime_histogram: range_counts(&section.ms_played_histogram),
        loyalty_pie_charts: LoyaltyPieCharts {
            top_tracks: category_values(&section.loyalty_pie_tracks),
            top_artists: category_values(&section.loyalty_pie_artists),
        },
        exploration_charts: ExplorationCharts {
            new_artists_per_month: month_counts(&section.new_artists_per_month),
            new_tracks_per_month: month_counts(&section.new_tracks_per_month),
        },
    }
}

fn category_values(source: &Entries<f64>) -> Vec<CategoryValue> {
    source
        .iter()
        .map(|(category, &value)| CategoryValue {
            category: category.to_string(),
            value: round2(value),
        })
        .collect()
}

fn month_counts(source: &Entries<Quantity>) -> Vec<MonthCount> {
    source
        .iter()
        .map(|(month, count)| MonthCount {
            month: month.to_string(),
            count: count.clone(),
        })
        .collect()
}

fn range_counts(source: &Entries<Quantity>) -> Vec<RangeCount> {
    source
        .iter()
        .map(|(range, count)| RangeCount {
            range: range.to_string(),
            count: count.clone(),
            mean: band_midpoint_seconds(range),
        })
        .collect()
}

/// Midpoint of a `"(min, max]"` band given in milliseconds, as whole seconds.
/// Labels of any other shape have no midpoint.
fn band_midpoint_seconds(label: &str) -> Option<i64> {
    let inner = label.trim().strip_prefix('(')?.strip_suffix(']')?;
    let (min, max) = inner.split_once(',')?;
    let min: u64 = min.trim().parse().ok()?;
    let max: u64 = max.trim().parse().ok()?;
    Some(((min as f64 + max as f64) / 2.0 / 1000.0).round() as i64)
}

pub fn normalize_platform(doc: &RawAnalyticsDocument) -> Platform {
    let section = &doc.section4;
    Platform {
        platform_percentages: section
            .platform_percent
            .iter()
            .map(|(platform, &fraction)| PlatformShare {
                platform: platform.to_string(),
                percentage: percent2(fraction),
            })
            .collect(),
        platform_usage_over_time: section
            .platform_over_time
            .iter()
            .map(|(date, platforms)| PlatformUsagePoint {
                date: date.to_string(),
                platforms: platforms
                    .iter()
                    .map(|(platform, &hours)| (platform, round2(hours)))
                    .collect(),
            })
            .collect(),
    }
}

pub fn normalize_sessions(doc: &RawAnalyticsDocument) -> Sessions {
    let section = &doc.section5;
    Sessions {
        total_sessions: section.total_sessions.clone(),
        avg_session_duration: round2(section.average_session_duration_minutes),
        session_length_histogram: range_counts(&section.session_length_histogram),
        avg_tracks_per_session: round2(section.average_tracks_per_session),
    }
}

// Half-way values round away from zero.

fn round_whole(value: f64) -> i64 {
    value.round() as i64
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn percent_whole(fraction: f64) -> i64 {
    (fraction * 100.0).round() as i64
}

fn percent2(fraction: f64) -> f64 {
    (fraction * 10_000.0).round() / 100.0
}
