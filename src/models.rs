use chrono::NaiveDate;
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use serde_json::Number;
use std::fmt;
use std::marker::PhantomData;

/// A JSON object kept as key/value pairs in document order.
///
/// `null` deserializes to an empty mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct Entries<V>(Vec<(String, V)>);

impl<V> Entries<V> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &V)> {
        self.0.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(key, _)| key.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<V> Default for Entries<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<K: Into<String>, V> FromIterator<(K, V)> for Entries<V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(key, value)| (key.into(), value)).collect())
    }
}

impl<V: Serialize> Serialize for Entries<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|(key, value)| (key, value)))
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for Entries<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct EntriesVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for EntriesVisitor<V> {
            type Value = Entries<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("an object or null")
            }

            // A repeated key keeps its first position and takes the last value.
            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
                let mut entries: Vec<(String, V)> =
                    Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some((key, value)) = map.next_entry::<String, V>()? {
                    match entries.iter_mut().find(|(existing, _)| *existing == key) {
                        Some(slot) => slot.1 = value,
                        None => entries.push((key, value)),
                    }
                }
                Ok(Entries(entries))
            }

            fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(Entries::default())
            }

            fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
                Ok(Entries::default())
            }
        }

        deserializer.deserialize_any(EntriesVisitor(PhantomData))
    }
}

/// A JSON number passed through as written, so `3` stays `3` and `3.0`
/// stays `3.0`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(Number);

impl Quantity {
    pub fn as_f64(&self) -> f64 {
        self.0.as_f64().unwrap_or(0.0)
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self(Number::from(0u64))
    }
}

impl From<u64> for Quantity {
    fn from(value: u64) -> Self {
        Self(Number::from(value))
    }
}

/// Treats an explicit `null` the same as a missing field.
fn nullable<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RawAnalyticsDocument {
    #[serde(default, deserialize_with = "nullable")]
    pub section1: TopEntitiesSection,
    #[serde(default, deserialize_with = "nullable")]
    pub section2: TimeSection,
    #[serde(default, deserialize_with = "nullable")]
    pub section3: BehaviorSection,
    #[serde(default, deserialize_with = "nullable")]
    pub section4: PlatformSection,
    #[serde(default, deserialize_with = "nullable")]
    pub section5: SessionSection,
}

impl RawAnalyticsDocument {
    /// First and last day found among the `daily_hours` keys.
    pub fn daily_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let mut dates = self
            .section2
            .daily_hours
            .keys()
            .filter_map(|key| NaiveDate::parse_from_str(key, "%Y-%m-%d").ok());
        let first = dates.next()?;
        Some(dates.fold((first, first), |(lo, hi), date| (lo.min(date), hi.max(date))))
    }
}

/// Cumulative milliseconds played, keyed by display name.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TopEntitiesSection {
    #[serde(default)]
    pub top_songs: Entries<Quantity>,
    #[serde(default)]
    pub top_artists: Entries<Quantity>,
    #[serde(default)]
    pub top_albums: Entries<Quantity>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct TimeSection {
    #[serde(default)]
    pub daily_hours: Entries<f64>,
    #[serde(default)]
    pub weekly_hours: Entries<f64>,
    #[serde(default)]
    pub monthly_hours: Entries<f64>,
    #[serde(default)]
    pub hour_minutes: Entries<f64>,
    #[serde(default)]
    pub weekday_minutes: Entries<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct BehaviorSection {
    #[serde(default, deserialize_with = "nullable")]
    pub skip_rate: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub loyalty: f64,
    #[serde(default, deserialize_with = "nullable")]
    pub new_tracks: Quantity,
    #[serde(default, deserialize_with = "nullable")]
    pub new_artists: Quantity,
    #[serde(default, deserialize_with = "nullable")]
    pub top_streaks: Vec<RawStreak>,
    #[serde(default)]
    pub ms_played_histogram: Entries<Quantity>,
    #[serde(default)]
    pub loyalty_pie_tracks: Entries<f64>,
    #[serde(default)]
    pub loyalty_pie_artists: Entries<f64>,
    #[serde(default)]
    pub new_artists_per_month: Entries<Quantity>,
    #[serde(default)]
    pub new_tracks_per_month: Entries<Quantity>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RawStreak {
    pub track: String,
    #[serde(default, deserialize_with = "nullable")]
    pub streak: Quantity,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct PlatformSection {
    #[serde(default)]
    pub platform_percent: Entries<f64>,
    #[serde(default)]
    pub platform_over_time: Entries<Entries<f64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct SessionSection {
    #[serde(default, deserialize_with = "nullable")]
    pub total_sessions: Quantity,
    #[serde(default, deserialize_with = "nullable")]
    pub average_session_duration_minutes: f64,
    #[serde(default)]
    pub session_length_histogram: Entries<Quantity>,
    #[serde(default, deserialize_with = "nullable")]
    pub average_tracks_per_session: f64,
}

// View models served to the chart layer.

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TopEntity {
    pub name: String,
    pub full_name: String,
    pub playtime: i64,
    pub playtime_ms: Quantity,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TopEntities {
    pub top_songs: Vec<TopEntity>,
    pub top_artists: Vec<TopEntity>,
    pub top_albums: Vec<TopEntity>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DailyHours {
    pub date: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeeklyHours {
    pub week: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthlyHours {
    pub month: String,
    pub hours: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct HourlyMinutes {
    pub hour: u32,
    pub minutes: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WeekdayMinutes {
    pub day: String,
    pub minutes: i64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct TimeSeries {
    pub daily_hours: Vec<DailyHours>,
    pub weekly_hours: Vec<WeeklyHours>,
    pub monthly_hours: Vec<MonthlyHours>,
    pub hourly_minutes: Vec<HourlyMinutes>,
    pub weekday_minutes: Vec<WeekdayMinutes>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Streak {
    pub track: String,
    pub full_track: String,
    pub count: Quantity,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RangeCount {
    pub range: String,
    pub count: Quantity,
    /// Midpoint in seconds of a `"(min, max]"` millisecond band.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean: Option<i64>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryValue {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthCount {
    pub month: String,
    pub count: Quantity,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LoyaltyPieCharts {
    pub top_tracks: Vec<CategoryValue>,
    pub top_artists: Vec<CategoryValue>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct ExplorationCharts {
    pub new_artists_per_month: Vec<MonthCount>,
    pub new_tracks_per_month: Vec<MonthCount>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Behavior {
    pub skip_rate: i64,
    pub loyalty_metric: i64,
    pub new_tracks_count: Quantity,
    pub new_artists_count: Quantity,
    pub top_streaks: Vec<Streak>,
    pub track_playtime_histogram: Vec<RangeCount>,
    pub loyalty_pie_charts: LoyaltyPieCharts,
    pub exploration_charts: ExplorationCharts,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlatformShare {
    pub platform: String,
    pub percentage: f64,
}

/// Hours per platform for one date.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PlatformUsagePoint {
    pub date: String,
    pub platforms: Entries<f64>,
}

/// `{date, <platform>: hours, ...}` as area charts expect it.
#[derive(Debug, Serialize)]
pub struct FlatPlatformRecord<'a> {
    pub date: &'a str,
    #[serde(flatten)]
    pub platforms: &'a Entries<f64>,
}

impl PlatformUsagePoint {
    pub fn to_flat_record(&self) -> FlatPlatformRecord<'_> {
        FlatPlatformRecord {
            date: &self.date,
            platforms: &self.platforms,
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Platform {
    pub platform_percentages: Vec<PlatformShare>,
    pub platform_usage_over_time: Vec<PlatformUsagePoint>,
}

impl Platform {
    /// Every platform seen over time, in first-seen order.
    pub fn platform_keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = Vec::new();
        for point in &self.platform_usage_over_time {
            for key in point.platforms.keys() {
                if !keys.contains(&key) {
                    keys.push(key);
                }
            }
        }
        keys
    }
}

#[derive(Debug, Serialize)]
pub struct PlatformUsageResponse<'a> {
    pub platforms: Vec<&'a str>,
    pub records: Vec<FlatPlatformRecord<'a>>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Sessions {
    pub total_sessions: Quantity,
    pub avg_session_duration: f64,
    pub session_length_histogram: Vec<RangeCount>,
    pub avg_tracks_per_session: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub top_entities: TopEntities,
    pub time_series: TimeSeries,
    pub behavior: Behavior,
    pub platform: Platform,
    pub sessions: Sessions,
}
