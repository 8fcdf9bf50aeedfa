use chrono::{DateTime, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A weekly-recurring travel slot. Only the day of week and the time of day
/// carry meaning; the wire encodes the day as 0..6 with 0 = Sunday.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecurringSlot {
    #[serde(with = "weekday_from_sunday")]
    pub day: Weekday,
    #[serde(with = "hour_minute")]
    pub time: NaiveTime,
}

/// When a route is traveled: one-off dates plus weekly recurring slots.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schedule {
    #[serde(default)]
    pub dates: Vec<DateTime<Utc>>,
    #[serde(default)]
    pub periodic: Vec<RecurringSlot>,
}

impl Schedule {
    pub fn is_empty(&self) -> bool {
        self.dates.is_empty() && self.periodic.is_empty()
    }
}

/// A route as it travels over the wire and rests in storage: the path is a
/// sequence of `"[lng,lat]"` strings in travel order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteDoc {
    pub owner: String,
    pub name: String,
    #[serde(default)]
    pub start_address: String,
    #[serde(default)]
    pub end_address: String,
    pub route: Vec<String>,
    pub planning: Schedule,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub owner: String,
    #[serde(default)]
    pub name: String,
    pub route: Vec<String>,
    pub planning: Schedule,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchEntry {
    pub route: RouteDoc,
    pub similarity: f64,
    pub lcs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResponse {
    pub similarities: Vec<MatchEntry>,
}

/// A manually-relocated waypoint bound to its segment index on the path
/// currently displayed by the client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnchorDoc {
    pub position: String,
    pub index: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryRequest {
    pub waypoints: Vec<String>,
    #[serde(default)]
    pub anchors: Vec<AnchorDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItineraryResponse {
    pub path: Vec<String>,
    pub anchors: Vec<AnchorDoc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub message: String,
}

/// Serde helpers for the `0..6, 0 = Sunday` day-of-week wire convention.
pub mod weekday_from_sunday {
    use chrono::Weekday;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(day: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(day.num_days_from_sunday() as u8)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        match u8::deserialize(deserializer)? {
            0 => Ok(Weekday::Sun),
            1 => Ok(Weekday::Mon),
            2 => Ok(Weekday::Tue),
            3 => Ok(Weekday::Wed),
            4 => Ok(Weekday::Thu),
            5 => Ok(Weekday::Fri),
            6 => Ok(Weekday::Sat),
            other => Err(de::Error::custom(format!(
                "day of week out of range: {other}"
            ))),
        }
    }
}

/// Serde helpers for the `"HH:MM"` time-of-day wire convention.
pub mod hour_minute {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer, de};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let text = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(&text, FORMAT).map_err(de::Error::custom)
    }
}
