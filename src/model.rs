// src/model.rs

use chrono::NaiveDate;
use serde::Deserialize;
use std::fmt;

/// Identifies a swimmer by exact (last, first) name match.
///
/// Field order matters: the derived `Ord` sorts by last name, then first
/// name, which is the alphabetical order used by every rendering pass.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SwimmerKey {
    pub last: String,
    pub first: String,
}

impl SwimmerKey {
    pub fn new(last: impl Into<String>, first: impl Into<String>) -> Self {
        Self { last: last.into(), first: first.into() }
    }

    /// "Last, First", used in chart legends.
    pub fn legend_label(&self) -> String {
        format!("{}, {}", self.last, self.first)
    }
}

impl fmt::Display for SwimmerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.last, self.first)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize)]
#[serde(try_from = "String")]
pub enum Stroke {
    Freestyle,
    Backstroke,
    Breaststroke,
    Butterfly,
    Medley,
}

impl Stroke {
    pub fn name(&self) -> &'static str {
        match self {
            Stroke::Freestyle => "Freestyle",
            Stroke::Backstroke => "Backstroke",
            Stroke::Breaststroke => "Breaststroke",
            Stroke::Butterfly => "Butterfly",
            Stroke::Medley => "Medley",
        }
    }
}

impl fmt::Display for Stroke {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl TryFrom<String> for Stroke {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        // Hy-Tek stroke codes A..E are accepted alongside the full names.
        match value.trim().to_ascii_lowercase().as_str() {
            "a" | "free" | "freestyle" => Ok(Stroke::Freestyle),
            "b" | "back" | "backstroke" => Ok(Stroke::Backstroke),
            "c" | "breast" | "breaststroke" => Ok(Stroke::Breaststroke),
            "d" | "fly" | "butterfly" => Ok(Stroke::Butterfly),
            "e" | "im" | "medley" | "individual medley" => Ok(Stroke::Medley),
            other => Err(format!("unknown stroke '{}'", other)),
        }
    }
}

/// A race type, independent of meet or date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EventKey {
    pub distance: u32,
    pub stroke: Stroke,
}

impl EventKey {
    pub fn new(distance: u32, stroke: Stroke) -> Self {
        Self { distance, stroke }
    }
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.distance, self.stroke)
    }
}

/// One individual swim: the unit everything downstream is built from.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    pub swimmer: SwimmerKey,
    pub event: EventKey,
    pub date: NaiveDate,
    /// Finals time in seconds, always > 0.
    pub time: f64,
}

// --- Parsed meet files ---

#[derive(Debug, Clone, Deserialize)]
pub struct Meet {
    pub name: String,
    #[serde(default)]
    pub start_date: Option<NaiveDate>,
    #[serde(default)]
    pub events: Vec<MeetEvent>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MeetEvent {
    #[serde(default)]
    pub number: Option<String>,
    pub distance: u32,
    pub stroke: Stroke,
    #[serde(default)]
    pub entries: Vec<Entry>,
}

impl MeetEvent {
    pub fn key(&self) -> EventKey {
        EventKey::new(self.distance, self.stroke)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Entry {
    #[serde(default)]
    pub swimmers: Vec<Swimmer>,
    #[serde(default)]
    pub finals_date: Option<NaiveDate>,
    /// Seconds; zero or absent means no valid finals swim.
    #[serde(default)]
    pub finals_time: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Swimmer {
    pub last_name: String,
    pub first_name: String,
}

impl Swimmer {
    pub fn key(&self) -> SwimmerKey {
        SwimmerKey::new(self.last_name.clone(), self.first_name.clone())
    }
}
