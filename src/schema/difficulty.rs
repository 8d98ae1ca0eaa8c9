use serde::{Deserialize, Serialize};

/// The fixed difficulty levels a game can be rendered at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
    Expert,
}

/// Numeric knobs a skeleton reads to scale its gameplay.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParams {
    /// Multiplier on movement speed.
    pub speed: f32,
    /// Multiplier on how often targets or obstacles appear.
    pub spawn_rate: f32,
    pub lives: u32,
}

impl Difficulty {
    pub const ALL: [Difficulty; 4] = [Self::Easy, Self::Medium, Self::Hard, Self::Expert];

    /// Map a detected difficulty tag to a level. Absent or unknown tags
    /// default to medium.
    pub fn from_tag(tag: Option<&str>) -> Self {
        match tag {
            Some("easy") => Self::Easy,
            Some("medium") => Self::Medium,
            Some("hard") => Self::Hard,
            Some("expert") => Self::Expert,
            _ => Self::Medium,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
        }
    }

    pub fn params(&self) -> DifficultyParams {
        match self {
            Self::Easy => DifficultyParams {
                speed: 0.75,
                spawn_rate: 0.75,
                lives: 5,
            },
            Self::Medium => DifficultyParams {
                speed: 1.0,
                spawn_rate: 1.0,
                lives: 3,
            },
            Self::Hard => DifficultyParams {
                speed: 1.35,
                spawn_rate: 1.4,
                lives: 2,
            },
            Self::Expert => DifficultyParams {
                speed: 1.75,
                spawn_rate: 1.8,
                lives: 1,
            },
        }
    }
}
