//! Playlist recommendation
//!
//! Picks a music category for the dashboard player from the advisory score.

use serde::{Deserialize, Serialize};

/// Score assumed when no advisory has been computed yet
pub const DEFAULT_WELLNESS_SCORE: i32 = 75;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaylistCategory {
    Happy,
    Focus,
    Energy,
    Stress,
    Anxiety,
    Sad,
}

impl PlaylistCategory {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 90 => PlaylistCategory::Happy,
            s if s >= 80 => PlaylistCategory::Focus,
            s if s >= 70 => PlaylistCategory::Energy,
            s if s >= 50 => PlaylistCategory::Stress,
            s if s >= 40 => PlaylistCategory::Anxiety,
            _ => PlaylistCategory::Sad,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            PlaylistCategory::Happy => "Recommended for You: Happy Vibes",
            PlaylistCategory::Focus => "Recommended for You: Focus & Concentration",
            PlaylistCategory::Energy => "Recommended for You: Energy Boost",
            PlaylistCategory::Stress => "Recommended for You: Stress Relief",
            PlaylistCategory::Anxiety => "Recommended for You: Anxiety Relief",
            PlaylistCategory::Sad => "Recommended for You: Emotional Support",
        }
    }

    /// Spotify playlist id
    pub fn playlist_id(&self) -> &'static str {
        match self {
            PlaylistCategory::Happy => "37i9dQZF1DXdPec7aLTyzC",
            PlaylistCategory::Focus => "37i9dQZF1DX8Uebhn9wzrS",
            PlaylistCategory::Energy => "37i9dQZF1DX76t638V6CA8",
            PlaylistCategory::Stress => "37i9dQZF1DX3rxVfibe1L0",
            PlaylistCategory::Anxiety => "37i9dQZF1DX4sWSpwq3LiO",
            PlaylistCategory::Sad => "37i9dQZF1DX3YSRoSdA634",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistRecommendation {
    pub category: PlaylistCategory,
    pub title: String,
    pub playlist_id: String,
    pub embed_url: String,
}

impl PlaylistRecommendation {
    pub fn for_score(score: Option<i32>) -> Self {
        let category = PlaylistCategory::from_score(score.unwrap_or(DEFAULT_WELLNESS_SCORE));
        Self {
            category,
            title: category.title().to_string(),
            playlist_id: category.playlist_id().to_string(),
            embed_url: format!(
                "https://open.spotify.com/embed/playlist/{}",
                category.playlist_id()
            ),
        }
    }
}
