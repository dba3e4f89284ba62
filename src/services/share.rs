// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Share text for casting a result.

use crate::models::NormalizedProfile;

/// Text handed to the client's share/compose action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareText {
    /// Cast body for the compose action
    pub text: String,
    /// Clipboard text when compose is unavailable (includes the app link)
    pub fallback_text: String,
}

/// Score as a percentage with one decimal, e.g. `87.0%`.
pub fn format_score_percent(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

/// `1 day streak`, `5 day streak`.
pub fn format_streak(days: u32) -> String {
    format!("{} day streak", days)
}

/// Build share text from a normalized profile and the displayed streak.
pub fn compose_share_text(profile: &NormalizedProfile, streak: u32, app_url: &str) -> ShareText {
    let headline = format!(
        "My neynar score is {} 🔥\n{} · Tier: {}",
        format_score_percent(profile.score),
        format_streak(streak),
        profile.tier
    );

    ShareText {
        text: format!(
            "{}\n\nCheck your neynar score and see where you rank! 👇",
            headline
        ),
        fallback_text: format!("{}\n\nCheck your neynar score: {}", headline, app_url),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ScoreSource, Tier};

    fn profile(score: f64) -> NormalizedProfile {
        NormalizedProfile {
            fid: 3,
            display_name: "dwr".to_string(),
            score,
            tier: Tier::from_score(score),
            score_source: ScoreSource::Trusted,
            follower_count: 100,
            account_age_days: 900,
        }
    }

    #[test]
    fn test_percent_formatting() {
        assert_eq!(format_score_percent(0.87), "87.0%");
        assert_eq!(format_score_percent(0.8766), "87.7%");
        assert_eq!(format_score_percent(0.0), "0.0%");
        assert_eq!(format_score_percent(1.0), "100.0%");
    }

    #[test]
    fn test_share_text_contents() {
        let share = compose_share_text(&profile(0.87), 5, "https://vibe.example.com");

        assert!(share.text.starts_with("My neynar score is 87.0% 🔥"));
        assert!(share.text.contains("5 day streak · Tier: MASTER"));
        assert!(!share.text.contains("https://"));
        assert!(share.fallback_text.ends_with("https://vibe.example.com"));
    }
}
