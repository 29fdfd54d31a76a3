//! Records shared between clients through `tournaments.json`, plus the
//! player-local profile and join history.
//!
//! Field names serialize in camelCase so the published document stays
//! readable by every client instance.

use serde::{Deserialize, Serialize};

/// The player's own profile, captured during onboarding.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub name: String,
    /// In-game name.
    pub ign: String,
    /// In-game player id.
    pub uid: String,
    pub level: String,
    pub whatsapp: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upi_id: Option<String>,
}

/// Team size of a match.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchType {
    #[default]
    Solo,
    Duo,
    Squad,
}

impl MatchType {
    pub const ALL: [MatchType; 3] = [MatchType::Solo, MatchType::Duo, MatchType::Squad];

    pub fn label(&self) -> &'static str {
        match self {
            MatchType::Solo => "Solo",
            MatchType::Duo => "Duo",
            MatchType::Squad => "Squad",
        }
    }

    /// Next variant, wrapping. Used by the admin editor to cycle the mode.
    pub fn next(self) -> Self {
        match self {
            MatchType::Solo => MatchType::Duo,
            MatchType::Duo => MatchType::Squad,
            MatchType::Squad => MatchType::Solo,
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// A listed tournament slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub match_type: MatchType,
    pub entry_fee: u32,
    pub prize_pool: u32,
    /// `YYYY-MM-DD`
    pub date: String,
    /// `HH:MM`
    pub time: String,
    pub total_slots: u32,
    pub joined_slots: u32,
    pub rules: String,
    pub map: String,
}

impl Tournament {
    /// Share of slots taken, 0..=100. Capacity is informational only; the
    /// admin edits both counters by hand.
    pub fn fill_percent(&self) -> u16 {
        if self.total_slots == 0 {
            return 0;
        }
        let pct = u64::from(self.joined_slots) * 100 / u64::from(self.total_slots);
        pct.min(100) as u16
    }

    pub fn is_full(&self) -> bool {
        self.joined_slots >= self.total_slots
    }

    pub fn slots_left(&self) -> u32 {
        self.total_slots.saturating_sub(self.joined_slots)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SocialLinks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub youtube: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instagram: Option<String>,
}

/// Hub-wide settings: where entry fees go and what the home screen shows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfig {
    pub upi_id: String,
    pub whatsapp: String,
    #[serde(default)]
    pub banners: Vec<String>,
    #[serde(default)]
    pub social_links: SocialLinks,
}

/// The whole shared document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppData {
    pub config: AppConfig,
    #[serde(default)]
    pub tournaments: Vec<Tournament>,
}

impl AppData {
    /// Built-in dataset used when no source can be reached.
    pub fn fallback() -> Self {
        Self {
            config: AppConfig {
                upi_id: "pawanponnam-1@okicici".to_string(),
                whatsapp: "9867637326".to_string(),
                banners: vec![
                    "https://picsum.photos/seed/ff1/800/400".to_string(),
                    "https://picsum.photos/seed/ff2/800/400".to_string(),
                    "https://picsum.photos/seed/ff3/800/400".to_string(),
                ],
                social_links: SocialLinks {
                    discord: Some("https://discord.gg/ffhub".to_string()),
                    youtube: Some("https://youtube.com/@ffhub".to_string()),
                    instagram: Some("https://instagram.com/ffhub".to_string()),
                },
            },
            tournaments: vec![
                Tournament {
                    id: "t1".to_string(),
                    title: "Diamond Cup - Season 1".to_string(),
                    match_type: MatchType::Squad,
                    entry_fee: 100,
                    prize_pool: 5000,
                    date: "2024-06-25".to_string(),
                    time: "19:00".to_string(),
                    total_slots: 48,
                    joined_slots: 32,
                    map: "Bermuda".to_string(),
                    rules: "1. No hacks allowed. 2. Mobile only. 3. Reach 10 min before start."
                        .to_string(),
                },
                Tournament {
                    id: "t2".to_string(),
                    title: "Solo Rush Night".to_string(),
                    match_type: MatchType::Solo,
                    entry_fee: 30,
                    prize_pool: 1200,
                    date: "2024-06-26".to_string(),
                    time: "21:00".to_string(),
                    total_slots: 48,
                    joined_slots: 15,
                    map: "Purgatory".to_string(),
                    rules: "1. Teaming leads to ban. 2. Screenshot required for kill verification."
                        .to_string(),
                },
            ],
        }
    }

    pub fn tournament(&self, id: &str) -> Option<&Tournament> {
        self.tournaments.iter().find(|t| t.id == id)
    }

    /// Pretty-printed JSON with two-space indentation, the form that gets
    /// committed and exported.
    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum JoinStatus {
    #[default]
    Pending,
    Confirmed,
}

impl JoinStatus {
    pub fn label(&self) -> &'static str {
        match self {
            JoinStatus::Pending => "Pending",
            JoinStatus::Confirmed => "Confirmed",
        }
    }
}

/// One entry in the player's local join history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinedHistory {
    pub tournament_id: String,
    pub tournament_title: String,
    pub date: String,
    pub entry_fee: u32,
    pub status: JoinStatus,
    /// Milliseconds since the Unix epoch.
    pub joined_at: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot_verified: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(joined: u32, total: u32) -> Tournament {
        Tournament {
            joined_slots: joined,
            total_slots: total,
            ..AppData::fallback().tournaments[0].clone()
        }
    }

    #[test]
    fn fill_percent_and_capacity() {
        let t = sample(32, 48);
        assert_eq!(t.fill_percent(), 66);
        assert_eq!(t.slots_left(), 16);
        assert!(!t.is_full());

        let full = sample(48, 48);
        assert!(full.is_full());
        assert_eq!(full.fill_percent(), 100);

        let over = sample(60, 48);
        assert!(over.is_full());
        assert_eq!(over.fill_percent(), 100);
        assert_eq!(over.slots_left(), 0);
    }

    #[test]
    fn zero_capacity_is_full_with_empty_gauge() {
        let t = sample(0, 0);
        assert!(t.is_full());
        assert_eq!(t.fill_percent(), 0);
    }

    #[test]
    fn parses_published_document() {
        let json = r#"{
          "config": {
            "upiId": "hub@upi",
            "whatsapp": "9000000000",
            "banners": ["https://example.com/a.png"],
            "socialLinks": { "discord": "https://discord.gg/x" }
          },
          "tournaments": [{
            "id": "t9", "title": "Duo Clash", "type": "Duo",
            "entryFee": 50, "prizePool": 2000,
            "date": "2024-07-01", "time": "20:00",
            "totalSlots": 24, "joinedSlots": 3,
            "rules": "Be on time.", "map": "Kalahari"
          }]
        }"#;
        let data: AppData = serde_json::from_str(json).unwrap();
        assert_eq!(data.config.upi_id, "hub@upi");
        assert_eq!(data.config.social_links.youtube, None);
        let t = data.tournament("t9").unwrap();
        assert_eq!(t.match_type, MatchType::Duo);
        assert_eq!(t.entry_fee, 50);
    }

    #[test]
    fn serializes_with_wire_field_names() {
        let value = serde_json::to_value(AppData::fallback()).unwrap();
        assert_eq!(value["config"]["upiId"], "pawanponnam-1@okicici");
        assert_eq!(value["tournaments"][0]["type"], "Squad");
        assert_eq!(value["tournaments"][0]["joinedSlots"], 32);
        assert!(value["tournaments"][0].get("match_type").is_none());
    }

    #[test]
    fn history_omits_unset_verification() {
        let entry = JoinedHistory {
            tournament_id: "t1".into(),
            tournament_title: "Diamond Cup - Season 1".into(),
            date: "2024-06-25".into(),
            entry_fee: 100,
            status: JoinStatus::Pending,
            joined_at: 1_700_000_000_000,
            screenshot_verified: None,
        };
        let value = serde_json::to_value(&entry).unwrap();
        assert_eq!(value["status"], "Pending");
        assert_eq!(value["joinedAt"], 1_700_000_000_000i64);
        assert!(value.get("screenshotVerified").is_none());
    }

    #[test]
    fn match_type_cycles() {
        assert_eq!(MatchType::Solo.next(), MatchType::Duo);
        assert_eq!(MatchType::Squad.next(), MatchType::Solo);
    }
}
