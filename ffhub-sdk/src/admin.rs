//! Admin panel: passcode gate and draft editor for the shared document.
//!
//! Edits happen on a draft copy. Applying the draft only changes the running
//! client; other players see the change once it is published to GitHub (or
//! the exported JSON is committed by hand).

use crate::model::{AppData, MatchType, Tournament};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AdminError {
    #[error("Wrong passcode!")]
    WrongPasscode,
    #[error("admin access is not configured")]
    Disabled,
    #[error("no tournament with id {0}")]
    UnknownTournament(String),
    #[error("no banner at position {0}")]
    UnknownBanner(usize),
}

/// Shared static passcode, compared in plaintext.
#[derive(Debug, Clone)]
pub struct AdminGate {
    passcode: Option<String>,
}

impl AdminGate {
    /// `None` or an empty passcode disables the admin panel.
    pub fn new(passcode: Option<String>) -> Self {
        Self { passcode: passcode.filter(|p| !p.is_empty()) }
    }

    pub fn is_enabled(&self) -> bool {
        self.passcode.is_some()
    }

    pub fn unlock(&self, attempt: &str, data: &AppData) -> Result<AdminEditor, AdminError> {
        match &self.passcode {
            None => Err(AdminError::Disabled),
            Some(p) if p == attempt => {
                tracing::info!("Admin panel unlocked");
                Ok(AdminEditor { draft: data.clone() })
            }
            Some(_) => {
                tracing::warn!("Admin unlock rejected");
                Err(AdminError::WrongPasscode)
            }
        }
    }
}

/// Partial update for a tournament; `None` fields are left alone.
#[derive(Debug, Clone, Default)]
pub struct TournamentPatch {
    pub title: Option<String>,
    pub match_type: Option<MatchType>,
    pub entry_fee: Option<u32>,
    pub prize_pool: Option<u32>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub total_slots: Option<u32>,
    pub joined_slots: Option<u32>,
    pub rules: Option<String>,
    pub map: Option<String>,
}

impl TournamentPatch {
    fn apply(self, t: &mut Tournament) {
        if let Some(v) = self.title {
            t.title = v;
        }
        if let Some(v) = self.match_type {
            t.match_type = v;
        }
        if let Some(v) = self.entry_fee {
            t.entry_fee = v;
        }
        if let Some(v) = self.prize_pool {
            t.prize_pool = v;
        }
        if let Some(v) = self.date {
            t.date = v;
        }
        if let Some(v) = self.time {
            t.time = v;
        }
        if let Some(v) = self.total_slots {
            t.total_slots = v;
        }
        if let Some(v) = self.joined_slots {
            t.joined_slots = v;
        }
        if let Some(v) = self.rules {
            t.rules = v;
        }
        if let Some(v) = self.map {
            t.map = v;
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminEditor {
    draft: AppData,
}

impl AdminEditor {
    pub fn draft(&self) -> &AppData {
        &self.draft
    }

    pub fn into_data(self) -> AppData {
        self.draft
    }

    /// Prepend a blank match and return its id.
    pub fn add_tournament(&mut self) -> String {
        let now = chrono::Local::now();
        let mut id = format!("t{}", now.timestamp_millis());
        // Two adds in the same millisecond would collide.
        while self.draft.tournament(&id).is_some() {
            id.push('x');
        }
        self.draft.tournaments.insert(
            0,
            Tournament {
                id: id.clone(),
                title: "New Match".to_string(),
                match_type: MatchType::Solo,
                entry_fee: 0,
                prize_pool: 0,
                date: now.format("%Y-%m-%d").to_string(),
                time: "18:00".to_string(),
                total_slots: 48,
                joined_slots: 0,
                map: "Bermuda".to_string(),
                rules: "Standard rules apply.".to_string(),
            },
        );
        id
    }

    pub fn update_tournament(
        &mut self,
        id: &str,
        patch: TournamentPatch,
    ) -> Result<(), AdminError> {
        let t = self
            .draft
            .tournaments
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| AdminError::UnknownTournament(id.to_string()))?;
        patch.apply(t);
        Ok(())
    }

    pub fn delete_tournament(&mut self, id: &str) -> Result<Tournament, AdminError> {
        let pos = self
            .draft
            .tournaments
            .iter()
            .position(|t| t.id == id)
            .ok_or_else(|| AdminError::UnknownTournament(id.to_string()))?;
        Ok(self.draft.tournaments.remove(pos))
    }

    pub fn set_upi_id(&mut self, upi_id: &str) {
        self.draft.config.upi_id = upi_id.to_string();
    }

    pub fn set_whatsapp(&mut self, number: &str) {
        self.draft.config.whatsapp = number.to_string();
    }

    /// Append an empty banner slot and return its index.
    pub fn add_banner(&mut self) -> usize {
        self.draft.config.banners.push(String::new());
        self.draft.config.banners.len() - 1
    }

    pub fn set_banner(&mut self, idx: usize, url: &str) -> Result<(), AdminError> {
        let slot = self
            .draft
            .config
            .banners
            .get_mut(idx)
            .ok_or(AdminError::UnknownBanner(idx))?;
        *slot = url.to_string();
        Ok(())
    }

    pub fn remove_banner(&mut self, idx: usize) -> Result<String, AdminError> {
        if idx >= self.draft.config.banners.len() {
            return Err(AdminError::UnknownBanner(idx));
        }
        Ok(self.draft.config.banners.remove(idx))
    }

    /// The draft as it would be committed.
    pub fn export_json(&self) -> String {
        self.draft
            .to_pretty_json()
            .unwrap_or_else(|_| "{}".to_string())
    }
}
