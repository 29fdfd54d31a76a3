//! Application state for the TUI.
//!
//! Key handling is pure state manipulation: anything that touches the network
//! or the desktop comes back as an [`Action`] for the main loop to run, and
//! results arrive later as a [`BgResult`].

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ffhub_sdk::admin::{AdminEditor, AdminGate, TournamentPatch};
use ffhub_sdk::github::{GitHubConfig, PublishOutcome};
use ffhub_sdk::model::{AppData, JoinedHistory, MatchType, Tournament, UserProfile};
use ffhub_sdk::onboarding::ProfileForm;
use ffhub_sdk::registration::{Registration, Step};
use ffhub_sdk::source::{DATA_FILE, Loaded, Origin};
use ffhub_sdk::store::Store;

use crate::form::{Field, Form, FormEvent};

/// How long each banner stays up.
pub const BANNER_INTERVAL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Home,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminTab {
    Matches,
    Settings,
    Export,
    Sync,
}

impl AdminTab {
    pub const ALL: [AdminTab; 4] = [
        AdminTab::Matches,
        AdminTab::Settings,
        AdminTab::Export,
        AdminTab::Sync,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            AdminTab::Matches => "Matches",
            AdminTab::Settings => "Settings",
            AdminTab::Export => "Export",
            AdminTab::Sync => "Sync",
        }
    }

    fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    fn step(&self, forward: bool) -> Self {
        let len = Self::ALL.len();
        let i = self.index();
        Self::ALL[if forward { (i + 1) % len } else { (i + len - 1) % len }]
    }
}

/// AI scout popup for one tournament.
pub struct ScoutState {
    pub tournament_id: String,
    pub map: String,
    pub mode: String,
    /// `None` while loading.
    pub text: Option<String>,
}

pub struct RegisterState {
    pub reg: Registration,
    /// Name / IGN / UID inputs for the details step.
    pub details: Form,
}

pub struct AdminState {
    pub editor: AdminEditor,
    pub tab: AdminTab,
    pub selected: usize,
    /// Match being edited: its id and the form.
    pub edit: Option<(String, Form)>,
    pub settings: Form,
    pub sync: Form,
    pub publishing: bool,
}

impl AdminState {
    /// Leaving the Settings tab keeps its edits in the draft.
    fn switch_tab(&mut self, tab: AdminTab) {
        if self.tab == AdminTab::Settings && tab != AdminTab::Settings {
            apply_settings(&mut self.editor, &self.settings);
        }
        self.tab = tab;
    }
}

pub enum Modal {
    Onboarding(Form),
    Register(RegisterState),
    Scout(ScoutState),
    AdminLogin(Form),
    Admin(Box<AdminState>),
}

/// Modal to show next and the side effect to run, from one keypress.
type KeyOutcome = (Option<Modal>, Option<Action>);

/// Side effects requested by key handling.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    OpenUrl(String),
    FetchStrategy { tournament_id: String, map: String, mode: String },
    Publish { config: GitHubConfig, data: AppData },
    Export { path: PathBuf, json: String },
    Refresh,
}

/// Results from background tasks that need to update the UI.
pub enum BgResult {
    Strategy { tournament_id: String, text: String },
    Published(PublishOutcome),
    Refreshed(Loaded),
    Exported(Result<PathBuf, String>),
}

pub struct App {
    pub data: AppData,
    pub origin: Origin,
    pub profile: Option<UserProfile>,
    /// Join history, newest first.
    pub history: Vec<JoinedHistory>,
    pub tab: Tab,
    /// Selected card on the home tab.
    pub selected: usize,
    /// Index of the banner on screen.
    pub banner: usize,
    banner_at: Instant,
    pub modal: Option<Modal>,
    /// One-line message shown in the footer until the next keypress.
    pub notice: Option<String>,
    pub refreshing: bool,
    pub should_quit: bool,
    store: Store,
    gate: AdminGate,
    export_path: PathBuf,
}

impl App {
    pub fn new(loaded: Loaded, store: Store, gate: AdminGate) -> Self {
        let profile = store.profile().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Can't read stored profile");
            None
        });
        let history = store.history().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Can't read join history");
            Vec::new()
        });
        let modal = match profile {
            None => Some(Modal::Onboarding(profile_form(&ProfileForm::default()))),
            Some(_) => None,
        };
        let export_path = match &loaded.origin {
            Origin::Local(p) => p.clone(),
            _ => PathBuf::from(DATA_FILE),
        };

        Self {
            data: loaded.data,
            origin: loaded.origin,
            profile,
            history,
            tab: Tab::Home,
            selected: 0,
            banner: 0,
            banner_at: Instant::now(),
            modal,
            notice: None,
            refreshing: false,
            should_quit: false,
            store,
            gate,
            export_path,
        }
    }

    pub fn selected_tournament(&self) -> Option<&Tournament> {
        self.data.tournaments.get(self.selected)
    }

    /// Advance the banner carousel when its interval has elapsed.
    pub fn tick(&mut self, now: Instant) {
        let len = self.data.config.banners.len();
        if len == 0 {
            self.banner = 0;
            return;
        }
        if now.duration_since(self.banner_at) >= BANNER_INTERVAL {
            self.banner = (self.banner + 1) % len;
            self.banner_at = now;
        }
    }

    pub fn apply_bg(&mut self, result: BgResult) {
        match result {
            BgResult::Strategy { tournament_id, text } => {
                if let Some(Modal::Scout(s)) = &mut self.modal {
                    if s.tournament_id == tournament_id {
                        s.text = Some(text);
                    }
                }
            }
            BgResult::Published(outcome) => {
                if let Some(Modal::Admin(a)) = &mut self.modal {
                    a.publishing = false;
                }
                self.notice = Some(outcome.message);
            }
            BgResult::Refreshed(loaded) => {
                self.refreshing = false;
                self.notice = Some(format!(
                    "Loaded {} matches from {}",
                    loaded.data.tournaments.len(),
                    loaded.origin.label()
                ));
                self.set_data(loaded.data);
                self.origin = loaded.origin;
            }
            BgResult::Exported(Ok(path)) => {
                self.notice = Some(format!("Exported to {}", path.display()));
            }
            BgResult::Exported(Err(e)) => {
                self.notice = Some(format!("Export failed: {e}"));
            }
        }
    }

    fn set_data(&mut self, data: AppData) {
        self.data = data;
        self.selected = self.selected.min(self.data.tournaments.len().saturating_sub(1));
        if self.banner >= self.data.config.banners.len() {
            self.banner = 0;
        }
    }

    pub fn handle_key(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return None;
        }
        self.notice = None;

        let Some(modal) = self.modal.take() else {
            return self.key_main(key);
        };
        let (modal, action) = match modal {
            Modal::Onboarding(form) => self.key_onboarding(form, key),
            Modal::Register(st) => self.key_register(st, key),
            Modal::Scout(st) => self.key_scout(st, key),
            Modal::AdminLogin(form) => self.key_admin_login(form, key),
            Modal::Admin(st) => self.key_admin(st, key),
        };
        self.modal = modal;
        action
    }

    fn key_main(&mut self, key: KeyEvent) -> Option<Action> {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if key.code == KeyCode::Char('r') && !self.refreshing {
                self.refreshing = true;
                return Some(Action::Refresh);
            }
            return None;
        }
        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Tab => {
                self.tab = match self.tab {
                    Tab::Home => Tab::History,
                    Tab::History => Tab::Home,
                };
            }
            KeyCode::Char('1') => self.tab = Tab::Home,
            KeyCode::Char('2') => self.tab = Tab::History,
            KeyCode::Up | KeyCode::Char('k') if self.tab == Tab::Home => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') if self.tab == Tab::Home => {
                if self.selected + 1 < self.data.tournaments.len() {
                    self.selected += 1;
                }
            }
            KeyCode::Enter if self.tab == Tab::History => {
                if self.history.is_empty() {
                    self.tab = Tab::Home;
                }
            }
            KeyCode::Enter => self.start_registration(),
            KeyCode::Char('s') if self.tab == Tab::Home => {
                let t = self.selected_tournament()?;
                let st = ScoutState {
                    tournament_id: t.id.clone(),
                    map: t.map.clone(),
                    mode: t.match_type.label().to_string(),
                    text: None,
                };
                let action = Action::FetchStrategy {
                    tournament_id: st.tournament_id.clone(),
                    map: st.map.clone(),
                    mode: st.mode.clone(),
                };
                self.modal = Some(Modal::Scout(st));
                return Some(action);
            }
            KeyCode::Char('p') => {
                let current = self
                    .profile
                    .as_ref()
                    .map(ProfileForm::from_profile)
                    .unwrap_or_default();
                self.modal = Some(Modal::Onboarding(profile_form(&current)));
            }
            KeyCode::Char('a') => {
                if self.gate.is_enabled() {
                    self.modal = Some(Modal::AdminLogin(Form::new(vec![
                        Field::new("Admin PIN", "").secret(),
                    ])));
                } else {
                    self.notice =
                        Some("Admin panel is disabled (no passcode configured)".to_string());
                }
            }
            _ => {}
        }
        None
    }

    fn start_registration(&mut self) {
        let (Some(t), Some(profile)) = (self.selected_tournament(), self.profile.as_ref()) else {
            return;
        };
        match Registration::start(t, profile, &self.data.config) {
            Ok(reg) => {
                let details = Form::new(vec![
                    Field::new("Full Name", &profile.name).required(),
                    Field::new("IGN", &profile.ign).required(),
                    Field::new("UID", &profile.uid).required().numeric(),
                ]);
                self.modal = Some(Modal::Register(RegisterState { reg, details }));
            }
            Err(e) => self.notice = Some(format!("MATCH FULL: {e}")),
        }
    }

    fn key_onboarding(&mut self, mut form: Form, key: KeyEvent) -> KeyOutcome {
        match form.handle_key(key) {
            FormEvent::Submit => {
                let input = ProfileForm {
                    name: form.value(0).to_string(),
                    ign: form.value(1).to_string(),
                    uid: form.value(2).to_string(),
                    level: form.value(3).to_string(),
                    whatsapp: form.value(4).to_string(),
                    upi_id: form.value(5).to_string(),
                };
                match input.submit() {
                    Ok(profile) => {
                        match self.store.save_profile(&profile) {
                            Ok(()) => tracing::info!(ign = %profile.ign, "Profile saved"),
                            Err(e) => {
                                tracing::error!(error = %e, "Failed to save profile");
                                self.notice = Some(format!("Could not save profile: {e}"));
                            }
                        }
                        self.profile = Some(profile);
                        (None, None)
                    }
                    Err(e) => {
                        self.notice = Some(e.to_string());
                        (Some(Modal::Onboarding(form)), None)
                    }
                }
            }
            // First run: there is nothing behind the form to go back to.
            FormEvent::Cancel if self.profile.is_some() => (None, None),
            _ => (Some(Modal::Onboarding(form)), None),
        }
    }

    fn key_register(&mut self, mut st: RegisterState, key: KeyEvent) -> KeyOutcome {
        match st.reg.step() {
            Step::Rules => match key.code {
                KeyCode::Enter => {
                    st.reg.advance();
                }
                KeyCode::Esc => return (None, None),
                _ => {}
            },
            Step::Details => match st.details.handle_key(key) {
                FormEvent::Submit => {
                    let missing: Vec<&str> = st
                        .details
                        .fields
                        .iter()
                        .filter(|f| f.required && f.value.trim().is_empty())
                        .map(|f| f.label.as_str())
                        .collect();
                    if missing.is_empty() {
                        let p = st.reg.profile_mut();
                        p.name = st.details.value(0).trim().to_string();
                        p.ign = st.details.value(1).trim().to_string();
                        p.uid = st.details.value(2).trim().to_string();
                        st.reg.advance();
                    } else {
                        self.notice = Some(format!("Required: {}", missing.join(", ")));
                    }
                }
                FormEvent::Cancel => {
                    st.reg.back();
                }
                _ => {}
            },
            Step::Payment => match key.code {
                KeyCode::Enter => return (None, self.finish_registration(&st.reg)),
                KeyCode::Char('o') => {
                    let qr = st.reg.qr_url();
                    return (Some(Modal::Register(st)), Some(Action::OpenUrl(qr)));
                }
                KeyCode::Esc => {
                    st.reg.back();
                }
                _ => {}
            },
        }
        (Some(Modal::Register(st)), None)
    }

    fn finish_registration(&mut self, reg: &Registration) -> Option<Action> {
        let entry = reg.complete().ok()?;
        tracing::info!(
            tournament = %entry.tournament_id,
            fee = entry.entry_fee,
            "Registration sent"
        );
        match self.store.record_join(entry.clone()) {
            Ok(history) => self.history = history,
            Err(e) => {
                tracing::error!(error = %e, "Failed to record join");
                self.history.insert(0, entry);
            }
        }
        self.tab = Tab::History;
        Some(Action::OpenUrl(reg.whatsapp_url()))
    }

    fn key_scout(&mut self, mut st: ScoutState, key: KeyEvent) -> KeyOutcome {
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => (None, None),
            KeyCode::Char('r') if st.text.is_some() => {
                st.text = None;
                let action = Action::FetchStrategy {
                    tournament_id: st.tournament_id.clone(),
                    map: st.map.clone(),
                    mode: st.mode.clone(),
                };
                (Some(Modal::Scout(st)), Some(action))
            }
            _ => (Some(Modal::Scout(st)), None),
        }
    }

    fn key_admin_login(&mut self, mut form: Form, key: KeyEvent) -> KeyOutcome {
        match form.handle_key(key) {
            FormEvent::Submit => match self.gate.unlock(form.value(0), &self.data) {
                Ok(editor) => (Some(Modal::Admin(Box::new(self.admin_state(editor)))), None),
                Err(e) => {
                    self.notice = Some(e.to_string());
                    form.fields[0].value.clear();
                    (Some(Modal::AdminLogin(form)), None)
                }
            },
            FormEvent::Cancel => (None, None),
            _ => (Some(Modal::AdminLogin(form)), None),
        }
    }

    fn admin_state(&self, editor: AdminEditor) -> AdminState {
        let settings = settings_form(editor.draft());
        let gh = self.store.github_config().ok().flatten().unwrap_or_else(|| GitHubConfig {
            path: DATA_FILE.to_string(),
            branch: "main".to_string(),
            ..Default::default()
        });
        let sync = Form::new(vec![
            Field::new("Token", &gh.token).required().secret(),
            Field::new("Owner", &gh.owner).required(),
            Field::new("Repo", &gh.repo).required(),
            Field::new("Path", &gh.path).required(),
            Field::new("Branch", &gh.branch),
        ]);
        AdminState {
            editor,
            tab: AdminTab::Matches,
            selected: 0,
            edit: None,
            settings,
            sync,
            publishing: false,
        }
    }

    fn key_admin(&mut self, mut st: Box<AdminState>, key: KeyEvent) -> KeyOutcome {
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            match key.code {
                KeyCode::Char('n') | KeyCode::Right => {
                    let next = st.tab.step(true);
                    st.switch_tab(next);
                }
                KeyCode::Char('p') | KeyCode::Left => {
                    let prev = st.tab.step(false);
                    st.switch_tab(prev);
                }
                KeyCode::Char('a') => {
                    apply_settings(&mut st.editor, &st.settings);
                    self.set_data(st.editor.draft().clone());
                    tracing::info!(matches = self.data.tournaments.len(), "Applied admin draft");
                    self.notice = Some(
                        "Draft applied to this client. Publish to update everyone.".to_string(),
                    );
                }
                KeyCode::Char('b') if st.tab == AdminTab::Settings => {
                    let n = st.settings.fields.len() - 1;
                    st.settings.push(Field::new(&format!("Banner {n}"), ""));
                    st.settings.focus = st.settings.fields.len() - 1;
                }
                KeyCode::Char('x') if st.tab == AdminTab::Settings && st.settings.focus >= 2 => {
                    let focus = st.settings.focus;
                    st.settings.remove(focus);
                    relabel_banners(&mut st.settings);
                }
                _ => {}
            }
            return (Some(Modal::Admin(st)), None);
        }
        if let KeyCode::F(n @ 1..=4) = key.code {
            st.switch_tab(AdminTab::ALL[usize::from(n) - 1]);
            return (Some(Modal::Admin(st)), None);
        }

        let action = match st.tab {
            AdminTab::Matches => {
                if self.key_admin_matches(&mut st, key) {
                    return (None, None);
                }
                None
            }
            AdminTab::Settings => match st.settings.handle_key(key) {
                FormEvent::Submit => {
                    apply_settings(&mut st.editor, &st.settings);
                    self.notice = Some("Settings saved to draft".to_string());
                    None
                }
                FormEvent::Cancel => return (None, None),
                _ => None,
            },
            AdminTab::Export => match key.code {
                KeyCode::Esc | KeyCode::Char('q') => return (None, None),
                KeyCode::Char('w') => Some(Action::Export {
                    path: self.export_path.clone(),
                    json: st.editor.export_json(),
                }),
                _ => None,
            },
            AdminTab::Sync => match st.sync.handle_key(key) {
                FormEvent::Submit if st.publishing => None,
                FormEvent::Submit => {
                    let config = GitHubConfig {
                        token: st.sync.value(0).trim().to_string(),
                        owner: st.sync.value(1).trim().to_string(),
                        repo: st.sync.value(2).trim().to_string(),
                        path: st.sync.value(3).trim().to_string(),
                        branch: match st.sync.value(4).trim() {
                            "" => "main".to_string(),
                            b => b.to_string(),
                        },
                    };
                    if let Err(e) = self.store.save_github_config(&config) {
                        tracing::error!(error = %e, "Failed to save GitHub config");
                    }
                    st.publishing = true;
                    self.notice = Some("Publishing...".to_string());
                    Some(Action::Publish { config, data: st.editor.draft().clone() })
                }
                FormEvent::Cancel => return (None, None),
                _ => None,
            },
        };
        (Some(Modal::Admin(st)), action)
    }

    /// Returns true when the panel should close.
    fn key_admin_matches(&mut self, st: &mut AdminState, key: KeyEvent) -> bool {
        if let Some((id, mut form)) = st.edit.take() {
            match form.handle_key(key) {
                FormEvent::Submit => match parse_patch(&form) {
                    Ok(patch) => {
                        if let Err(e) = st.editor.update_tournament(&id, patch) {
                            self.notice = Some(e.to_string());
                        }
                    }
                    Err(e) => {
                        self.notice = Some(e);
                        st.edit = Some((id, form));
                    }
                },
                FormEvent::Cancel => {}
                _ => st.edit = Some((id, form)),
            }
            return false;
        }

        let count = st.editor.draft().tournaments.len();
        match key.code {
            KeyCode::Esc | KeyCode::Char('q') => return true,
            KeyCode::Up | KeyCode::Char('k') => st.selected = st.selected.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => {
                if st.selected + 1 < count {
                    st.selected += 1;
                }
            }
            KeyCode::Char('n') => {
                st.editor.add_tournament();
                st.selected = 0;
            }
            KeyCode::Char('d') => {
                let selected = st.editor.draft().tournaments.get(st.selected);
                if let Some(id) = selected.map(|t| t.id.clone()) {
                    if let Ok(t) = st.editor.delete_tournament(&id) {
                        self.notice = Some(format!("Deleted {}", t.title));
                    }
                    let count = st.editor.draft().tournaments.len();
                    st.selected = st.selected.min(count.saturating_sub(1));
                }
            }
            KeyCode::Char('t') => {
                if let Some(t) = st.editor.draft().tournaments.get(st.selected) {
                    let (id, next) = (t.id.clone(), t.match_type.next());
                    let _ = st.editor.update_tournament(
                        &id,
                        TournamentPatch { match_type: Some(next), ..Default::default() },
                    );
                }
            }
            KeyCode::Enter | KeyCode::Char('e') => {
                if let Some(t) = st.editor.draft().tournaments.get(st.selected) {
                    st.edit = Some((t.id.clone(), tournament_form(t)));
                }
            }
            _ => {}
        }
        false
    }
}

fn profile_form(p: &ProfileForm) -> Form {
    Form::new(vec![
        Field::new("Full Name", &p.name).required(),
        Field::new("In-Game Name (IGN)", &p.ign).required(),
        Field::new("Player UID", &p.uid).required().numeric(),
        Field::new("Level", &p.level).numeric(),
        Field::new("WhatsApp", &p.whatsapp).required().numeric(),
        Field::new("UPI ID (optional)", &p.upi_id),
    ])
}

fn settings_form(data: &AppData) -> Form {
    let mut form = Form::new(vec![
        Field::new("UPI ID", &data.config.upi_id),
        Field::new("WhatsApp", &data.config.whatsapp).numeric(),
    ]);
    for (i, url) in data.config.banners.iter().enumerate() {
        form.push(Field::new(&format!("Banner {}", i + 1), url));
    }
    form
}

fn relabel_banners(form: &mut Form) {
    for (i, f) in form.fields.iter_mut().skip(2).enumerate() {
        f.label = format!("Banner {}", i + 1);
    }
}

fn apply_settings(editor: &mut AdminEditor, form: &Form) {
    editor.set_upi_id(form.value(0).trim());
    editor.set_whatsapp(form.value(1).trim());
    let banners: Vec<&str> = form.fields.iter().skip(2).map(|f| f.value.trim()).collect();
    while editor.draft().config.banners.len() > banners.len() {
        let last = editor.draft().config.banners.len() - 1;
        let _ = editor.remove_banner(last);
    }
    while editor.draft().config.banners.len() < banners.len() {
        editor.add_banner();
    }
    for (i, url) in banners.into_iter().enumerate() {
        let _ = editor.set_banner(i, url);
    }
}

fn tournament_form(t: &Tournament) -> Form {
    Form::new(vec![
        Field::new("Title", &t.title).required(),
        Field::new("Type (Solo/Duo/Squad)", t.match_type.label()).required(),
        Field::new("Entry Fee", &t.entry_fee.to_string()).numeric(),
        Field::new("Prize Pool", &t.prize_pool.to_string()).numeric(),
        Field::new("Date (YYYY-MM-DD)", &t.date),
        Field::new("Time (HH:MM)", &t.time),
        Field::new("Joined Slots", &t.joined_slots.to_string()).numeric(),
        Field::new("Total Slots", &t.total_slots.to_string()).numeric(),
        Field::new("Map", &t.map),
        Field::new("Rules", &t.rules),
    ])
}

fn parse_patch(form: &Form) -> Result<TournamentPatch, String> {
    let number = |idx: usize| -> Result<u32, String> {
        let raw = form.value(idx).trim();
        if raw.is_empty() {
            return Ok(0);
        }
        raw.parse()
            .map_err(|_| format!("{} must be a number", form.fields[idx].label))
    };
    let match_type = MatchType::ALL
        .into_iter()
        .find(|m| m.label().eq_ignore_ascii_case(form.value(1).trim()))
        .ok_or_else(|| "Type must be Solo, Duo or Squad".to_string())?;
    let title = form.value(0).trim();
    if title.is_empty() {
        return Err("Title is required".to_string());
    }
    Ok(TournamentPatch {
        title: Some(title.to_string()),
        match_type: Some(match_type),
        entry_fee: Some(number(2)?),
        prize_pool: Some(number(3)?),
        date: Some(form.value(4).trim().to_string()),
        time: Some(form.value(5).trim().to_string()),
        joined_slots: Some(number(6)?),
        total_slots: Some(number(7)?),
        map: Some(form.value(8).trim().to_string()),
        rules: Some(form.value(9).trim().to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use ffhub_sdk::model::JoinStatus;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn type_str(app: &mut App, s: &str) {
        for c in s.chars() {
            app.handle_key(key(KeyCode::Char(c)));
        }
    }

    fn loaded() -> Loaded {
        Loaded { data: AppData::fallback(), origin: Origin::Fallback }
    }

    fn onboarded() -> App {
        let store = Store::in_memory().unwrap();
        store
            .save_profile(&UserProfile {
                name: "Asha".into(),
                ign: "SKY_LORD_99".into(),
                uid: "1234567890".into(),
                level: "62".into(),
                whatsapp: "9000000000".into(),
                upi_id: None,
            })
            .unwrap();
        App::new(loaded(), store, AdminGate::new(Some("1645".into())))
    }

    #[test]
    fn first_run_requires_onboarding() {
        let mut app = App::new(loaded(), Store::in_memory().unwrap(), AdminGate::new(None));
        assert!(matches!(app.modal, Some(Modal::Onboarding(_))));

        // Esc can't skip it, Enter with blanks reports missing fields.
        app.handle_key(key(KeyCode::Esc));
        assert!(matches!(app.modal, Some(Modal::Onboarding(_))));
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(
            app.notice.as_deref(),
            Some("required fields missing: name, ign, uid, whatsapp")
        );

        type_str(&mut app, "Asha");
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "SKY");
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "123");
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "9000000000");
        app.handle_key(key(KeyCode::Enter));

        assert!(app.modal.is_none());
        assert_eq!(app.profile.as_ref().unwrap().ign, "SKY");
        assert_eq!(app.store.profile().unwrap().unwrap().whatsapp, "9000000000");
    }

    #[derive(Clone, Default)]
    struct LogBuf(std::sync::Arc<std::sync::Mutex<Vec<u8>>>);

    impl std::io::Write for LogBuf {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn onboarding_logs_save_once() {
        let buf = LogBuf::default();
        let writer = buf.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();

        let app = tracing::subscriber::with_default(subscriber, || {
            let mut app = App::new(loaded(), Store::in_memory().unwrap(), AdminGate::new(None));
            for (i, value) in ["Asha", "SKY", "123", "", "9000000000"].into_iter().enumerate() {
                if i > 0 {
                    app.handle_key(key(KeyCode::Tab));
                }
                type_str(&mut app, value);
            }
            app.handle_key(key(KeyCode::Enter));
            app
        });

        let logs = String::from_utf8(buf.0.lock().unwrap().clone()).unwrap();
        assert_eq!(logs.matches("Profile saved").count(), 1);
        assert!(!logs.contains("Failed to save profile"));
        assert!(app.notice.is_none());
        assert!(app.store.profile().unwrap().is_some());
    }

    #[test]
    fn full_registration_records_pending_join() {
        let mut app = onboarded();
        app.handle_key(key(KeyCode::Down));
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.modal, Some(Modal::Register(_))));

        app.handle_key(key(KeyCode::Enter)); // rules -> details
        app.handle_key(key(KeyCode::Tab));
        app.handle_key(key(KeyCode::Char('X')));
        app.handle_key(key(KeyCode::Enter)); // details -> payment
        let Some(Modal::Register(st)) = &app.modal else { panic!("wizard closed") };
        assert_eq!(st.reg.step(), Step::Payment);
        assert_eq!(st.reg.profile().ign, "SKY_LORD_99X");

        let action = app.handle_key(key(KeyCode::Enter));
        let Some(Action::OpenUrl(url)) = action else { panic!("expected whatsapp url") };
        assert!(url.starts_with("https://wa.me/9867637326?text="));
        assert!(url.contains("SKY_LORD_99X"));

        assert!(app.modal.is_none());
        assert_eq!(app.tab, Tab::History);
        assert_eq!(app.history[0].tournament_id, "t2");
        assert_eq!(app.history[0].status, JoinStatus::Pending);
        assert_eq!(app.store.history().unwrap().len(), 1);
        // Stored profile is untouched by wizard edits.
        assert_eq!(app.profile.as_ref().unwrap().ign, "SKY_LORD_99");
    }

    #[test]
    fn full_match_is_not_joinable() {
        let mut app = onboarded();
        app.data.tournaments[0].joined_slots = 48;
        app.handle_key(key(KeyCode::Enter));
        assert!(app.modal.is_none());
        assert!(app.notice.as_deref().unwrap().starts_with("MATCH FULL"));
    }

    #[test]
    fn scout_requests_and_receives_strategy() {
        let mut app = onboarded();
        let action = app.handle_key(key(KeyCode::Char('s')));
        assert_eq!(
            action,
            Some(Action::FetchStrategy {
                tournament_id: "t1".into(),
                map: "Bermuda".into(),
                mode: "Squad".into(),
            })
        );
        // Regenerate is ignored while loading.
        assert!(app.handle_key(key(KeyCode::Char('r'))).is_none());

        app.apply_bg(BgResult::Strategy {
            tournament_id: "t1".into(),
            text: "• Drop Clock Tower".into(),
        });
        let Some(Modal::Scout(st)) = &app.modal else { panic!() };
        assert_eq!(st.text.as_deref(), Some("• Drop Clock Tower"));
        assert!(app.handle_key(key(KeyCode::Char('r'))).is_some());
    }

    #[test]
    fn banner_rotates_on_interval() {
        let mut app = onboarded();
        let start = app.banner_at;
        app.tick(start + Duration::from_secs(1));
        assert_eq!(app.banner, 0);
        app.tick(start + BANNER_INTERVAL);
        assert_eq!(app.banner, 1);
        app.tick(start + BANNER_INTERVAL * 2);
        app.tick(start + BANNER_INTERVAL * 3);
        assert_eq!(app.banner, 0);

        app.data.config.banners.clear();
        app.tick(start + BANNER_INTERVAL * 10);
        assert_eq!(app.banner, 0);
    }

    #[test]
    fn admin_wrong_then_right_passcode() {
        let mut app = onboarded();
        app.handle_key(key(KeyCode::Char('a')));
        type_str(&mut app, "0000");
        app.handle_key(key(KeyCode::Enter));
        assert_eq!(app.notice.as_deref(), Some("Wrong passcode!"));
        assert!(matches!(app.modal, Some(Modal::AdminLogin(_))));

        type_str(&mut app, "1645");
        app.handle_key(key(KeyCode::Enter));
        assert!(matches!(app.modal, Some(Modal::Admin(_))));
    }

    #[test]
    fn admin_disabled_without_passcode() {
        let store = Store::in_memory().unwrap();
        store
            .save_profile(&UserProfile {
                name: "a".into(),
                ign: "b".into(),
                uid: "1".into(),
                whatsapp: "2".into(),
                ..Default::default()
            })
            .unwrap();
        let mut app = App::new(loaded(), store, AdminGate::new(None));
        app.handle_key(key(KeyCode::Char('a')));
        assert!(app.modal.is_none());
        assert!(app.notice.is_some());
    }

    fn unlocked() -> App {
        let mut app = onboarded();
        app.handle_key(key(KeyCode::Char('a')));
        type_str(&mut app, "1645");
        app.handle_key(key(KeyCode::Enter));
        app
    }

    fn admin(app: &App) -> &AdminState {
        match &app.modal {
            Some(Modal::Admin(a)) => a,
            _ => panic!("admin panel not open"),
        }
    }

    #[test]
    fn admin_edit_then_apply() {
        let mut app = unlocked();
        app.handle_key(key(KeyCode::Char('n')));
        assert_eq!(admin(&app).editor.draft().tournaments.len(), 3);
        // Running data is untouched until applied.
        assert_eq!(app.data.tournaments.len(), 2);

        app.handle_key(key(KeyCode::Enter)); // edit new match
        for _ in 0.."New Match".len() {
            app.handle_key(key(KeyCode::Backspace));
        }
        type_str(&mut app, "Night Cup");
        app.handle_key(key(KeyCode::Enter));
        assert!(admin(&app).edit.is_none());
        assert_eq!(admin(&app).editor.draft().tournaments[0].title, "Night Cup");

        app.handle_key(key(KeyCode::Char('t')));
        assert_eq!(admin(&app).editor.draft().tournaments[0].match_type, MatchType::Duo);

        app.handle_key(ctrl('a'));
        assert_eq!(app.data.tournaments.len(), 3);
        assert_eq!(app.data.tournaments[0].title, "Night Cup");
    }

    #[test]
    fn admin_settings_and_banners() {
        let mut app = unlocked();
        app.handle_key(key(KeyCode::F(2)));
        assert_eq!(admin(&app).tab, AdminTab::Settings);

        app.handle_key(ctrl('b'));
        type_str(&mut app, "https://example.com/b4.png");
        // Drop the first banner.
        {
            let Some(Modal::Admin(a)) = &mut app.modal else { panic!() };
            a.settings.focus = 2;
        }
        app.handle_key(ctrl('x'));
        app.handle_key(key(KeyCode::Enter));

        let banners = &admin(&app).editor.draft().config.banners;
        assert_eq!(banners.len(), 3);
        assert_eq!(banners[0], "https://picsum.photos/seed/ff2/800/400");
        assert_eq!(banners[2], "https://example.com/b4.png");
        assert_eq!(admin(&app).settings.fields[4].label, "Banner 3");
    }

    #[test]
    fn admin_settings_kept_without_enter() {
        let mut app = unlocked();
        app.handle_key(key(KeyCode::F(2)));
        type_str(&mut app, "x");
        // Leaving the tab keeps the edit.
        app.handle_key(key(KeyCode::F(1)));
        assert_eq!(admin(&app).editor.draft().config.upi_id, "pawanponnam-1@okicicix");

        app.handle_key(ctrl('n'));
        assert_eq!(admin(&app).tab, AdminTab::Settings);
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "1");
        app.handle_key(ctrl('a'));
        assert_eq!(app.data.config.whatsapp, "98676373261");
        assert_eq!(app.data.config.upi_id, "pawanponnam-1@okicicix");
    }

    #[test]
    fn admin_sync_saves_config_and_publishes_draft() {
        let mut app = unlocked();
        app.handle_key(key(KeyCode::F(4)));
        type_str(&mut app, "ghp_x");
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "hub");
        app.handle_key(key(KeyCode::Tab));
        type_str(&mut app, "data");
        let action = app.handle_key(key(KeyCode::Enter));
        let Some(Action::Publish { config, data }) = action else { panic!("expected publish") };
        assert_eq!(config.path, "tournaments.json");
        assert_eq!(config.branch, "main");
        assert_eq!(data, AppData::fallback());
        assert!(admin(&app).publishing);
        assert_eq!(app.store.github_config().unwrap(), Some(config));

        // No double publish while in flight.
        assert!(app.handle_key(key(KeyCode::Enter)).is_none());
        app.apply_bg(BgResult::Published(PublishOutcome {
            success: true,
            message: "Successfully published to GitHub!".into(),
        }));
        assert!(!admin(&app).publishing);
        assert_eq!(app.notice.as_deref(), Some("Successfully published to GitHub!"));
    }

    #[test]
    fn admin_export_writes_to_data_file() {
        let mut app = unlocked();
        app.handle_key(key(KeyCode::F(3)));
        let Some(Action::Export { path, json }) = app.handle_key(key(KeyCode::Char('w'))) else {
            panic!("expected export")
        };
        assert_eq!(path, PathBuf::from("tournaments.json"));
        assert_eq!(serde_json::from_str::<AppData>(&json).unwrap(), AppData::fallback());
    }

    #[test]
    fn refresh_replaces_data_and_clamps_selection() {
        let mut app = onboarded();
        app.selected = 1;
        assert_eq!(app.handle_key(ctrl('r')), Some(Action::Refresh));
        assert!(app.handle_key(ctrl('r')).is_none());

        let mut data = AppData::fallback();
        data.tournaments.truncate(1);
        app.apply_bg(BgResult::Refreshed(Loaded {
            data,
            origin: Origin::Remote("https://hub.example/tournaments.json".into()),
        }));
        assert!(!app.refreshing);
        assert_eq!(app.selected, 0);
        assert!(app.notice.as_deref().unwrap().contains("remote https://hub.example"));
    }

    #[test]
    fn parse_patch_rejects_bad_type() {
        let t = &AppData::fallback().tournaments[0];
        let mut form = tournament_form(t);
        form.fields[1].value = "Trio".into();
        assert!(parse_patch(&form).is_err());
        form.fields[1].value = "squad".into();
        let patch = parse_patch(&form).unwrap();
        assert_eq!(patch.match_type, Some(MatchType::Squad));
        assert_eq!(patch.total_slots, Some(48));
    }
}
