//! Three-step join wizard: rules, player details, payment.
//!
//! Payment happens outside the app. The player pays the hub's UPI id and then
//! sends a prefilled WhatsApp message; the join is recorded locally as
//! `Pending` until the admin confirms it by hand.

use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

use crate::model::{AppConfig, JoinStatus, JoinedHistory, Tournament, UserProfile};

/// Payee display name in UPI links.
const PAYEE_NAME: &str = "FF_Hub";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Rules,
    Details,
    Payment,
}

impl Step {
    pub fn number(&self) -> u8 {
        match self {
            Step::Rules => 1,
            Step::Details => 2,
            Step::Payment => 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RegistrationError {
    #[error("{0} is full")]
    Full(String),
    #[error("registration can only be completed from the payment step")]
    NotAtPayment,
}

#[derive(Debug, Clone)]
pub struct Registration {
    tournament: Tournament,
    config: AppConfig,
    profile: UserProfile,
    step: Step,
}

impl Registration {
    /// Begin registering. The profile is copied so edits made in the
    /// details step don't touch the stored one.
    pub fn start(
        tournament: &Tournament,
        profile: &UserProfile,
        config: &AppConfig,
    ) -> Result<Self, RegistrationError> {
        if tournament.is_full() {
            return Err(RegistrationError::Full(tournament.title.clone()));
        }
        Ok(Self {
            tournament: tournament.clone(),
            config: config.clone(),
            profile: profile.clone(),
            step: Step::Rules,
        })
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    pub fn profile(&self) -> &UserProfile {
        &self.profile
    }

    pub fn profile_mut(&mut self) -> &mut UserProfile {
        &mut self.profile
    }

    pub fn advance(&mut self) -> Step {
        self.step = match self.step {
            Step::Rules => Step::Details,
            Step::Details | Step::Payment => Step::Payment,
        };
        self.step
    }

    pub fn back(&mut self) -> Step {
        self.step = match self.step {
            Step::Rules | Step::Details => Step::Rules,
            Step::Payment => Step::Details,
        };
        self.step
    }

    pub fn upi_link(&self) -> String {
        format!(
            "upi://pay?pa={}&pn={PAYEE_NAME}&am={}&cu=INR",
            self.config.upi_id, self.tournament.entry_fee
        )
    }

    pub fn qr_url(&self) -> String {
        format!(
            "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data={}",
            encode(&self.upi_link())
        )
    }

    pub fn whatsapp_text(&self) -> String {
        format!(
            "*NEW REGISTRATION*\n\n\
Player: {}\n\
IGN: {}\n\
UID: {}\n\
Match: {}\n\
Fee Paid: ₹{}\n\n\
I have paid the entry fee via UPI. Please confirm my slot.",
            self.profile.name,
            self.profile.ign,
            self.profile.uid,
            self.tournament.title,
            self.tournament.entry_fee
        )
    }

    pub fn whatsapp_url(&self) -> String {
        format!(
            "https://wa.me/{}?text={}",
            self.config.whatsapp,
            encode(&self.whatsapp_text())
        )
    }

    /// Finish and produce the history entry to record.
    pub fn complete(&self) -> Result<JoinedHistory, RegistrationError> {
        if self.step != Step::Payment {
            return Err(RegistrationError::NotAtPayment);
        }
        Ok(JoinedHistory {
            tournament_id: self.tournament.id.clone(),
            tournament_title: self.tournament.title.clone(),
            date: self.tournament.date.clone(),
            entry_fee: self.tournament.entry_fee,
            status: JoinStatus::Pending,
            joined_at: chrono::Utc::now().timestamp_millis(),
            screenshot_verified: None,
        })
    }
}

/// Component encoding: everything except ASCII alphanumerics and `-_.!~*'()`.
fn encode(s: &str) -> String {
    const COMPONENT: &percent_encoding::AsciiSet = &NON_ALPHANUMERIC
        .remove(b'-')
        .remove(b'_')
        .remove(b'.')
        .remove(b'!')
        .remove(b'~')
        .remove(b'*')
        .remove(b'\'')
        .remove(b'(')
        .remove(b')');
    utf8_percent_encode(s, COMPONENT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AppData;

    fn profile() -> UserProfile {
        UserProfile {
            name: "Asha Rao".into(),
            ign: "SKY_LORD_99".into(),
            uid: "1234567890".into(),
            level: "62".into(),
            whatsapp: "9000000000".into(),
            upi_id: None,
        }
    }

    fn start() -> Registration {
        let data = AppData::fallback();
        Registration::start(&data.tournaments[1], &profile(), &data.config).unwrap()
    }

    #[test]
    fn steps_advance_and_go_back() {
        let mut reg = start();
        assert_eq!(reg.step(), Step::Rules);
        assert_eq!(reg.back(), Step::Rules);
        assert_eq!(reg.advance(), Step::Details);
        assert_eq!(reg.advance(), Step::Payment);
        assert_eq!(reg.advance(), Step::Payment);
        assert_eq!(reg.back(), Step::Details);
        assert_eq!(reg.step().number(), 2);
    }

    #[test]
    fn full_tournament_cannot_be_joined() {
        let data = AppData::fallback();
        let mut t = data.tournaments[0].clone();
        t.joined_slots = t.total_slots;
        let err = Registration::start(&t, &profile(), &data.config).unwrap_err();
        assert_eq!(err, RegistrationError::Full("Diamond Cup - Season 1".into()));
    }

    #[test]
    fn payment_links() {
        let reg = start();
        assert_eq!(reg.upi_link(), "upi://pay?pa=pawanponnam-1@okicici&pn=FF_Hub&am=30&cu=INR");
        assert_eq!(
            reg.qr_url(),
            "https://api.qrserver.com/v1/create-qr-code/?size=200x200&data=\
upi%3A%2F%2Fpay%3Fpa%3Dpawanponnam-1%40okicici%26pn%3DFF_Hub%26am%3D30%26cu%3DINR"
        );
    }

    #[test]
    fn whatsapp_message_uses_edited_profile() {
        let mut reg = start();
        reg.advance();
        reg.profile_mut().ign = "NEW_IGN".into();
        let text = reg.whatsapp_text();
        assert!(text.starts_with("*NEW REGISTRATION*\n\nPlayer: Asha Rao\nIGN: NEW_IGN\n"));
        assert!(text.contains("Match: Solo Rush Night\nFee Paid: ₹30\n\n"));

        let url = reg.whatsapp_url();
        assert!(url.starts_with("https://wa.me/9867637326?text=*NEW%20REGISTRATION*%0A%0APlayer%3A%20Asha%20Rao"));
        assert!(url.contains("%E2%82%B930"));
    }

    #[test]
    fn complete_only_from_payment() {
        let mut reg = start();
        assert_eq!(reg.complete().unwrap_err(), RegistrationError::NotAtPayment);
        reg.advance();
        reg.advance();
        let entry = reg.complete().unwrap();
        assert_eq!(entry.tournament_id, "t2");
        assert_eq!(entry.entry_fee, 30);
        assert_eq!(entry.status, JoinStatus::Pending);
        assert!(entry.joined_at > 0);
    }
}
