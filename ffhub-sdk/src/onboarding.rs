//! First-run profile form.

use crate::model::UserProfile;

/// Raw form input, one string per field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileForm {
    pub name: String,
    pub ign: String,
    pub uid: String,
    pub level: String,
    pub whatsapp: String,
    pub upi_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OnboardingError {
    #[error("required fields missing: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

impl ProfileForm {
    pub fn from_profile(profile: &UserProfile) -> Self {
        Self {
            name: profile.name.clone(),
            ign: profile.ign.clone(),
            uid: profile.uid.clone(),
            level: profile.level.clone(),
            whatsapp: profile.whatsapp.clone(),
            upi_id: profile.upi_id.clone().unwrap_or_default(),
        }
    }

    /// Names of required fields that are blank, in form order.
    pub fn missing(&self) -> Vec<&'static str> {
        [
            ("name", &self.name),
            ("ign", &self.ign),
            ("uid", &self.uid),
            ("whatsapp", &self.whatsapp),
        ]
        .into_iter()
        .filter(|(_, v)| v.trim().is_empty())
        .map(|(k, _)| k)
        .collect()
    }

    /// Validate and build the profile. Level and UPI id are optional.
    pub fn submit(&self) -> Result<UserProfile, OnboardingError> {
        let missing = self.missing();
        if !missing.is_empty() {
            return Err(OnboardingError::MissingFields(missing));
        }
        let upi = self.upi_id.trim();
        Ok(UserProfile {
            name: self.name.trim().to_string(),
            ign: self.ign.trim().to_string(),
            uid: self.uid.trim().to_string(),
            level: self.level.trim().to_string(),
            whatsapp: self.whatsapp.trim().to_string(),
            upi_id: (!upi.is_empty()).then(|| upi.to_string()),
        })
    }
}
