//! Account-management view models.
//!
//! Passive data holders shaped for the manage pages; construction is the
//! only behavior they carry.

use serde::Serialize;

use crate::domain::entities::UserProfileRecord;

/// Summary block for the manage index page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountOverview {
    pub display_name: String,
    pub email: String,
    pub email_confirmed: bool,
    pub phone_number: Option<String>,
    pub two_factor_enabled: bool,
    pub login_count: usize,
}

impl AccountOverview {
    pub fn from_profile(profile: &UserProfileRecord) -> Self {
        Self {
            display_name: profile.display_name.clone(),
            email: profile.email.clone(),
            email_confirmed: profile.email_confirmed,
            phone_number: profile.phone_number.clone(),
            two_factor_enabled: profile.two_factor_enabled,
            login_count: profile.logins.len(),
        }
    }
}

/// One linked external login on the manage-logins page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedLoginView {
    pub provider: String,
    pub display_name: String,
}

/// State of the manage-logins page.
///
/// A login is removable only while the account keeps another way in: a
/// password, or at least one other linked login.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoginProvidersView {
    pub current_logins: Vec<LinkedLoginView>,
    pub other_providers: Vec<String>,
    pub show_remove_button: bool,
}

impl LoginProvidersView {
    pub fn new(profile: &UserProfileRecord, known_providers: &[&str]) -> Self {
        let current_logins: Vec<LinkedLoginView> = profile
            .logins
            .iter()
            .map(|login| LinkedLoginView {
                provider: login.provider.clone(),
                display_name: login.display_name.clone(),
            })
            .collect();

        let other_providers = known_providers
            .iter()
            .filter(|provider| {
                !profile
                    .logins
                    .iter()
                    .any(|login| login.provider == **provider)
            })
            .map(|provider| provider.to_string())
            .collect();

        let show_remove_button = profile.has_password || profile.logins.len() > 1;

        Self {
            current_logins,
            other_providers,
            show_remove_button,
        }
    }
}

/// State of the two-factor configuration page.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TwoFactorView {
    pub two_factor_enabled: bool,
    pub has_authenticator: bool,
    pub recovery_codes_left: u32,
    pub is_machine_remembered: bool,
}

impl TwoFactorView {
    pub fn new(profile: &UserProfileRecord, is_machine_remembered: bool) -> Self {
        Self {
            two_factor_enabled: profile.two_factor_enabled,
            has_authenticator: profile.authenticator_enrolled,
            recovery_codes_left: profile.recovery_codes_left,
            is_machine_remembered,
        }
    }
}
