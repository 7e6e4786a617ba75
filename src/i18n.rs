//! UI translations (English / German)

use serde::{Deserialize, Serialize};

use crate::models::Resource;

/// Display language
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    #[default]
    De,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::En => "en",
            Language::De => "de",
        }
    }

    pub fn from_code(code: &str) -> Option<Language> {
        match code.trim().to_ascii_lowercase().as_str() {
            "en" => Some(Language::En),
            "de" => Some(Language::De),
            _ => None,
        }
    }

    pub fn toggle(&self) -> Language {
        match self {
            Language::En => Language::De,
            Language::De => Language::En,
        }
    }

    pub fn texts(&self) -> &'static Texts {
        match self {
            Language::En => &EN,
            Language::De => &DE,
        }
    }
}

/// Translated labels
#[derive(Debug)]
pub struct Texts {
    pub welcome: &'static str,
    pub search: &'static str,
    pub system_overview: &'static str,
    pub total_user: &'static str,
    pub role: &'static str,
    pub setting: &'static str,
    pub dashboard: &'static str,
    pub companies: &'static str,
    pub contacts: &'static str,
    pub projects: &'static str,
    pub users: &'static str,
    pub profile: &'static str,
    pub sign_in: &'static str,
    pub sign_in_hint: &'static str,
    pub email: &'static str,
    pub password: &'static str,
    pub loading: &'static str,
    pub logout: &'static str,
    pub no_rows: &'static str,
    pub confirm_delete: &'static str,
}

impl Texts {
    pub fn resource(&self, resource: Resource) -> &'static str {
        match resource {
            Resource::Companies => self.companies,
            Resource::Contacts => self.contacts,
            Resource::Projects => self.projects,
            Resource::Users => self.users,
            Resource::Roles => self.role,
        }
    }
}

static EN: Texts = Texts {
    welcome: "Welcome",
    search: "Search...",
    system_overview: "System Overview",
    total_user: "Total User",
    role: "Roles",
    setting: "Settings",
    dashboard: "Dashboard",
    companies: "Companies",
    contacts: "Contacts",
    projects: "Projects",
    users: "Users",
    profile: "Profile",
    sign_in: "Sign In",
    sign_in_hint: "Enter your credentials to continue",
    email: "Email",
    password: "Password",
    loading: "Loading...",
    logout: "Logout",
    no_rows: "No rows",
    confirm_delete: "Delete this record? (y/n)",
};

static DE: Texts = Texts {
    welcome: "Willkommen",
    search: "Suchen...",
    system_overview: "Systemübersicht",
    total_user: "Gesamter Benutzer",
    role: "Rolle",
    setting: "Einstellung",
    dashboard: "Übersicht",
    companies: "Firmen",
    contacts: "Kontakte",
    projects: "Projekte",
    users: "Benutzer",
    profile: "Profil",
    sign_in: "Anmelden",
    sign_in_hint: "Zugangsdaten eingeben, um fortzufahren",
    email: "E-Mail",
    password: "Passwort",
    loading: "Laden...",
    logout: "Abmelden",
    no_rows: "Keine Einträge",
    confirm_delete: "Eintrag löschen? (y/n)",
};
