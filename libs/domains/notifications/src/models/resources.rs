use super::settings::UserSettings;
use chrono::{DateTime, Utc};

/// Reference from a member to its account in the accounting service.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AccountRef {
    pub id: String,
    /// Absolute URL of the account resource
    pub href: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub account: AccountRef,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Account {
    pub id: String,
    /// Human readable account code, e.g. "GRP10002"
    pub code: String,
    pub balance: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transfer {
    pub id: String,
    pub amount: f64,
    pub state: String,
    pub description: String,
    pub payer_account_id: String,
    pub payee_account_id: String,
    pub created: Option<DateTime<Utc>>,
    pub updated: Option<DateTime<Utc>>,
}

impl Transfer {
    /// Last state change, falling back to creation time.
    pub fn date(&self) -> Option<DateTime<Utc>> {
        self.updated.or(self.created)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct User {
    pub id: String,
    pub email: String,
    pub settings: UserSettings,
}

impl User {
    /// Whether the user opted in to emails about their own account.
    pub fn wants_account_emails(&self) -> bool {
        self.settings.komunitin == Some(true) && self.settings.emails.my_account == Some(true)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub id: String,
    pub code: String,
    pub name: String,
    pub admins: Vec<User>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::EmailSettings;

    fn user(komunitin: Option<bool>, my_account: Option<bool>) -> User {
        User {
            id: "u1".to_string(),
            email: "u1@example.org".to_string(),
            settings: UserSettings {
                language: None,
                komunitin,
                emails: EmailSettings { my_account },
            },
        }
    }

    #[test]
    fn test_account_email_eligibility_matrix() {
        assert!(user(Some(true), Some(true)).wants_account_emails());

        assert!(!user(Some(true), Some(false)).wants_account_emails());
        assert!(!user(Some(true), None).wants_account_emails());
        assert!(!user(Some(false), Some(true)).wants_account_emails());
        assert!(!user(None, Some(true)).wants_account_emails());
        assert!(!user(None, None).wants_account_emails());
    }

    #[test]
    fn test_transfer_date_prefers_updated() {
        let created = "2024-05-01T10:00:00Z".parse().ok();
        let updated = "2024-05-02T10:00:00Z".parse().ok();

        let mut transfer = Transfer {
            created,
            ..Default::default()
        };
        assert_eq!(transfer.date(), created);

        transfer.updated = updated;
        assert_eq!(transfer.date(), updated);
    }
}
