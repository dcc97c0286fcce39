use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

static LANGUAGE_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z]{2,3}(-[A-Za-z0-9]{2,8})*$").expect("Invalid language tag pattern")
});

/// Notification preferences of a user, as stored by the social API.
///
/// Flags are read leniently: a value that is not a JSON boolean is treated
/// as absent, and absent flags never opt a user in.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    #[serde(deserialize_with = "lenient_string")]
    pub language: Option<String>,

    /// Platform notifications switch
    #[serde(deserialize_with = "lenient_bool")]
    pub komunitin: Option<bool>,

    #[serde(deserialize_with = "lenient_emails")]
    pub emails: EmailSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct EmailSettings {
    #[serde(rename = "myAccount", deserialize_with = "lenient_bool")]
    pub my_account: Option<bool>,
}

impl UserSettings {
    /// The configured language when it is a well-formed tag, else `"en"`.
    pub fn language_tag(&self) -> &str {
        match self.language.as_deref().map(str::trim) {
            Some(tag) if LANGUAGE_TAG.is_match(tag) => tag,
            _ => "en",
        }
    }
}

fn lenient_bool<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?.as_bool())
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Value::deserialize(deserializer)?
        .as_str()
        .map(str::to_string))
}

fn lenient_emails<'de, D>(deserializer: D) -> Result<EmailSettings, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> UserSettings {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_full_settings() {
        let settings = parse(json!({
            "language": "ca",
            "komunitin": true,
            "emails": { "myAccount": true, "group": "weekly" }
        }));
        assert_eq!(settings.language_tag(), "ca");
        assert_eq!(settings.komunitin, Some(true));
        assert_eq!(settings.emails.my_account, Some(true));
    }

    #[test]
    fn test_wrong_shapes_read_as_absent() {
        let settings = parse(json!({
            "language": 7,
            "komunitin": "yes",
            "emails": { "myAccount": "true" }
        }));
        assert_eq!(settings.language, None);
        assert_eq!(settings.komunitin, None);
        assert_eq!(settings.emails.my_account, None);

        let settings = parse(json!({ "komunitin": true, "emails": [true] }));
        assert_eq!(settings.komunitin, Some(true));
        assert_eq!(settings.emails.my_account, None);
    }

    #[test]
    fn test_missing_fields_default() {
        let settings = parse(json!({}));
        assert_eq!(settings, UserSettings::default());
        assert_eq!(settings.language_tag(), "en");
    }

    #[test]
    fn test_language_tag_validation() {
        let with = |tag: &str| UserSettings {
            language: Some(tag.to_string()),
            ..Default::default()
        };
        assert_eq!(with("es").language_tag(), "es");
        assert_eq!(with("pt-BR").language_tag(), "pt-BR");
        assert_eq!(with("").language_tag(), "en");
        assert_eq!(with("not a tag").language_tag(), "en");
        assert_eq!(with("e").language_tag(), "en");
    }
}
