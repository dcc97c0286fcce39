use serde::Serialize;
use std::fmt;

/// A mail address with an optional display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Recipient {
    /// Display name, possibly empty
    pub name: String,
    pub email: String,
}

impl Recipient {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
        }
    }
}

impl fmt::Display for Recipient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.name.is_empty() {
            write!(f, "<{}>", self.email)
        } else {
            write!(f, "{} <{}>", self.name, self.email)
        }
    }
}

/// An email ready for a transport.
///
/// Always carries both bodies. Recipients can only be appended.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    pub from: Recipient,
    to: Vec<Recipient>,
    pub subject: String,
    pub body_text: String,
    pub body_html: String,
}

impl Message {
    pub fn new(
        subject: impl Into<String>,
        body_text: impl Into<String>,
        body_html: impl Into<String>,
    ) -> Self {
        Self {
            from: Recipient::default(),
            to: Vec::new(),
            subject: subject.into(),
            body_text: body_text.into(),
            body_html: body_html.into(),
        }
    }

    /// Append a recipient.
    pub fn add_recipient(&mut self, name: impl Into<String>, email: impl Into<String>) {
        self.to.push(Recipient::new(name, email));
    }

    pub fn to(&self) -> &[Recipient] {
        &self.to
    }

    /// Recipients formatted for logs and errors, e.g. `[Ann <ann@x.org>, <bob@x.org>]`.
    pub fn recipients_display(&self) -> String {
        let list: Vec<String> = self.to.iter().map(ToString::to_string).collect();
        format!("[{}]", list.join(", "))
    }
}
