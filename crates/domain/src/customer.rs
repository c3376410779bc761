use common::CustomerId;
use serde::{Deserialize, Serialize};

use crate::ValidationError;

/// The logged-in customer, as left in the session by the login flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
}

impl Customer {
    pub fn new(id: impl Into<CustomerId>) -> Self {
        Self {
            id: id.into(),
            name: None,
            email: None,
            contact_number: None,
        }
    }

    /// Applies the set fields of `update`.
    pub fn apply(&mut self, update: &CustomerUpdate) {
        if let Some(name) = &update.name {
            self.name = Some(name.clone());
        }
        if let Some(email) = &update.email {
            self.email = Some(email.clone());
        }
        if let Some(contact_number) = &update.contact_number {
            self.contact_number = Some(contact_number.clone());
        }
    }
}

/// A sign-up request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewCustomer {
    pub name: String,
    pub email: String,
    pub password: String,
    pub contact_number: Option<String>,
}

impl NewCustomer {
    /// Builds a sign-up request; name, email and password are trimmed and required.
    pub fn new(
        name: &str,
        email: &str,
        password: &str,
        contact_number: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingName);
        }
        let email = validate_email(email)?;
        if password.trim().is_empty() {
            return Err(ValidationError::MissingPassword);
        }

        Ok(Self {
            name: name.to_string(),
            email,
            password: password.to_string(),
            contact_number: contact_number
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string),
        })
    }
}

/// A partial profile update. Unset fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub contact_number: Option<String>,
}

impl CustomerUpdate {
    /// Builds an update from the fields the customer filled in.
    ///
    /// Blank fields count as not filled in; an update that changes nothing is
    /// rejected.
    pub fn new(
        name: Option<&str>,
        email: Option<&str>,
        contact_number: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let filled = |value: Option<&str>| {
            value
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        };

        let update = Self {
            name: filled(name),
            email: filled(email).map(|e| validate_email(&e)).transpose()?,
            contact_number: filled(contact_number),
        };
        if update.name.is_none() && update.email.is_none() && update.contact_number.is_none() {
            return Err(ValidationError::EmptyProfileUpdate);
        }
        Ok(update)
    }
}

fn validate_email(email: &str) -> Result<String, ValidationError> {
    let email = email.trim();
    match email.split_once('@') {
        Some((user, domain)) if !user.is_empty() && !domain.is_empty() => Ok(email.to_string()),
        _ => Err(ValidationError::InvalidEmail),
    }
}
