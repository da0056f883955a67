//! Authentication payloads such as login credentials and signup requests.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.
//! Plaintext passwords are held in [`Zeroizing`] wrappers so they are wiped
//! once the request is dropped.

use std::fmt;

use zeroize::Zeroizing;

use super::user::{DisplayName, Email, Username, UserValidationError};

/// Domain error returned when authentication payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPayloadError {
    /// Password was blank.
    EmptyPassword,
    /// An identity field failed structural validation.
    InvalidField(UserValidationError),
}

impl fmt::Display for AuthPayloadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::InvalidField(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for AuthPayloadError {}

/// Validated login credentials used by the authentication flow.
///
/// ## Invariants
/// - `username` satisfies [`Username`] validation.
/// - `password` is non-empty but retains caller-provided whitespace to avoid
///   surprising credential comparisons.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    username: Username,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw username/password inputs.
    pub fn try_from_parts(username: &str, password: &str) -> Result<Self, AuthPayloadError> {
        let username = Username::new(username).map_err(AuthPayloadError::InvalidField)?;
        if password.is_empty() {
            return Err(AuthPayloadError::EmptyPassword);
        }

        Ok(Self {
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Username used for the credential lookup.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated signup request accepted by the authentication flow.
#[derive(Debug, Clone)]
pub struct SignupRequest {
    name: DisplayName,
    email: Email,
    username: Username,
    password: Zeroizing<String>,
}

impl SignupRequest {
    /// Construct a signup request from raw string inputs.
    pub fn try_from_parts(
        name: &str,
        email: &str,
        username: &str,
        password: &str,
    ) -> Result<Self, AuthPayloadError> {
        let name = DisplayName::new(name).map_err(AuthPayloadError::InvalidField)?;
        let email = Email::new(email).map_err(AuthPayloadError::InvalidField)?;
        let username = Username::new(username).map_err(AuthPayloadError::InvalidField)?;
        if password.is_empty() {
            return Err(AuthPayloadError::EmptyPassword);
        }

        Ok(Self {
            name,
            email,
            username,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Unique email address requested at signup.
    pub fn email(&self) -> &Email {
        &self.email
    }

    /// Unique login handle requested at signup.
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Decompose the request for the signup flow.
    pub(crate) fn into_parts(self) -> (DisplayName, Email, Username, Zeroizing<String>) {
        (self.name, self.email, self.username, self.password)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw")]
    #[case(" ann", "pw")]
    fn login_rejects_invalid_usernames(#[case] username: &str, #[case] password: &str) {
        let err = LoginCredentials::try_from_parts(username, password)
            .expect_err("invalid usernames must fail");
        assert!(matches!(err, AuthPayloadError::InvalidField(_)));
    }

    #[rstest]
    fn login_rejects_blank_passwords() {
        let err =
            LoginCredentials::try_from_parts("ann", "").expect_err("blank passwords must fail");
        assert_eq!(err, AuthPayloadError::EmptyPassword);
    }

    #[rstest]
    #[case("ann", "pw1")]
    #[case("ann_b", "correct horse battery staple")]
    fn login_accepts_valid_credentials(#[case] username: &str, #[case] password: &str) {
        let creds = LoginCredentials::try_from_parts(username, password)
            .expect("valid inputs should succeed");
        assert_eq!(creds.username().as_ref(), username);
        assert_eq!(creds.password(), password);
    }

    #[rstest]
    #[case("", "ann@x.com", "ann", "pw1")]
    #[case("Ann", "not-an-email", "ann", "pw1")]
    #[case("Ann", "ann@x.com", "", "pw1")]
    fn signup_rejects_invalid_identity_fields(
        #[case] name: &str,
        #[case] email: &str,
        #[case] username: &str,
        #[case] password: &str,
    ) {
        let err = SignupRequest::try_from_parts(name, email, username, password)
            .expect_err("invalid fields must fail");
        assert!(matches!(err, AuthPayloadError::InvalidField(_)));
    }

    #[rstest]
    fn signup_rejects_blank_passwords() {
        let err = SignupRequest::try_from_parts("Ann", "ann@x.com", "ann", "")
            .expect_err("blank passwords must fail");
        assert_eq!(err, AuthPayloadError::EmptyPassword);
    }

    #[rstest]
    fn signup_decomposes_into_validated_parts() {
        let request = SignupRequest::try_from_parts("Ann", "ann@x.com", "ann", "pw1")
            .expect("valid inputs should succeed");
        let (name, email, username, password) = request.into_parts();
        assert_eq!(name.as_ref(), "Ann");
        assert_eq!(email.as_ref(), "ann@x.com");
        assert_eq!(username.as_ref(), "ann");
        assert_eq!(password.as_str(), "pw1");
    }
}
