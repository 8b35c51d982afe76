use storefront_storage::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("validation failed: {0}")]
    Validation(String),

    /// Unknown email or wrong password. The two are not distinguished.
    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("this account is not allowed to use the admin console")]
    Forbidden,

    #[error("an account with this email already exists")]
    Conflict,

    #[error("password hashing failed: {0}")]
    Hashing(#[from] bcrypt::BcryptError),

    #[error("local storage failed: {0}")]
    LocalStorage(#[from] StoreError),
}

impl AuthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Text shown to the user in a notice.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(msg) => msg.clone(),
            Self::InvalidCredentials => "Invalid email or password".to_string(),
            Self::Forbidden => "Admin access required".to_string(),
            Self::Conflict => "An account with this email already exists".to_string(),
            Self::Hashing(_) | Self::LocalStorage(_) => "Something went wrong, please try again".to_string(),
        }
    }
}
