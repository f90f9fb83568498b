use axum_extra::headers::Authorization;
use axum_extra::headers::authorization::Bearer;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ApiError;
use crate::settings::Settings;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Admin,
}

/// The caller behind a verified bearer token.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub name: String,
    pub role: Role,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

pub fn authenticate(
    settings: &Settings,
    auth: Option<Authorization<Bearer>>,
) -> Result<Principal, ApiError> {
    let Some(auth) = auth else {
        return Err(ApiError::Unauthorized("No token, authorization denied".into()));
    };
    let token = auth.token();

    if token == settings.admin_token {
        return Ok(Principal {
            user_id: Uuid::nil(),
            name: "admin".to_string(),
            role: Role::Admin,
        });
    }

    settings
        .accounts
        .iter()
        .find(|account| account.token == token)
        .map(|account| Principal {
            user_id: account.user_id,
            name: account.name.clone(),
            role: account.role,
        })
        .ok_or_else(|| ApiError::Unauthorized("Invalid authentication token".into()))
}

pub fn require_admin(
    settings: &Settings,
    auth: Option<Authorization<Bearer>>,
) -> Result<Principal, ApiError> {
    let principal = authenticate(settings, auth)?;
    if principal.is_admin() {
        Ok(principal)
    } else {
        Err(ApiError::Forbidden("Access denied. Admin only.".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Account;

    fn settings() -> Settings {
        let mut settings = Settings::in_memory("secret");
        settings.accounts = vec![
            Account {
                token: "player-token".to_string(),
                user_id: Uuid::from_u128(7),
                name: "Player".to_string(),
                role: Role::User,
            },
            Account {
                token: "staff-token".to_string(),
                user_id: Uuid::from_u128(8),
                name: "Staff".to_string(),
                role: Role::Admin,
            },
        ];
        settings
    }

    #[test]
    fn test_admin_token() {
        let auth = Authorization::bearer("secret").unwrap();
        let principal = authenticate(&settings(), Some(auth)).unwrap();
        assert!(principal.is_admin());
    }

    #[test]
    fn test_account_token() {
        let auth = Authorization::bearer("player-token").unwrap();
        let principal = authenticate(&settings(), Some(auth)).unwrap();
        assert_eq!(principal.user_id, Uuid::from_u128(7));
        assert_eq!(principal.role, Role::User);
    }

    #[test]
    fn test_missing_or_unknown_token() {
        assert!(matches!(
            authenticate(&settings(), None),
            Err(ApiError::Unauthorized(_))
        ));
        let auth = Authorization::bearer("bad").unwrap();
        assert!(matches!(
            authenticate(&settings(), Some(auth)),
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[test]
    fn test_require_admin() {
        let auth = Authorization::bearer("player-token").unwrap();
        assert!(matches!(
            require_admin(&settings(), Some(auth)),
            Err(ApiError::Forbidden(_))
        ));
        let auth = Authorization::bearer("staff-token").unwrap();
        assert!(require_admin(&settings(), Some(auth)).is_ok());
    }
}
