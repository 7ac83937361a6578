use crate::api::UserSummary;
use crate::error::{ApiError, Result};

use super::database::Database;

const KEY_TOKEN: &str = "authToken";
const KEY_USER_ID: &str = "userId";
const KEY_ROLE: &str = "userRole";
const KEY_ROLES: &str = "userRoles";
const KEY_USER: &str = "user";

/// The signed-in user as persisted by the app shell.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub roles: Vec<String>,
    pub user: Option<UserSummary>,
}

impl Session {
    /// Read the current session. Empty token or user id (cleared on sign-out)
    /// means nobody is signed in.
    pub fn load(db: &Database) -> Result<Self> {
        let token = db.get_setting(KEY_TOKEN)?.unwrap_or_default();
        let user: Option<UserSummary> = db
            .get_setting(KEY_USER)?
            .and_then(|raw| match serde_json::from_str(&raw) {
                Ok(u) => Some(u),
                Err(e) => {
                    log::warn!("Ignoring unreadable user blob: {}", e);
                    None
                }
            });

        // Older installs only stored the user blob.
        let user_id = db
            .get_setting(KEY_USER_ID)?
            .filter(|id| !id.is_empty())
            .or_else(|| user.as_ref().map(|u| u.id.clone()))
            .unwrap_or_default();

        if token.is_empty() || user_id.is_empty() {
            return Err(ApiError::NotLoggedIn);
        }

        let mut roles: Vec<String> = db
            .get_setting(KEY_ROLES)?
            .and_then(|raw| serde_json::from_str::<Vec<String>>(&raw).ok())
            .unwrap_or_default();
        if let Some(role) = db.get_setting(KEY_ROLE)?.filter(|r| !r.is_empty()) {
            if !roles.contains(&role) {
                roles.insert(0, role);
            }
        }

        Ok(Self {
            token,
            user_id,
            roles,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_token_is_logged_out() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting(KEY_USER_ID, "u1").unwrap();
        assert_eq!(Session::load(&db), Err(ApiError::NotLoggedIn));

        db.set_setting(KEY_TOKEN, "").unwrap();
        assert_eq!(Session::load(&db), Err(ApiError::NotLoggedIn));
    }

    #[test]
    fn merges_single_role_and_role_list() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting(KEY_TOKEN, "tok").unwrap();
        db.set_setting(KEY_USER_ID, "u1").unwrap();
        db.set_setting(KEY_ROLE, "admin").unwrap();
        db.set_setting(KEY_ROLES, r#"["technician","admin"]"#).unwrap();

        let session = Session::load(&db).unwrap();
        assert_eq!(session.roles, vec!["technician", "admin"]);
    }

    #[test]
    fn user_id_falls_back_to_user_blob() {
        let db = Database::open_in_memory().unwrap();
        db.set_setting(KEY_TOKEN, "tok").unwrap();
        db.set_setting(KEY_USER, r#"{"id":"u7","name":"Rui"}"#).unwrap();

        let session = Session::load(&db).unwrap();
        assert_eq!(session.user_id, "u7");
        assert_eq!(session.user.unwrap().name.as_deref(), Some("Rui"));
    }
}
