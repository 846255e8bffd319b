use std::sync::Arc;

use tracing::{info, warn};

use shared_store::{LocalStore, Record};

use crate::models::{AuthError, User, SESSION_KEY};
use crate::services::directory::UserDirectory;
use crate::services::password::PasswordService;

/// Login, logout and the persisted "current session" record.
///
/// The session is a single stored copy of the authenticated user with the
/// password hash blanked. There is no expiry and no token: whoever can
/// read the store owns the session.
pub struct SessionService {
    session: Record<User>,
    directory: UserDirectory,
}

impl SessionService {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            session: Record::new(Arc::clone(&store), SESSION_KEY),
            directory: UserDirectory::new(store),
        }
    }

    pub fn login(&self, login: &str, password: &str) -> Result<User, AuthError> {
        let user = match self.directory.find_by_login(login)? {
            Some(user) => user,
            None => {
                warn!("Login attempt for unknown login '{}'", login);
                return Err(AuthError::InvalidCredentials);
            }
        };

        if !PasswordService::verify_password(password, &user.password_hash)? {
            warn!("Failed login attempt for '{}'", login);
            return Err(AuthError::InvalidCredentials);
        }

        let session_user = User {
            password_hash: String::new(),
            ..user
        };
        self.session.save(&session_user)?;
        info!("User '{}' logged in", session_user.login);
        Ok(session_user)
    }

    pub fn logout(&self) -> Result<(), AuthError> {
        self.session.clear()?;
        info!("Session cleared");
        Ok(())
    }

    pub fn current_user(&self) -> Result<Option<User>, AuthError> {
        Ok(self.session.load()?)
    }
}
