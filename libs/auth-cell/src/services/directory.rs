use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use shared_store::{Collection, LocalStore};

use crate::models::{AuthError, CreateUserRequest, Role, UpdateUserRequest, User, USERS_KEY};
use crate::services::password::PasswordService;

const DEFAULT_ADMIN_LOGIN: &str = "admin";
const DEFAULT_ADMIN_PASSWORD: &str = "Admin123";

pub struct UserDirectory {
    users: Collection<User>,
}

impl UserDirectory {
    pub fn new(store: Arc<LocalStore>) -> Self {
        Self {
            users: Collection::new(store, USERS_KEY),
        }
    }

    /// Load the user collection, seeding the default administrator on the
    /// very first access so the application is never locked out.
    fn load(&self) -> Result<Vec<User>, AuthError> {
        if let Some(users) = self.users.try_load()? {
            return Ok(users);
        }

        warn!("No user collection found, seeding default administrator");
        let admin = User {
            id: Uuid::new_v4(),
            name: "Administrateur".to_string(),
            login: DEFAULT_ADMIN_LOGIN.to_string(),
            password_hash: PasswordService::hash_password(DEFAULT_ADMIN_PASSWORD)?,
            role: Role::Admin,
        };
        let users = vec![admin];
        self.users.save_all(&users)?;
        Ok(users)
    }

    pub fn create(&self, request: CreateUserRequest) -> Result<User, AuthError> {
        PasswordService::validate_strength(&request.password)?;

        let mut users = self.load()?;
        if users.iter().any(|u| u.login == request.login) {
            return Err(AuthError::DuplicateLogin(request.login));
        }

        let user = User {
            id: Uuid::new_v4(),
            name: request.name,
            login: request.login,
            password_hash: PasswordService::hash_password(&request.password)?,
            role: request.role,
        };

        info!("Created user {} ({})", user.login, user.role);
        users.push(user.clone());
        self.users.save_all(&users)?;
        Ok(user)
    }

    pub fn update(&self, id: Uuid, request: UpdateUserRequest) -> Result<User, AuthError> {
        let mut users = self.load()?;

        if let Some(login) = &request.login {
            if users.iter().any(|u| u.id != id && &u.login == login) {
                return Err(AuthError::DuplicateLogin(login.clone()));
            }
        }

        // Demoting the only administrator would leave the admin role empty,
        // same invariant as deletion.
        if let Some(role) = request.role {
            if role != Role::Admin && self.is_last_admin(&users, id) {
                return Err(AuthError::LastAdmin);
            }
        }

        let password_hash = match &request.password {
            Some(password) => {
                PasswordService::validate_strength(password)?;
                Some(PasswordService::hash_password(password)?)
            }
            None => None,
        };

        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AuthError::NotFound)?;

        if let Some(name) = request.name {
            user.name = name;
        }
        if let Some(login) = request.login {
            user.login = login;
        }
        if let Some(hash) = password_hash {
            user.password_hash = hash;
        }
        if let Some(role) = request.role {
            user.role = role;
        }

        let updated = user.clone();
        debug!("Updated user {}", id);
        self.users.save_all(&users)?;
        Ok(updated)
    }

    pub fn delete(&self, id: Uuid) -> Result<bool, AuthError> {
        let mut users = self.load()?;

        if self.is_last_admin(&users, id) {
            warn!("Refusing to delete the last administrator");
            return Err(AuthError::LastAdmin);
        }

        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Ok(false);
        }

        info!("Deleted user {}", id);
        self.users.save_all(&users)?;
        Ok(true)
    }

    pub fn get(&self, id: Uuid) -> Result<Option<User>, AuthError> {
        Ok(self.load()?.into_iter().find(|u| u.id == id))
    }

    pub fn find_by_login(&self, login: &str) -> Result<Option<User>, AuthError> {
        Ok(self.load()?.into_iter().find(|u| u.login == login))
    }

    pub fn list(&self) -> Result<Vec<User>, AuthError> {
        self.load()
    }

    /// Professionals only (everyone but admin accounts), for scheduling.
    pub fn professionals(&self) -> Result<Vec<User>, AuthError> {
        Ok(self
            .load()?
            .into_iter()
            .filter(|u| u.role.is_professional())
            .collect())
    }

    fn is_last_admin(&self, users: &[User], id: Uuid) -> bool {
        let admins: Vec<_> = users.iter().filter(|u| u.role == Role::Admin).collect();
        admins.len() == 1 && admins[0].id == id
    }
}
