use std::sync::Arc;

use assert_matches::assert_matches;
use uuid::Uuid;

use auth_cell::{
    AuthError, CreateUserRequest, Role, SessionService, UpdateUserRequest, UserDirectory,
};
use shared_store::LocalStore;

fn store() -> Arc<LocalStore> {
    Arc::new(LocalStore::in_memory())
}

fn user_request(login: &str, role: Role) -> CreateUserRequest {
    CreateUserRequest {
        name: format!("User {}", login),
        login: login.to_string(),
        password: "Secret1".to_string(),
        role,
    }
}

#[test]
fn default_admin_is_seeded_on_first_access() {
    let directory = UserDirectory::new(store());
    let users = directory.list().unwrap();

    assert_eq!(users.len(), 1);
    assert_eq!(users[0].login, "admin");
    assert_eq!(users[0].role, Role::Admin);
}

#[test]
fn duplicate_login_is_rejected() {
    let directory = UserDirectory::new(store());
    directory
        .create(user_request("martin", Role::Medecin))
        .unwrap();

    let result = directory.create(user_request("martin", Role::Infirmiere));
    assert_matches!(result, Err(AuthError::DuplicateLogin(login)) if login == "martin");
}

#[test]
fn duplicate_check_excludes_self_on_update() {
    let directory = UserDirectory::new(store());
    let user = directory
        .create(user_request("martin", Role::Medecin))
        .unwrap();

    // Re-submitting the same login for the same user is not a duplicate.
    let updated = directory
        .update(
            user.id,
            UpdateUserRequest {
                login: Some("martin".to_string()),
                name: Some("Dr. Martin".to_string()),
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(updated.name, "Dr. Martin");
}

#[test]
fn weak_passwords_are_rejected() {
    let directory = UserDirectory::new(store());
    let mut request = user_request("weak", Role::Medecin);
    request.password = "abc".to_string();

    assert_matches!(directory.create(request), Err(AuthError::WeakPassword(_)));
}

#[test]
fn last_admin_cannot_be_deleted() {
    let directory = UserDirectory::new(store());
    let admin = directory.find_by_login("admin").unwrap().unwrap();

    assert_matches!(directory.delete(admin.id), Err(AuthError::LastAdmin));

    // With a second admin present, deletion goes through.
    let other = directory
        .create(user_request("admin2", Role::Admin))
        .unwrap();
    assert!(directory.delete(other.id).unwrap());

    // Back to a single admin, the guard applies again.
    assert_matches!(directory.delete(admin.id), Err(AuthError::LastAdmin));
}

#[test]
fn last_admin_cannot_be_demoted() {
    let directory = UserDirectory::new(store());
    let admin = directory.find_by_login("admin").unwrap().unwrap();

    let result = directory.update(
        admin.id,
        UpdateUserRequest {
            role: Some(Role::Medecin),
            ..Default::default()
        },
    );
    assert_matches!(result, Err(AuthError::LastAdmin));
}

#[test]
fn non_admin_deletion_always_succeeds() {
    let directory = UserDirectory::new(store());
    let nurse = directory
        .create(user_request("nurse", Role::Infirmiere))
        .unwrap();

    assert!(directory.delete(nurse.id).unwrap());
    assert!(!directory.delete(Uuid::new_v4()).unwrap());
}

#[test]
fn login_persists_session_with_blanked_hash() {
    let store = store();
    let directory = UserDirectory::new(Arc::clone(&store));
    directory
        .create(user_request("martin", Role::Medecin))
        .unwrap();

    let sessions = SessionService::new(Arc::clone(&store));
    let user = sessions.login("martin", "Secret1").unwrap();
    assert!(user.password_hash.is_empty());

    let current = sessions.current_user().unwrap().unwrap();
    assert_eq!(current.login, "martin");
    assert!(current.password_hash.is_empty());

    sessions.logout().unwrap();
    assert!(sessions.current_user().unwrap().is_none());
}

#[test]
fn bad_credentials_are_rejected() {
    let store = store();
    UserDirectory::new(Arc::clone(&store))
        .create(user_request("martin", Role::Medecin))
        .unwrap();

    let sessions = SessionService::new(Arc::clone(&store));
    assert_matches!(
        sessions.login("martin", "Wrong1x"),
        Err(AuthError::InvalidCredentials)
    );
    assert_matches!(
        sessions.login("nobody", "Secret1"),
        Err(AuthError::InvalidCredentials)
    );
    assert!(sessions.current_user().unwrap().is_none());
}

#[test]
fn professionals_excludes_admins() {
    let directory = UserDirectory::new(store());
    directory
        .create(user_request("martin", Role::Medecin))
        .unwrap();
    directory
        .create(user_request("claire", Role::Specialiste))
        .unwrap();

    let professionals = directory.professionals().unwrap();
    assert_eq!(professionals.len(), 2);
    assert!(professionals.iter().all(|u| u.role != Role::Admin));
}
