use bcrypt::{hash, verify};
use std::sync::Arc;
use tokio::sync::Mutex;
use crate::errors::{AppError, AppResult, RegistrationError, StorageResult};
use crate::models::{DirectoryUsage, RegisterForm, UserAccount, UserProfile};
use super::store::{get_json, put_json, SharedStore};

// All accounts live in one entry.
pub const DIRECTORY_KEY: &str = "directory:users";

const INVALID_CREDENTIALS: &str = "Invalid username or password.";

#[derive(Clone)]
pub struct UserDirectory {
    store: SharedStore,
    max_users: usize,
    bcrypt_cost: u32,
    // Held from reading the account list until the new list is written
    registration: Arc<Mutex<()>>,
}

impl UserDirectory {
    pub fn new(store: SharedStore, max_users: usize, bcrypt_cost: u32) -> Self {
        Self {
            store,
            max_users,
            bcrypt_cost,
            registration: Arc::new(Mutex::new(())),
        }
    }

    pub async fn accounts(&self) -> StorageResult<Vec<UserAccount>> {
        Ok(get_json(self.store.as_ref(), DIRECTORY_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn usage(&self) -> StorageResult<DirectoryUsage> {
        Ok(DirectoryUsage {
            count: self.accounts().await?.len(),
            capacity: self.max_users,
        })
    }

    async fn hash_password(&self, password: &str) -> AppResult<String> {
        let password = password.to_owned();
        let cost = self.bcrypt_cost;
        let hashed = tokio::task::spawn_blocking(move || hash(password, cost)).await??;
        Ok(hashed)
    }

    /// Adds an account. Capacity is checked first, then empty fields,
    /// then the (case-sensitive) username. Concurrent registrations are
    /// applied one at a time.
    pub async fn register(&self, form: &RegisterForm) -> AppResult<UserProfile> {
        // The hash is computed before queueing for the directory
        let password_hash = if form.has_empty_field() {
            None
        } else {
            Some(self.hash_password(&form.password).await?)
        };

        let _guard = self.registration.lock().await;
        let mut accounts = self.accounts().await?;

        if accounts.len() >= self.max_users {
            tracing::warn!("Registration refused: directory holds {} accounts", accounts.len());
            return Err(RegistrationError::CapacityReached { capacity: self.max_users }.into());
        }

        // None exactly when a field is empty
        let Some(password_hash) = password_hash else {
            return Err(RegistrationError::MissingField.into());
        };

        if accounts.iter().any(|account| account.username == form.username) {
            tracing::debug!("Registration refused: username {} taken", form.username);
            return Err(RegistrationError::UsernameTaken.into());
        }

        let account = UserAccount {
            username: form.username.clone(),
            password_hash,
            role: form.role.clone(),
            department: form.department.clone(),
        };
        let profile = account.profile();

        accounts.push(account);
        put_json(self.store.as_ref(), DIRECTORY_KEY, &accounts).await?;

        tracing::info!(
            "Registered user {} ({}/{} accounts)",
            profile.username,
            accounts.len(),
            self.max_users
        );
        Ok(profile)
    }

    /// Unknown users and wrong passwords fail with the same message.
    pub async fn authenticate(&self, username: &str, password: &str) -> AppResult<UserProfile> {
        let accounts = self.accounts().await?;

        let Some(account) = accounts.iter().find(|account| account.username == username) else {
            tracing::debug!("Login failed for {}", username);
            return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
        };

        if !verify(password, &account.password_hash)? {
            tracing::debug!("Login failed for {}", username);
            return Err(AppError::Auth(INVALID_CREDENTIALS.into()));
        }

        tracing::info!("User {} authenticated", username);
        Ok(account.profile())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::MemoryStore;

    // Minimum bcrypt cost keeps the tests fast
    fn directory() -> UserDirectory {
        UserDirectory::new(Arc::new(MemoryStore::new()), 10, 4)
    }

    fn form(username: &str, password: &str, role: &str, department: &str) -> RegisterForm {
        RegisterForm {
            username: username.into(),
            password: password.into(),
            role: role.into(),
            department: department.into(),
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let dir = directory();
        dir.register(&form("tech1", "pw1", "Technician", "Micro")).await.unwrap();

        let profile = dir.authenticate("tech1", "pw1").await.unwrap();
        assert_eq!(profile.username, "tech1");
        assert_eq!(profile.role, "Technician");
        assert_eq!(profile.department, "Micro");
    }

    #[tokio::test]
    async fn test_password_is_not_stored_in_plaintext() {
        let dir = directory();
        dir.register(&form("tech1", "pw1", "Technician", "Micro")).await.unwrap();

        let accounts = dir.accounts().await.unwrap();
        assert_ne!(accounts[0].password_hash, "pw1");
        assert!(verify("pw1", &accounts[0].password_hash).unwrap());
    }

    #[tokio::test]
    async fn test_capacity_caps_directory_at_ten() {
        let dir = directory();
        for i in 0..10 {
            dir.register(&form(&format!("user{}", i), "pw", "Tech", "Lab")).await.unwrap();
        }

        for i in 10..13 {
            let err = dir
                .register(&form(&format!("user{}", i), "pw", "Tech", "Lab"))
                .await
                .unwrap_err();
            assert!(matches!(
                err,
                AppError::Registration(RegistrationError::CapacityReached { capacity: 10 })
            ));
        }
        assert_eq!(dir.usage().await.unwrap(), DirectoryUsage { count: 10, capacity: 10 });
    }

    #[tokio::test]
    async fn test_capacity_is_checked_before_fields() {
        let dir = UserDirectory::new(Arc::new(MemoryStore::new()), 1, 4);
        dir.register(&form("a", "pw", "Tech", "Lab")).await.unwrap();

        let err = dir.register(&form("", "", "", "")).await.unwrap_err();
        assert!(matches!(
            err,
            AppError::Registration(RegistrationError::CapacityReached { .. })
        ));
    }

    #[tokio::test]
    async fn test_empty_fields_rejected() {
        let dir = directory();
        let cases = [
            form("", "pw", "Tech", "Lab"),
            form("u", "", "Tech", "Lab"),
            form("u", "pw", "", "Lab"),
            form("u", "pw", "Tech", ""),
        ];
        for case in &cases {
            let err = dir.register(case).await.unwrap_err();
            assert!(matches!(err, AppError::Registration(RegistrationError::MissingField)));
        }
        assert_eq!(dir.usage().await.unwrap().count, 0);
    }

    #[tokio::test]
    async fn test_duplicate_username_rejected_case_sensitively() {
        let dir = directory();
        dir.register(&form("Tech1", "pw", "Tech", "Lab")).await.unwrap();

        let err = dir.register(&form("Tech1", "other", "Tech", "Lab")).await.unwrap_err();
        assert!(matches!(err, AppError::Registration(RegistrationError::UsernameTaken)));

        // different case is a different user
        dir.register(&form("tech1", "pw", "Tech", "Lab")).await.unwrap();
        assert_eq!(dir.usage().await.unwrap().count, 2);
    }

    #[tokio::test]
    async fn test_failed_logins_are_indistinguishable() {
        let dir = directory();
        dir.register(&form("tech1", "pw1", "Technician", "Micro")).await.unwrap();

        let unknown = dir.authenticate("nobody", "pw1").await.unwrap_err();
        let wrong = dir.authenticate("tech1", "PW1").await.unwrap_err();
        let wrong_case = dir.authenticate("TECH1", "pw1").await.unwrap_err();

        for err in [unknown, wrong, wrong_case] {
            match err {
                AppError::Auth(msg) => assert_eq!(msg, INVALID_CREDENTIALS),
                other => panic!("unexpected error: {:?}", other),
            }
        }
    }

    async fn register_concurrently(dir: &UserDirectory, forms: Vec<RegisterForm>) -> Vec<AppResult<UserProfile>> {
        let handles: Vec<_> = forms
            .into_iter()
            .map(|form| {
                let dir = dir.clone();
                tokio::spawn(async move { dir.register(&form).await })
            })
            .collect();

        let mut results = Vec::new();
        for handle in handles {
            results.push(handle.await.unwrap());
        }
        results
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_same_username_registers_once() {
        let dir = directory();
        let forms = (0..4)
            .map(|i| form("tech1", &format!("pw{}", i), "Technician", "Micro"))
            .collect();

        let results = register_concurrently(&dir, forms).await;
        let accepted = results.iter().filter(|result| result.is_ok()).count();
        let taken = results
            .iter()
            .filter(|result| matches!(result, Err(AppError::Registration(RegistrationError::UsernameTaken))))
            .count();

        assert_eq!(accepted, 1);
        assert_eq!(taken, 3);
        assert_eq!(dir.accounts().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_registrations_respect_capacity() {
        let dir = directory();
        for i in 0..9 {
            dir.register(&form(&format!("user{}", i), "pw", "Tech", "Lab")).await.unwrap();
        }

        let forms = (9..13)
            .map(|i| form(&format!("user{}", i), "pw", "Tech", "Lab"))
            .collect();
        let results = register_concurrently(&dir, forms).await;
        let accepted = results.iter().filter(|result| result.is_ok()).count();

        assert_eq!(accepted, 1);
        assert_eq!(dir.usage().await.unwrap(), DirectoryUsage { count: 10, capacity: 10 });
        for result in results.iter().filter(|result| result.is_err()) {
            assert!(matches!(
                result,
                Err(AppError::Registration(RegistrationError::CapacityReached { capacity: 10 }))
            ));
        }
    }
}
