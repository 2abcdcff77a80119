use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct UserAccount {
    pub username: String,
    pub password_hash: String,  // bcrypt, never the plain password
    pub role: String,
    pub department: String,
}

/// Public part of an account; this is what a session carries.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub username: String,
    pub role: String,
    pub department: String,
}

impl UserAccount {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            username: self.username.clone(),
            role: self.role.clone(),
            department: self.department.clone(),
        }
    }
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryUsage {
    pub count: usize,
    pub capacity: usize,
}
