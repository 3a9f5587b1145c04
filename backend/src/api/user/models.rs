use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct ProfileUpdate {
    pub display_name: Option<String>,
    pub department: Option<String>,
    pub avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct PasswordChange {
    pub current_password: String,
    pub new_password: String,
}

#[derive(Debug, Deserialize)]
pub struct RoleQuery {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct ActiveQuery {
    pub is_active: bool,
}
