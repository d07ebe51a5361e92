use {
    axum_login::AuthUser,
    serde::{Deserialize, Serialize},
    serde_json::{Map, Value},
};

use super::Identifiable;

/// A row of the application's profile table, keyed by the identity id.
///
/// Only `id` and `role` are interpreted; every other column is carried as-is.
#[derive(Debug, Default, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Profile {
    pub id: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Profile {
    pub fn column_str(&self, name: &str) -> Option<&str> {
        self.extra.get(name).and_then(Value::as_str)
    }
}

impl Identifiable<String> for Profile {
    fn id(&self) -> String {
        self.id.clone()
    }
}

impl AuthUser for Profile {
    type Id = String;

    // Sessions are signed tokens, so the hash only needs to be stable per user.
    fn session_auth_hash(&self) -> &[u8] {
        self.id.as_bytes()
    }

    fn id(&self) -> Self::Id {
        Identifiable::id(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_select_star_row() {
        let json = r#"{
            "id": "7f1c2a9e-0000-4000-8000-000000000001",
            "role": "admin",
            "email": "ada@example.com",
            "name": "Ada",
            "created_at": "2024-01-01T00:00:00Z"
        }"#;

        let profile: Profile = serde_json::from_str(json).expect("row should deserialize");
        assert_eq!(profile.id, "7f1c2a9e-0000-4000-8000-000000000001");
        assert_eq!(profile.role.as_deref(), Some("admin"));
        assert_eq!(profile.column_str("email"), Some("ada@example.com"));
        assert_eq!(profile.column_str("name"), Some("Ada"));
        assert!(profile.extra.contains_key("created_at"));
    }

    #[test]
    fn null_role_is_kept_as_none() {
        let profile: Profile =
            serde_json::from_str(r#"{"id": "u2", "role": null}"#).expect("row should deserialize");
        assert_eq!(profile.role, None);
        assert_eq!(AuthUser::id(&profile), "u2");
    }
}
