//! Session claim set carried in the signed session token.

use {
    serde::{Deserialize, Serialize},
    time::OffsetDateTime,
    typed_builder::TypedBuilder,
};

use crate::model::Profile;

mod token;

pub use token::{SessionClaims, SessionKeys};

/// The user object of a session as returned to clients.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
pub struct SessionUser {
    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[builder(default, setter(strip_option, into))]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl SessionUser {
    /// Seeds the display fields of a new session from the profile row.
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            name: profile.column_str("name").map(ToString::to_string),
            email: profile.column_str("email").map(ToString::to_string),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
    #[serde(
        default,
        with = "time::serde::rfc3339::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub expires: Option<OffsetDateTime>,
}

impl Session {
    pub const fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Copies `id` and `role` from the resolved profile onto the session user.
///
/// Does nothing when the session carries no user object.
pub fn project_claims(session: &mut Session, profile: &Profile) {
    if let Some(user) = session.user.as_mut() {
        user.id = Some(profile.id.clone());
        user.role.clone_from(&profile.role);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn admin_profile() -> Profile {
        Profile {
            id: "u1".into(),
            role: Some("admin".into()),
            ..Profile::default()
        }
    }

    #[test]
    fn projection_copies_id_and_role() {
        let mut session = Session {
            user: Some(SessionUser::builder().email("ada@example.com").build()),
            expires: None,
        };

        project_claims(&mut session, &admin_profile());

        let user = session.user.expect("user kept");
        assert_eq!(user.id.as_deref(), Some("u1"));
        assert_eq!(user.role.as_deref(), Some("admin"));
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
    }

    #[test]
    fn projection_without_user_is_noop() {
        let mut session = Session::default();
        project_claims(&mut session, &admin_profile());
        assert_eq!(session, Session::default());
    }

    #[test]
    fn projection_overwrites_stale_role() {
        let mut session = Session {
            user: Some(SessionUser::builder().id("u1").role("admin").build()),
            expires: None,
        };
        let demoted = Profile {
            id: "u1".into(),
            role: None,
            ..Profile::default()
        };

        project_claims(&mut session, &demoted);
        assert_eq!(session.user.and_then(|u| u.role), None);
    }

    #[test]
    fn empty_session_serializes_to_empty_object() {
        let json = serde_json::to_string(&Session::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn user_seeded_from_profile_columns() {
        let profile: Profile = serde_json::from_str(
            r#"{"id": "u1", "role": "admin", "name": "Ada", "email": "ada@example.com"}"#,
        )
        .unwrap();

        let user = SessionUser::from_profile(&profile);
        assert_eq!(user.name.as_deref(), Some("Ada"));
        assert_eq!(user.email.as_deref(), Some("ada@example.com"));
        assert_eq!(user.id, None);
        assert_eq!(user.role, None);
    }
}
