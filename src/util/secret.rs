use std::fmt;

/// Declares a `String` newtype whose `Debug` output never reveals the value.
macro_rules! new_secret_type {
    (
        $(#[$attr:meta])*
        $name:ident(String)
    ) => {
        $(#[$attr])*
        pub struct $name(String);

        impl $name {
            pub const fn new(secret: String) -> Self {
                Self(secret)
            }

            pub fn secret(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "([redacted])"))
            }
        }
    };
}

new_secret_type![
    /// Privileged key for the identity service, sent as `apikey` and bearer token.
    #[derive(Clone, PartialEq, Eq)]
    ServiceRoleKey(String)
];

new_secret_type![
    /// HMAC secret that signs session tokens.
    #[derive(Clone, PartialEq, Eq)]
    SessionSecret(String)
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_is_redacted() {
        let key = ServiceRoleKey::new("service-role-key-value".into());
        assert_eq!(format!("{key:?}"), "ServiceRoleKey([redacted])");
        assert_eq!(key.secret(), "service-role-key-value");
    }
}
