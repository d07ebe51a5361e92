mod protected_app;
mod router;

pub use protected_app::ProtectedApp;
