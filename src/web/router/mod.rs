pub mod login;
pub mod logout;
pub mod protected;
pub mod session;

pub use login::router as create_login_route;
