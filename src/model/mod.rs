mod user;
pub use user::Profile;

pub trait Identifiable<Id> {
    fn id(&self) -> Id;
}
