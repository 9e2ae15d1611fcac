pub mod prelude;

pub mod reports;
pub mod users;
