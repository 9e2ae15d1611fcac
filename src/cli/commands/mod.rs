mod admin;

pub use admin::{cmd_create_admin, cmd_init_db};
