pub mod auth {

    pub const TOKEN_TYPE: &str = "bearer";

    pub const DEFAULT_TOKEN_TTL_MINUTES: u32 = 30;

    /// Matches the bcrypt block limit existing clients were built against.
    pub const DEFAULT_MAX_PASSWORD_BYTES: usize = 72;

    pub const MAX_PASSWORD_BYTES_CEILING: usize = 4096;

    pub const DEFAULT_MIN_PASSWORD_LENGTH: usize = 6;
}

pub mod env {

    pub const SECRET_KEY: &str = "REPORTKEEP_SECRET_KEY";

    pub const DATABASE_URL: &str = "REPORTKEEP_DATABASE_URL";
}
