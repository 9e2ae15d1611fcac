pub mod password;
pub use password::PasswordHasher;

pub mod token;
pub use token::{Claims, TokenCodec, TokenError};

pub mod visibility;
pub use visibility::{Owned, ReportScope, require_admin, visible_reports};

pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{AccessToken, AuthError, AuthService, CredentialStore};
pub use auth_service_impl::TokenAuthService;

pub mod user_service;
pub mod user_service_impl;
pub use user_service::{CreateUser, UserService};
pub use user_service_impl::SeaOrmUserService;

pub mod report_service;
pub mod report_service_impl;
pub use report_service::{NewReport, ReportError, ReportService};
pub use report_service_impl::SeaOrmReportService;
