//! `SeaORM` implementation of the `ReportService` trait.

use async_trait::async_trait;

use crate::db::{Report, Store};
use crate::domain::Principal;
use crate::services::report_service::{NewReport, ReportError, ReportService};
use crate::services::visibility::{ReportScope, visible_reports};

pub struct SeaOrmReportService {
    store: Store,
}

impl SeaOrmReportService {
    #[must_use]
    pub const fn new(store: Store) -> Self {
        Self { store }
    }
}

fn require_text<'a>(field: &str, value: &'a str) -> Result<&'a str, ReportError> {
    if value.trim().is_empty() {
        return Err(ReportError::Validation(format!("{field} cannot be empty")));
    }
    Ok(value)
}

#[async_trait]
impl ReportService for SeaOrmReportService {
    async fn create(&self, author: &Principal, report: NewReport) -> Result<Report, ReportError> {
        let category = require_text("Category", &report.category)?;
        let message = require_text("Message", &report.message)?;

        let created = self
            .store
            .create_report(author.id, category, message)
            .await?;

        Ok(created)
    }

    async fn list(&self, viewer: &Principal) -> Result<Vec<Report>, ReportError> {
        // The scope narrows the query; the filter is the rule itself.
        let rows = self
            .store
            .list_reports(ReportScope::for_principal(viewer))
            .await?;

        Ok(visible_reports(viewer, rows))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::NewUser;
    use crate::domain::Role;

    async fn seeded() -> (SeaOrmReportService, Principal, Principal, Principal) {
        let store = Store::with_pool_options("sqlite::memory:", 1, 1)
            .await
            .unwrap();

        let mut users = Vec::new();
        for (name, role) in [
            ("staff1", Role::Staff),
            ("staff2", Role::Staff),
            ("admin1", Role::Admin),
        ] {
            let user = store
                .create_user(NewUser {
                    username: name.to_string(),
                    email: format!("{name}@example.com"),
                    password_hash: "unused".to_string(),
                    role,
                })
                .await
                .unwrap();
            users.push(user);
        }

        let admin = users.pop().unwrap();
        let staff2 = users.pop().unwrap();
        let staff1 = users.pop().unwrap();
        (SeaOrmReportService::new(store), staff1, staff2, admin)
    }

    fn report(category: &str, message: &str) -> NewReport {
        NewReport {
            category: category.to_string(),
            message: message.to_string(),
        }
    }

    #[tokio::test]
    async fn test_visibility_by_role() {
        let (service, staff1, staff2, admin) = seeded().await;

        let r1 = service.create(&staff1, report("bug", "one")).await.unwrap();
        let r2 = service.create(&staff2, report("bug", "two")).await.unwrap();
        let r3 = service.create(&staff1, report("idea", "three")).await.unwrap();

        let staff_view: Vec<i32> = service
            .list(&staff1)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(staff_view, [r1.id, r3.id]);

        let admin_view: Vec<i32> = service
            .list(&admin)
            .await
            .unwrap()
            .iter()
            .map(|r| r.id)
            .collect();
        assert_eq!(admin_view, [r1.id, r2.id, r3.id]);
    }

    #[tokio::test]
    async fn test_admin_can_create_and_owns_report() {
        let (service, _, _, admin) = seeded().await;
        let created = service.create(&admin, report("ops", "restart")).await.unwrap();
        assert_eq!(created.user_id, admin.id);
    }

    #[tokio::test]
    async fn test_blank_fields_rejected() {
        let (service, staff1, _, _) = seeded().await;

        let err = service.create(&staff1, report("bug", "   ")).await.unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));

        let err = service.create(&staff1, report("", "msg")).await.unwrap_err();
        assert!(matches!(err, ReportError::Validation(_)));
    }
}
