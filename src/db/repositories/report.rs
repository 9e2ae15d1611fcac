use crate::domain::UserId;
use crate::entities::{prelude::*, reports};
use crate::services::visibility::{Owned, ReportScope};
use anyhow::{Context, Result};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set,
};
use tracing::info;

/// Repository for report rows
pub struct ReportRepository {
    conn: DatabaseConnection,
}

impl ReportRepository {
    pub fn new(conn: DatabaseConnection) -> Self {
        Self { conn }
    }

    fn map_model(r: reports::Model) -> Report {
        Report {
            id: r.id,
            category: r.category,
            message: r.message,
            user_id: UserId::new(r.user_id),
            created_at: r.created_at,
        }
    }

    pub async fn create(&self, owner: UserId, category: &str, message: &str) -> Result<Report> {
        let active_model = reports::ActiveModel {
            category: Set(category.to_string()),
            message: Set(message.to_string()),
            user_id: Set(owner.value()),
            created_at: Set(chrono::Utc::now().to_rfc3339()),
            ..Default::default()
        };

        let model = active_model
            .insert(&self.conn)
            .await
            .context("Failed to insert report")?;

        info!(report_id = model.id, owner = %owner, "Report created");
        Ok(Self::map_model(model))
    }

    /// Lists reports in id order, narrowed to the owner when the scope says so.
    pub async fn list(&self, scope: ReportScope) -> Result<Vec<Report>> {
        let mut query = Reports::find();

        if let ReportScope::OwnedBy(owner) = scope {
            query = query.filter(reports::Column::UserId.eq(owner.value()));
        }

        let rows = query
            .order_by_asc(reports::Column::Id)
            .all(&self.conn)
            .await
            .context("Failed to list reports")?;

        Ok(rows.into_iter().map(Self::map_model).collect())
    }
}

// ============================================================================
// Data Types
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    pub id: i32,
    pub category: String,
    pub message: String,
    pub user_id: UserId,
    pub created_at: String,
}

impl Owned for Report {
    fn owner_id(&self) -> UserId {
        self.user_id
    }
}
