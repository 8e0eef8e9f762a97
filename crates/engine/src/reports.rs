//! Pending/submitted units of required regulatory reporting.
//!
//! Every disposition-changing event produces or updates exactly one
//! entry; entries are never silently dropped.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::EngineError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Purchase,
    Disposition,
}

impl ReportKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Purchase => "purchase",
            Self::Disposition => "disposition",
        }
    }
}

impl TryFrom<&str> for ReportKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "purchase" => Ok(Self::Purchase),
            "disposition" => Ok(Self::Disposition),
            other => Err(EngineError::Validation(format!(
                "invalid report kind: {other}"
            ))),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    Scheduled,
    Submitted,
    Failed,
}

impl ReportStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Scheduled => "scheduled",
            Self::Submitted => "submitted",
            Self::Failed => "failed",
        }
    }

    /// Entries still awaiting submission.
    pub fn is_open(self) -> bool {
        matches!(self, Self::Pending | Self::Scheduled)
    }
}

impl TryFrom<&str> for ReportStatus {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "pending" => Ok(Self::Pending),
            "scheduled" => Ok(Self::Scheduled),
            "submitted" => Ok(Self::Submitted),
            "failed" => Ok(Self::Failed),
            other => Err(EngineError::Validation(format!(
                "invalid report status: {other}"
            ))),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplianceReportEntry {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    /// Present for disposition reports; purchase reports have none.
    pub sale_id: Option<Uuid>,
    pub kind: ReportKind,
    pub status: ReportStatus,
    pub due_date: NaiveDate,
    pub submitted_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "compliance_reports")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: String,
    pub vehicle_id: String,
    pub sale_id: Option<String>,
    pub kind: String,
    pub status: String,
    pub due_date: Date,
    pub submitted_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::vehicles::Entity",
        from = "Column::VehicleId",
        to = "super::vehicles::Column::Id",
        on_update = "NoAction",
        on_delete = "NoAction"
    )]
    Vehicles,
}

impl Related<super::vehicles::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Vehicles.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<&ComplianceReportEntry> for ActiveModel {
    fn from(entry: &ComplianceReportEntry) -> Self {
        Self {
            id: ActiveValue::Set(entry.id.to_string()),
            vehicle_id: ActiveValue::Set(entry.vehicle_id.to_string()),
            sale_id: ActiveValue::Set(entry.sale_id.map(|id| id.to_string())),
            kind: ActiveValue::Set(entry.kind.as_str().to_string()),
            status: ActiveValue::Set(entry.status.as_str().to_string()),
            due_date: ActiveValue::Set(entry.due_date),
            submitted_at: ActiveValue::Set(entry.submitted_at),
            created_at: ActiveValue::Set(entry.created_at),
        }
    }
}

impl TryFrom<Model> for ComplianceReportEntry {
    type Error = EngineError;

    fn try_from(model: Model) -> Result<Self, Self::Error> {
        Ok(Self {
            id: crate::util::parse_uuid(&model.id, "report")?,
            vehicle_id: crate::util::parse_uuid(&model.vehicle_id, "vehicle")?,
            sale_id: model.sale_id.and_then(|s| Uuid::parse_str(&s).ok()),
            kind: ReportKind::try_from(model.kind.as_str())?,
            status: ReportStatus::try_from(model.status.as_str())?,
            due_date: model.due_date,
            submitted_at: model.submitted_at,
            created_at: model.created_at,
        })
    }
}
