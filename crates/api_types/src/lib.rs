use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub mod vehicle {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VehicleNew {
        pub vin: String,
        pub year: Option<i32>,
        pub make: Option<String>,
        pub seller_name: String,
        pub seller_address: Option<String>,
        pub seller_phone: Option<String>,
        pub purchase_price_cents: i64,
        pub purchase_date: NaiveDate,
        pub driver_id: String,
        pub yard_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VehicleView {
        pub id: Uuid,
        pub vin: String,
        pub year: Option<i32>,
        pub make: Option<String>,
        pub seller_name: String,
        pub seller_address: Option<String>,
        pub seller_phone: Option<String>,
        pub purchase_price_cents: i64,
        pub purchase_date: NaiveDate,
        pub driver_id: String,
        pub yard_id: String,
        /// Canonical disposition string: `tbd`, `sold`, `scrapped`,
        /// `exported` or `parts`.
        pub disposition: String,
        pub impound_or_lien: bool,
        pub sale_record_id: Option<Uuid>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct VehicleListResponse {
        pub vehicles: Vec<VehicleView>,
    }

    /// Query parameters for `GET /vehicles` and `GET /vehicles/available`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct VehicleListQuery {
        pub yard_id: String,
    }

    /// Query parameters for `GET /vehicles/search`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct VinSearchQuery {
        /// Matched case-insensitively anywhere in the VIN.
        pub vin: String,
    }
}

pub mod sale {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SaleNew {
        pub vehicle_id: Uuid,
        pub buyer_name: String,
        pub buyer_address: String,
        pub buyer_phone: String,
        pub buyer_license: Option<String>,
        pub sale_price_cents: i64,
        pub received_cents: Option<i64>,
        pub sale_date: NaiveDate,
        /// One of `sold`, `scrapped`, `exported`, `parts`.
        pub disposition: String,
        pub notes: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SaleView {
        pub id: Uuid,
        pub vehicle_id: Uuid,
        pub buyer_name: String,
        pub buyer_address: Option<String>,
        pub buyer_phone: Option<String>,
        pub buyer_license: Option<String>,
        pub sale_price_cents: i64,
        pub received_cents: Option<i64>,
        pub sale_date: NaiveDate,
        pub disposition: String,
        pub notes: Option<String>,
        pub recorded_by: String,
        pub created_at: DateTime<Utc>,
    }

    /// The sale is committed even when `warnings` is non-empty; warnings
    /// describe best-effort follow-up steps that failed.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct SaleCreated {
        pub sale: SaleView,
        pub warnings: Vec<String>,
    }
}

pub mod hold {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HoldNew {
        pub vehicle_id: Uuid,
        pub impound_date: NaiveDate,
        pub release_date: Option<NaiveDate>,
        pub storage_location: Option<String>,
        pub authority: Option<String>,
        pub fees_cents: Option<i64>,
    }

    /// Body for `PATCH /holds/:id/status`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct HoldStatusUpdate {
        /// Target status: `processed`, `released` or `auctioned`.
        pub status: String,
        pub release_date: Option<NaiveDate>,
        pub auction_date: Option<NaiveDate>,
        pub released_to: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct HoldView {
        pub id: Uuid,
        pub vehicle_id: Uuid,
        pub status: String,
        pub impound_date: NaiveDate,
        pub release_date: Option<NaiveDate>,
        pub auction_date: Option<NaiveDate>,
        pub released_to: Option<String>,
        pub storage_location: Option<String>,
        pub authority: Option<String>,
        pub fees_cents: i64,
        pub auto_transfer_date: Option<NaiveDate>,
        pub transfer_sale_id: Option<Uuid>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SweepResponse {
        /// Ids of holds transferred by this sweep run.
        pub transferred: Vec<Uuid>,
    }
}

pub mod ledger {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerEntryNew {
        pub driver_id: String,
        /// One of `deposit`, `withdrawal`, `adjustment`, `set_balance`.
        pub kind: String,
        /// Signed only for `adjustment`.
        pub amount_cents: i64,
        pub reason: Option<String>,
        pub vin: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LedgerEntryView {
        pub id: Uuid,
        pub driver_id: String,
        pub kind: String,
        pub amount_cents: i64,
        pub reason: Option<String>,
        pub actor: String,
        pub vin: Option<String>,
        pub sale_id: Option<Uuid>,
        pub recorded_at: DateTime<Utc>,
    }

    /// Query parameters for `GET /ledger/balance`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceQuery {
        pub driver_id: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BalanceResponse {
        pub driver_id: String,
        pub balance_cents: i64,
        /// Human-readable dollar rendering, e.g. `$120.00`.
        pub display: String,
    }
}

pub mod report {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportView {
        pub id: Uuid,
        pub vehicle_id: Uuid,
        pub sale_id: Option<Uuid>,
        /// `purchase` or `disposition`.
        pub kind: String,
        /// `pending`, `scheduled`, `submitted` or `failed`.
        pub status: String,
        pub due_date: NaiveDate,
        pub submitted_at: Option<DateTime<Utc>>,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ReportListResponse {
        pub reports: Vec<ReportView>,
    }

    /// Body for `POST /reports/submitted`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct MarkSubmitted {
        pub ids: Vec<Uuid>,
    }

    /// Query parameters for `GET /reports/nmvtis.csv`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct NmvtisBatchQuery {
        pub yard_id: String,
    }
}

pub mod yard {
    use super::*;

    /// Body for `PUT /yard` and response for `GET /yard`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct YardSettingsDto {
        pub yard_id: String,
        pub name: String,
        pub address: Option<String>,
        pub phone: Option<String>,
        pub dismantler_license: Option<String>,
        pub nmvtis_id: String,
        pub nmvtis_pin: String,
        pub transfer_recipient_name: String,
        pub transfer_recipient_address: Option<String>,
        pub transfer_recipient_license: Option<String>,
    }

    /// Query parameters for `GET /yard`.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct YardQuery {
        pub yard_id: String,
    }
}
