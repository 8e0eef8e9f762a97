//! Command structs for engine operations.
//!
//! These types group parameters for write operations (purchase, sale,
//! hold, ledger entry), keeping call sites readable and avoiding long
//! argument lists.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{Disposition, HoldStatus, LedgerEntryKind};

/// Create a vehicle purchase record.
#[derive(Clone, Debug)]
pub struct VehicleNewCmd {
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

impl VehicleNewCmd {
    #[must_use]
    pub fn new(
        vin: impl Into<String>,
        seller_name: impl Into<String>,
        purchase_price_cents: i64,
        purchase_date: NaiveDate,
        driver_id: impl Into<String>,
        yard_id: impl Into<String>,
    ) -> Self {
        Self {
            vin: vin.into(),
            year: None,
            make: None,
            seller_name: seller_name.into(),
            seller_address: None,
            seller_phone: None,
            purchase_price_cents,
            purchase_date,
            driver_id: driver_id.into(),
            yard_id: yard_id.into(),
        }
    }

    #[must_use]
    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    #[must_use]
    pub fn make(mut self, make: impl Into<String>) -> Self {
        self.make = Some(make.into());
        self
    }

    #[must_use]
    pub fn seller_address(mut self, address: impl Into<String>) -> Self {
        self.seller_address = Some(address.into());
        self
    }

    #[must_use]
    pub fn seller_phone(mut self, phone: impl Into<String>) -> Self {
        self.seller_phone = Some(phone.into());
        self
    }
}

/// Record an outgoing sale/scrap/export disposition.
#[derive(Clone, Debug)]
pub struct SaleNewCmd {
    pub vehicle_id: Uuid,
    pub buyer_name: String,
    pub buyer_address: String,
    pub buyer_phone: String,
    pub buyer_license: Option<String>,
    pub sale_price_cents: i64,
    pub received_cents: Option<i64>,
    pub sale_date: NaiveDate,
    pub disposition: Disposition,
    pub notes: Option<String>,
    pub recorded_by: String,
}

impl SaleNewCmd {
    #[must_use]
    pub fn new(
        vehicle_id: Uuid,
        buyer_name: impl Into<String>,
        buyer_address: impl Into<String>,
        buyer_phone: impl Into<String>,
        sale_price_cents: i64,
        sale_date: NaiveDate,
        disposition: Disposition,
        recorded_by: impl Into<String>,
    ) -> Self {
        Self {
            vehicle_id,
            buyer_name: buyer_name.into(),
            buyer_address: buyer_address.into(),
            buyer_phone: buyer_phone.into(),
            buyer_license: None,
            sale_price_cents,
            received_cents: None,
            sale_date,
            disposition,
            notes: None,
            recorded_by: recorded_by.into(),
        }
    }

    #[must_use]
    pub fn buyer_license(mut self, license: impl Into<String>) -> Self {
        self.buyer_license = Some(license.into());
        self
    }

    #[must_use]
    pub fn received_cents(mut self, received_cents: i64) -> Self {
        self.received_cents = Some(received_cents);
        self
    }

    #[must_use]
    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Place a vehicle on an impound/lien hold.
#[derive(Clone, Debug)]
pub struct HoldNewCmd {
    pub vehicle_id: Uuid,
    pub impound_date: NaiveDate,
    pub release_date: Option<NaiveDate>,
    pub storage_location: Option<String>,
    pub authority: Option<String>,
    pub fees_cents: i64,
}

impl HoldNewCmd {
    #[must_use]
    pub fn new(vehicle_id: Uuid, impound_date: NaiveDate) -> Self {
        Self {
            vehicle_id,
            impound_date,
            release_date: None,
            storage_location: None,
            authority: None,
            fees_cents: 0,
        }
    }

    #[must_use]
    pub fn release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    #[must_use]
    pub fn storage_location(mut self, location: impl Into<String>) -> Self {
        self.storage_location = Some(location.into());
        self
    }

    #[must_use]
    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.authority = Some(authority.into());
        self
    }

    #[must_use]
    pub fn fees_cents(mut self, fees_cents: i64) -> Self {
        self.fees_cents = fees_cents;
        self
    }
}

/// Move a hold through its state machine.
#[derive(Clone, Debug)]
pub struct HoldStatusCmd {
    pub hold_id: Uuid,
    pub new_status: HoldStatus,
    pub release_date: Option<NaiveDate>,
    pub auction_date: Option<NaiveDate>,
    pub released_to: Option<String>,
}

impl HoldStatusCmd {
    #[must_use]
    pub fn new(hold_id: Uuid, new_status: HoldStatus) -> Self {
        Self {
            hold_id,
            new_status,
            release_date: None,
            auction_date: None,
            released_to: None,
        }
    }

    #[must_use]
    pub fn release_date(mut self, date: NaiveDate) -> Self {
        self.release_date = Some(date);
        self
    }

    #[must_use]
    pub fn auction_date(mut self, date: NaiveDate) -> Self {
        self.auction_date = Some(date);
        self
    }

    #[must_use]
    pub fn released_to(mut self, recipient: impl Into<String>) -> Self {
        self.released_to = Some(recipient.into());
        self
    }
}

/// Append a cash-drawer ledger entry.
#[derive(Clone, Debug)]
pub struct LedgerEntryCmd {
    pub driver_id: String,
    pub kind: LedgerEntryKind,
    pub amount_cents: i64,
    pub reason: Option<String>,
    pub actor: String,
    pub vin: Option<String>,
    pub sale_id: Option<Uuid>,
}

impl LedgerEntryCmd {
    #[must_use]
    pub fn new(
        driver_id: impl Into<String>,
        kind: LedgerEntryKind,
        amount_cents: i64,
        actor: impl Into<String>,
    ) -> Self {
        Self {
            driver_id: driver_id.into(),
            kind,
            amount_cents,
            reason: None,
            actor: actor.into(),
            vin: None,
            sale_id: None,
        }
    }

    #[must_use]
    pub fn reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
