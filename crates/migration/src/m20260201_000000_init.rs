//! Initial schema migration - creates all tables from scratch.
//!
//! - `users`: basic-auth credentials for the HTTP surface
//! - `yard_settings`: NMVTIS credentials and transfer recipient per yard
//! - `vehicle_transactions`: vehicle purchase records
//! - `vehicle_sales`: outgoing disposition records
//! - `impound_holds`: impound/lien holds with the 21-day transfer window
//! - `cash_ledger_entries`: append-only per-driver cash drawer
//! - `compliance_reports`: pending/submitted NMVTIS report entries

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Users {
    Table,
    Username,
    Password,
}

#[derive(Iden)]
enum YardSettings {
    Table,
    YardId,
    Name,
    Address,
    Phone,
    DismantlerLicense,
    NmvtisId,
    NmvtisPin,
    TransferRecipientName,
    TransferRecipientAddress,
    TransferRecipientLicense,
}

#[derive(Iden)]
enum VehicleTransactions {
    Table,
    Id,
    Vin,
    Year,
    Make,
    SellerName,
    SellerAddress,
    SellerPhone,
    PurchasePriceCents,
    PurchaseDate,
    DriverId,
    YardId,
    Disposition,
    ImpoundOrLien,
    SaleRecordId,
    CreatedAt,
}

#[derive(Iden)]
enum VehicleSales {
    Table,
    Id,
    OriginalTransactionId,
    BuyerName,
    BuyerAddress,
    BuyerPhone,
    BuyerLicense,
    SalePriceCents,
    ReceivedCents,
    SaleDate,
    Disposition,
    Notes,
    RecordedBy,
    CreatedAt,
}

#[derive(Iden)]
enum ImpoundHolds {
    Table,
    Id,
    VehicleId,
    Status,
    ImpoundDate,
    ReleaseDate,
    AuctionDate,
    ReleasedTo,
    StorageLocation,
    Authority,
    FeesCents,
    AutoTransferDate,
    TransferSaleId,
}

#[derive(Iden)]
enum CashLedgerEntries {
    Table,
    Id,
    DriverId,
    Kind,
    AmountCents,
    Reason,
    Actor,
    Vin,
    SaleId,
    RecordedAt,
}

#[derive(Iden)]
enum ComplianceReports {
    Table,
    Id,
    VehicleId,
    SaleId,
    Kind,
    Status,
    DueDate,
    SubmittedAt,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Username)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Users::Password).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(YardSettings::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(YardSettings::YardId)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(YardSettings::Name).string().not_null())
                    .col(ColumnDef::new(YardSettings::Address).string())
                    .col(ColumnDef::new(YardSettings::Phone).string())
                    .col(ColumnDef::new(YardSettings::DismantlerLicense).string())
                    .col(ColumnDef::new(YardSettings::NmvtisId).string().not_null())
                    .col(ColumnDef::new(YardSettings::NmvtisPin).string().not_null())
                    .col(
                        ColumnDef::new(YardSettings::TransferRecipientName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(YardSettings::TransferRecipientAddress).string())
                    .col(ColumnDef::new(YardSettings::TransferRecipientLicense).string())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VehicleTransactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VehicleTransactions::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(VehicleTransactions::Vin).string().not_null())
                    .col(ColumnDef::new(VehicleTransactions::Year).integer())
                    .col(ColumnDef::new(VehicleTransactions::Make).string())
                    .col(
                        ColumnDef::new(VehicleTransactions::SellerName)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehicleTransactions::SellerAddress).string())
                    .col(ColumnDef::new(VehicleTransactions::SellerPhone).string())
                    .col(
                        ColumnDef::new(VehicleTransactions::PurchasePriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VehicleTransactions::PurchaseDate)
                            .date()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VehicleTransactions::DriverId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VehicleTransactions::YardId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(VehicleTransactions::Disposition)
                            .string()
                            .not_null()
                            .default("tbd"),
                    )
                    .col(
                        ColumnDef::new(VehicleTransactions::ImpoundOrLien)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(VehicleTransactions::SaleRecordId).string())
                    .col(
                        ColumnDef::new(VehicleTransactions::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-vehicle_transactions-vin")
                    .table(VehicleTransactions::Table)
                    .col(VehicleTransactions::Vin)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-vehicle_transactions-yard_id-disposition")
                    .table(VehicleTransactions::Table)
                    .col(VehicleTransactions::YardId)
                    .col(VehicleTransactions::Disposition)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(VehicleSales::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(VehicleSales::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(VehicleSales::OriginalTransactionId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehicleSales::BuyerName).string().not_null())
                    .col(ColumnDef::new(VehicleSales::BuyerAddress).string())
                    .col(ColumnDef::new(VehicleSales::BuyerPhone).string())
                    .col(ColumnDef::new(VehicleSales::BuyerLicense).string())
                    .col(
                        ColumnDef::new(VehicleSales::SalePriceCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehicleSales::ReceivedCents).big_integer())
                    .col(ColumnDef::new(VehicleSales::SaleDate).date().not_null())
                    .col(
                        ColumnDef::new(VehicleSales::Disposition)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(VehicleSales::Notes).string())
                    .col(ColumnDef::new(VehicleSales::RecordedBy).string().not_null())
                    .col(
                        ColumnDef::new(VehicleSales::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-vehicle_sales-original_transaction_id")
                            .from(VehicleSales::Table, VehicleSales::OriginalTransactionId)
                            .to(VehicleTransactions::Table, VehicleTransactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-vehicle_sales-original_transaction_id")
                    .table(VehicleSales::Table)
                    .col(VehicleSales::OriginalTransactionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ImpoundHolds::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ImpoundHolds::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ImpoundHolds::VehicleId).string().not_null())
                    .col(
                        ColumnDef::new(ImpoundHolds::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(ImpoundHolds::ImpoundDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ImpoundHolds::ReleaseDate).date())
                    .col(ColumnDef::new(ImpoundHolds::AuctionDate).date())
                    .col(ColumnDef::new(ImpoundHolds::ReleasedTo).string())
                    .col(ColumnDef::new(ImpoundHolds::StorageLocation).string())
                    .col(ColumnDef::new(ImpoundHolds::Authority).string())
                    .col(
                        ColumnDef::new(ImpoundHolds::FeesCents)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(ImpoundHolds::AutoTransferDate).date())
                    .col(ColumnDef::new(ImpoundHolds::TransferSaleId).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-impound_holds-vehicle_id")
                            .from(ImpoundHolds::Table, ImpoundHolds::VehicleId)
                            .to(VehicleTransactions::Table, VehicleTransactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-impound_holds-status-release_date")
                    .table(ImpoundHolds::Table)
                    .col(ImpoundHolds::Status)
                    .col(ImpoundHolds::ReleaseDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CashLedgerEntries::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CashLedgerEntries::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CashLedgerEntries::DriverId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashLedgerEntries::Kind).string().not_null())
                    .col(
                        ColumnDef::new(CashLedgerEntries::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(CashLedgerEntries::Reason).string())
                    .col(ColumnDef::new(CashLedgerEntries::Actor).string().not_null())
                    .col(ColumnDef::new(CashLedgerEntries::Vin).string())
                    .col(ColumnDef::new(CashLedgerEntries::SaleId).string())
                    .col(
                        ColumnDef::new(CashLedgerEntries::RecordedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-cash_ledger_entries-driver_id-recorded_at")
                    .table(CashLedgerEntries::Table)
                    .col(CashLedgerEntries::DriverId)
                    .col(CashLedgerEntries::RecordedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ComplianceReports::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ComplianceReports::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ComplianceReports::VehicleId)
                            .string()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComplianceReports::SaleId).string())
                    .col(ColumnDef::new(ComplianceReports::Kind).string().not_null())
                    .col(
                        ColumnDef::new(ComplianceReports::Status)
                            .string()
                            .not_null()
                            .default("pending"),
                    )
                    .col(
                        ColumnDef::new(ComplianceReports::DueDate)
                            .date()
                            .not_null(),
                    )
                    .col(ColumnDef::new(ComplianceReports::SubmittedAt).timestamp())
                    .col(
                        ColumnDef::new(ComplianceReports::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-compliance_reports-vehicle_id")
                            .from(ComplianceReports::Table, ComplianceReports::VehicleId)
                            .to(VehicleTransactions::Table, VehicleTransactions::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-compliance_reports-status-due_date")
                    .table(ComplianceReports::Table)
                    .col(ComplianceReports::Status)
                    .col(ComplianceReports::DueDate)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(ComplianceReports::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CashLedgerEntries::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ImpoundHolds::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleSales::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(VehicleTransactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(YardSettings::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
