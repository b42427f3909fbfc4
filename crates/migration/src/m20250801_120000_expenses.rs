use sea_orm_migration::prelude::*;

use crate::m20250801_100000_users::Users;
use crate::m20250801_110000_metadata::{Categories, Suppliers};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub(crate) enum Expenses {
    Table,
    Id,
    ExpenseDate,
    AmountMinor,
    Currency,
    Description,
    PaymentMethod,
    SupplierId,
    SupplierName,
    CategoryId,
    CategoryName,
    UserId,
    UserName,
    AddedById,
    AddedByName,
    ReceiptUrl,
    CreatedAt,
    RemovedAt,
    RemovedById,
    RemovedByName,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Expenses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Expenses::Id)
                            .big_integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Expenses::ExpenseDate).date().not_null())
                    .col(
                        ColumnDef::new(Expenses::AmountMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::Currency).string().not_null())
                    .col(ColumnDef::new(Expenses::Description).string().not_null())
                    .col(ColumnDef::new(Expenses::PaymentMethod).string())
                    .col(ColumnDef::new(Expenses::SupplierId).big_integer())
                    .col(ColumnDef::new(Expenses::SupplierName).string())
                    .col(ColumnDef::new(Expenses::CategoryId).big_integer())
                    .col(ColumnDef::new(Expenses::CategoryName).string())
                    .col(ColumnDef::new(Expenses::UserId).big_integer().not_null())
                    .col(ColumnDef::new(Expenses::UserName).string().not_null())
                    .col(
                        ColumnDef::new(Expenses::AddedById)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Expenses::AddedByName).string().not_null())
                    .col(ColumnDef::new(Expenses::ReceiptUrl).text())
                    .col(ColumnDef::new(Expenses::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Expenses::RemovedAt).timestamp())
                    .col(ColumnDef::new(Expenses::RemovedById).big_integer())
                    .col(ColumnDef::new(Expenses::RemovedByName).string())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-user_id")
                            .from(Expenses::Table, Expenses::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-supplier_id")
                            .from(Expenses::Table, Expenses::SupplierId)
                            .to(Suppliers::Table, Suppliers::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expenses-category_id")
                            .from(Expenses::Table, Expenses::CategoryId)
                            .to(Categories::Table, Categories::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-expense_date")
                    .table(Expenses::Table)
                    .col(Expenses::ExpenseDate)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expenses-removed_at")
                    .table(Expenses::Table)
                    .col(Expenses::RemovedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Expenses::Table).to_owned())
            .await?;
        Ok(())
    }
}
