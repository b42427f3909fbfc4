pub use sea_orm_migration::prelude::*;

mod m20250801_100000_users;
mod m20250801_110000_metadata;
mod m20250801_120000_expenses;
mod m20250801_130000_audit_log;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250801_100000_users::Migration),
            Box::new(m20250801_110000_metadata::Migration),
            Box::new(m20250801_120000_expenses::Migration),
            Box::new(m20250801_130000_audit_log::Migration),
        ]
    }
}
