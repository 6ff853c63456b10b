//! `SeaORM` entity definitions.

pub mod accounts;
pub mod categories;
pub mod invoice_items;
pub mod invoices;
pub mod ledger_entries;
pub mod sea_orm_active_enums;
