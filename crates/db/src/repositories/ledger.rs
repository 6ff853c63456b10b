//! Ledger entry queries.

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder,
    Set,
};
use uuid::Uuid;

use tally_core::ledger::{EntryFilter, LedgerEntry, NewLedgerEntry};
use tally_shared::types::{AccountId, CategoryId, ClientId, EntryId, InvoiceId};

use crate::entities::ledger_entries;
use crate::entities::sea_orm_active_enums::TransactionKind;

impl From<ledger_entries::Model> for LedgerEntry {
    fn from(model: ledger_entries::Model) -> Self {
        Self {
            id: EntryId::from_uuid(model.id),
            date: model.date,
            kind: model.kind.into(),
            category_id: model.category_id.map(CategoryId::from_uuid),
            amount: model.amount,
            account_id: AccountId::from_uuid(model.account_id),
            to_account_id: model.to_account_id.map(AccountId::from_uuid),
            client_id: model.client_id.map(ClientId::from_uuid),
            invoice_id: model.invoice_id.map(InvoiceId::from_uuid),
            description: model.description,
        }
    }
}

/// Appends an entry.
pub async fn insert_entry<C>(db: &C, entry: NewLedgerEntry) -> Result<EntryId, DbErr>
where
    C: ConnectionTrait,
{
    let id = EntryId::new();
    ledger_entries::ActiveModel {
        id: Set(id.into_inner()),
        date: Set(entry.date),
        kind: Set(TransactionKind::from(entry.kind)),
        category_id: Set(entry.category_id.map(CategoryId::into_inner)),
        amount: Set(entry.amount),
        account_id: Set(entry.account_id.into_inner()),
        to_account_id: Set(entry.to_account_id.map(AccountId::into_inner)),
        client_id: Set(entry.client_id.map(ClientId::into_inner)),
        invoice_id: Set(entry.invoice_id.map(InvoiceId::into_inner)),
        description: Set(entry.description),
        created_at: Set(Utc::now().into()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    Ok(id)
}

/// Removes every entry the invoice owns.
pub async fn delete_by_invoice<C>(db: &C, invoice_id: Uuid) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let result = ledger_entries::Entity::delete_many()
        .filter(ledger_entries::Column::InvoiceId.eq(invoice_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Entries matching the filter by date, then insertion order.
pub async fn list_entries<C>(db: &C, filter: &EntryFilter) -> Result<Vec<LedgerEntry>, DbErr>
where
    C: ConnectionTrait,
{
    let mut query = ledger_entries::Entity::find();

    if let Some(invoice_id) = filter.invoice_id {
        query = query.filter(ledger_entries::Column::InvoiceId.eq(invoice_id.into_inner()));
    }
    if let Some(kind) = filter.kind {
        query = query.filter(ledger_entries::Column::Kind.eq(TransactionKind::from(kind)));
    }
    if let Some(category_id) = filter.category_id {
        query = query.filter(ledger_entries::Column::CategoryId.eq(category_id.into_inner()));
    }
    if let Some(account_id) = filter.account_id {
        let id = account_id.into_inner();
        query = query.filter(
            ledger_entries::Column::AccountId
                .eq(id)
                .or(ledger_entries::Column::ToAccountId.eq(id)),
        );
    }
    if let Some(from) = filter.date_from {
        query = query.filter(ledger_entries::Column::Date.gte(from));
    }
    if let Some(to) = filter.date_to {
        query = query.filter(ledger_entries::Column::Date.lte(to));
    }

    Ok(query
        .order_by_asc(ledger_entries::Column::Date)
        .order_by_asc(ledger_entries::Column::Seq)
        .all(db)
        .await?
        .into_iter()
        .map(LedgerEntry::from)
        .collect())
}
