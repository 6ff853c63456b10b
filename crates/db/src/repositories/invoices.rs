//! Invoice header and item queries.

use chrono::Utc;
use sea_orm::ActiveValue::{NotSet, Unchanged};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbBackend, DbErr, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, Select, Set, Statement,
};
use uuid::Uuid;

use tally_core::invoice::{Invoice, InvoiceFilter, InvoiceItem};
use tally_shared::types::{ClientId, InvoiceId, InvoiceItemId, PageRequest};

use crate::entities::sea_orm_active_enums::{DocumentType, InvoiceStatus};
use crate::entities::{invoice_items, invoices};

impl From<invoices::Model> for Invoice {
    fn from(model: invoices::Model) -> Self {
        Self {
            id: InvoiceId::from_uuid(model.id),
            document_type: model.document_type.into(),
            document_number: model.document_number,
            date: model.date,
            client_id: model.client_id.map(ClientId::from_uuid),
            subtotal: model.subtotal,
            discount: model.discount,
            tax_rate: model.tax_rate,
            shipping: model.shipping,
            advance_paid: model.advance_paid,
            status: model.status.into(),
            remarks: model.remarks,
            quotation_id: model.quotation_id.map(InvoiceId::from_uuid),
            created_at: model.created_at.with_timezone(&Utc),
            updated_at: model.updated_at.with_timezone(&Utc),
        }
    }
}

impl From<invoice_items::Model> for InvoiceItem {
    fn from(model: invoice_items::Model) -> Self {
        Self {
            id: InvoiceItemId::from_uuid(model.id),
            invoice_id: InvoiceId::from_uuid(model.invoice_id),
            description: model.description,
            quantity: model.quantity,
            unit_price: model.unit_price,
            total: model.total,
            sort_order: model.sort_order,
        }
    }
}

/// Every column except the database-assigned `seq`.
fn header(invoice: &Invoice) -> invoices::ActiveModel {
    invoices::ActiveModel {
        id: Set(invoice.id.into_inner()),
        seq: NotSet,
        document_type: Set(DocumentType::from(invoice.document_type)),
        document_number: Set(invoice.document_number.clone()),
        date: Set(invoice.date),
        client_id: Set(invoice.client_id.map(ClientId::into_inner)),
        subtotal: Set(invoice.subtotal),
        discount: Set(invoice.discount),
        tax_rate: Set(invoice.tax_rate),
        shipping: Set(invoice.shipping),
        advance_paid: Set(invoice.advance_paid),
        status: Set(InvoiceStatus::from(invoice.status)),
        remarks: Set(invoice.remarks.clone()),
        quotation_id: Set(invoice.quotation_id.map(InvoiceId::into_inner)),
        created_at: Set(invoice.created_at.into()),
        updated_at: Set(invoice.updated_at.into()),
    }
}

/// Loads a header, optionally holding a row lock until the transaction ends.
pub async fn find_invoice<C>(db: &C, id: Uuid, for_update: bool) -> Result<Option<Invoice>, DbErr>
where
    C: ConnectionTrait,
{
    let mut query = invoices::Entity::find_by_id(id);
    if for_update {
        query = query.lock_exclusive();
    }
    Ok(query.one(db).await?.map(Invoice::from))
}

/// Inserts a new header.
pub async fn insert_invoice<C>(db: &C, invoice: &Invoice) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    invoices::Entity::insert(header(invoice))
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Overwrites an existing header. The creation time is never changed.
pub async fn update_invoice<C>(db: &C, invoice: &Invoice) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    let mut row = header(invoice);
    row.id = Unchanged(invoice.id.into_inner());
    row.created_at = NotSet;
    invoices::Entity::update(row).exec(db).await?;
    Ok(())
}

/// Deletes a header. Returns false if no row matched.
pub async fn delete_invoice<C>(db: &C, id: Uuid) -> Result<bool, DbErr>
where
    C: ConnectionTrait,
{
    let result = invoices::Entity::delete_by_id(id).exec(db).await?;
    Ok(result.rows_affected > 0)
}

/// Replaces all items of an invoice.
pub async fn replace_items<C>(db: &C, invoice_id: Uuid, items: &[InvoiceItem]) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    delete_items(db, invoice_id).await?;
    if items.is_empty() {
        return Ok(());
    }
    let rows = items.iter().map(|item| invoice_items::ActiveModel {
        id: Set(item.id.into_inner()),
        invoice_id: Set(invoice_id),
        description: Set(item.description.clone()),
        quantity: Set(item.quantity),
        unit_price: Set(item.unit_price),
        total: Set(item.total),
        sort_order: Set(item.sort_order),
    });
    invoice_items::Entity::insert_many(rows)
        .exec_without_returning(db)
        .await?;
    Ok(())
}

/// Items of an invoice in display order.
pub async fn load_items<C>(db: &C, invoice_id: Uuid) -> Result<Vec<InvoiceItem>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(invoice_items::Entity::find()
        .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
        .order_by_asc(invoice_items::Column::SortOrder)
        .all(db)
        .await?
        .into_iter()
        .map(InvoiceItem::from)
        .collect())
}

/// Deletes all items of an invoice.
pub async fn delete_items<C>(db: &C, invoice_id: Uuid) -> Result<u64, DbErr>
where
    C: ConnectionTrait,
{
    let result = invoice_items::Entity::delete_many()
        .filter(invoice_items::Column::InvoiceId.eq(invoice_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Serializes number allocation for a document type across connections
/// until the surrounding transaction ends.
pub async fn lock_numbering<C>(db: &C, document_type: &str) -> Result<(), DbErr>
where
    C: ConnectionTrait,
{
    db.execute(Statement::from_sql_and_values(
        DbBackend::Postgres,
        "SELECT pg_advisory_xact_lock(hashtext($1))",
        [format!("document_number:{document_type}").into()],
    ))
    .await?;
    Ok(())
}

/// Number of the most recently created document of a type.
pub async fn latest_document_number<C>(db: &C, document_type: DocumentType) -> Result<Option<String>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(invoices::Entity::find()
        .filter(invoices::Column::DocumentType.eq(document_type))
        .order_by_desc(invoices::Column::Seq)
        .one(db)
        .await?
        .map(|model| model.document_number))
}

fn filtered(filter: &InvoiceFilter) -> Select<invoices::Entity> {
    let mut query = invoices::Entity::find();
    if let Some(document_type) = filter.document_type {
        query = query.filter(invoices::Column::DocumentType.eq(DocumentType::from(document_type)));
    }
    if let Some(status) = filter.status {
        query = query.filter(invoices::Column::Status.eq(InvoiceStatus::from(status)));
    }
    if let Some(client_id) = filter.client_id {
        query = query.filter(invoices::Column::ClientId.eq(client_id.into_inner()));
    }
    query
}

/// One page of matching headers, newest first, with the total match count.
pub async fn list_invoices<C>(
    db: &C,
    filter: &InvoiceFilter,
    page: PageRequest,
) -> Result<(Vec<Invoice>, u64), DbErr>
where
    C: ConnectionTrait,
{
    let total = filtered(filter).count(db).await?;
    let data = filtered(filter)
        .order_by_desc(invoices::Column::Seq)
        .offset(page.offset())
        .limit(page.limit())
        .all(db)
        .await?
        .into_iter()
        .map(Invoice::from)
        .collect();
    Ok((data, total))
}
