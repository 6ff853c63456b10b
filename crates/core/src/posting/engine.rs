//! Invoice lifecycle with receivables posting.
//!
//! Every public operation runs inside one unit of work. Updates, deletes
//! and conversions are additionally serialized per invoice, and conversion
//! per document type while it allocates a number.

use std::sync::Arc;

use chrono::Utc;
use tally_shared::PostingConfig;
use tally_shared::types::{InvoiceId, InvoiceItemId, PageRequest, PageResponse};
use tracing::{debug, info, warn};

use super::locks::KeyedLocks;
use super::plan::{PlannedPosting, PostingPlanner, PostingPurpose};
use crate::invoice::error::StepContext;
use crate::invoice::numbering::next_number;
use crate::invoice::totals::{build_items, line_total, subtotal_of};
use crate::invoice::{
    CreateInvoiceInput, DocumentType, Invoice, InvoiceError, InvoiceFilter, InvoiceItem,
    InvoiceStatus, InvoiceWithItems, Step, UpdateInvoiceInput,
};
use crate::ledger::{AccountKind, Journal, TransactionKind};
use crate::store::{Store, UnitOfWork};

/// Applies invoice changes and keeps the receivables ledger in step.
#[derive(Debug)]
pub struct ArPostingEngine<S> {
    store: Arc<S>,
    config: PostingConfig,
    invoice_locks: KeyedLocks<InvoiceId>,
    numbering_locks: KeyedLocks<DocumentType>,
}

impl<S> Clone for ArPostingEngine<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            config: self.config.clone(),
            invoice_locks: self.invoice_locks.clone(),
            numbering_locks: self.numbering_locks.clone(),
        }
    }
}

impl<S: Store> ArPostingEngine<S> {
    /// Creates an engine over `store`.
    pub fn new(store: Arc<S>, config: PostingConfig) -> Self {
        Self {
            store,
            config,
            invoice_locks: KeyedLocks::new(),
            numbering_locks: KeyedLocks::new(),
        }
    }

    /// A journal sharing this engine's store and configuration.
    #[must_use]
    pub fn journal(&self) -> Journal<S> {
        Journal::new(Arc::clone(&self.store), self.config.clone())
    }

    /// Creates a document with its items.
    ///
    /// An invoice created as sent or paid recognizes its grand total as
    /// revenue on the receivables account. Drafts and quotations post
    /// nothing, whatever their advance.
    pub async fn create_invoice(&self, input: CreateInvoiceInput) -> Result<InvoiceWithItems, InvoiceError> {
        let number = input.document_number.clone();
        self.create_inner(input).await.inspect_err(|err| {
            warn!(document_number = %number, error = %err, "Invoice create failed");
        })
    }

    async fn create_inner(&self, input: CreateInvoiceInput) -> Result<InvoiceWithItems, InvoiceError> {
        validate_number(&input.document_number)?;
        let input = input.at_stored_precision();

        let mut uow = self.store.begin().await.during(Step::Begin)?;

        let now = Utc::now();
        let id = InvoiceId::new();
        let items = build_items(id, &input.items);
        let invoice = Invoice {
            id,
            document_type: input.document_type,
            document_number: input.document_number,
            date: input.date,
            client_id: input.client_id,
            subtotal: subtotal_of(&input.items),
            discount: input.discount,
            tax_rate: input.tax_rate,
            shipping: input.shipping,
            advance_paid: input.advance_paid,
            status: input.status.unwrap_or(InvoiceStatus::Draft),
            remarks: input.remarks,
            quotation_id: input.quotation_id,
            created_at: now,
            updated_at: now,
        };

        uow.insert_invoice(&invoice).await.during(Step::WriteHeader)?;
        uow.replace_items(id, &items).await.during(Step::ReplaceItems)?;

        let posted = self
            .post(uow.as_mut(), id, PostingPlanner::for_create(&invoice))
            .await?;

        let created = reload(uow.as_mut(), id).await?;
        uow.commit().await.during(Step::Commit)?;

        info!(
            invoice_id = %id,
            document_number = %created.invoice.document_number,
            document_type = %created.invoice.document_type,
            status = %created.invoice.status,
            entries = posted,
            "Invoice created"
        );
        Ok(created)
    }

    /// Applies a partial update and posts the resulting receivables delta.
    ///
    /// # Errors
    ///
    /// `NotFound` if the invoice, or a payment account the update needs,
    /// does not exist. Nothing is written on any failure.
    pub async fn update_invoice(
        &self,
        id: InvoiceId,
        input: UpdateInvoiceInput,
    ) -> Result<InvoiceWithItems, InvoiceError> {
        let _guard = self.invoice_locks.lock(id).await;
        self.update_inner(id, input).await.inspect_err(|err| {
            warn!(invoice_id = %id, error = %err, "Invoice update failed");
        })
    }

    async fn update_inner(&self, id: InvoiceId, input: UpdateInvoiceInput) -> Result<InvoiceWithItems, InvoiceError> {
        if let Some(number) = &input.document_number {
            validate_number(number)?;
        }
        let input = input.at_stored_precision();

        let mut uow = self.store.begin().await.during(Step::Begin)?;
        let old = uow
            .lock_invoice(id)
            .await
            .during(Step::LoadInvoice)?
            .ok_or_else(|| InvoiceError::not_found("invoice", id))?;

        let UpdateInvoiceInput {
            document_number,
            date,
            client_id,
            discount,
            tax_rate,
            shipping,
            advance_paid,
            status,
            remarks,
            items,
            payment_account_id,
        } = input;

        let mut new = old.clone();
        if let Some(number) = document_number {
            new.document_number = number;
        }
        if let Some(date) = date {
            new.date = date;
        }
        if let Some(client_id) = client_id {
            new.client_id = client_id;
        }
        if let Some(discount) = discount {
            new.discount = discount;
        }
        if let Some(tax_rate) = tax_rate {
            new.tax_rate = tax_rate;
        }
        if let Some(shipping) = shipping {
            new.shipping = shipping;
        }
        if let Some(advance_paid) = advance_paid {
            new.advance_paid = advance_paid;
        }
        if let Some(status) = status {
            new.status = status;
        }
        if let Some(remarks) = remarks {
            new.remarks = remarks;
        }
        if let Some(items) = &items {
            new.subtotal = subtotal_of(items);
        }
        new.updated_at = Utc::now();

        uow.update_invoice(&new).await.during(Step::WriteHeader)?;
        if let Some(items) = items {
            uow.replace_items(id, &build_items(id, &items))
                .await
                .during(Step::ReplaceItems)?;
        }

        let plan = PostingPlanner::for_update(&old, &new, payment_account_id);
        let posted = self.post(uow.as_mut(), id, plan).await?;

        let updated = reload(uow.as_mut(), id).await?;
        uow.commit().await.during(Step::Commit)?;

        info!(
            invoice_id = %id,
            from_status = %old.status,
            to_status = %updated.invoice.status,
            entries = posted,
            "Invoice updated"
        );
        Ok(updated)
    }

    /// Deletes a document, its items and every ledger entry it owns.
    ///
    /// # Errors
    ///
    /// `NotFound` if the document does not exist, including on a second
    /// delete.
    pub async fn delete_invoice(&self, id: InvoiceId) -> Result<(), InvoiceError> {
        let _guard = self.invoice_locks.lock(id).await;
        self.delete_inner(id).await.inspect_err(|err| {
            warn!(invoice_id = %id, error = %err, "Invoice delete failed");
        })
    }

    async fn delete_inner(&self, id: InvoiceId) -> Result<(), InvoiceError> {
        let mut uow = self.store.begin().await.during(Step::Begin)?;
        uow.lock_invoice(id)
            .await
            .during(Step::LoadInvoice)?
            .ok_or_else(|| InvoiceError::not_found("invoice", id))?;

        // Entries go first so balances unwind before the owner disappears.
        let entries = uow
            .delete_entries_by_invoice(id)
            .await
            .during(Step::DeleteEntries)?;
        let items = uow.delete_items(id).await.during(Step::DeleteItems)?;
        if !uow.delete_invoice(id).await.during(Step::DeleteInvoice)? {
            return Err(InvoiceError::not_found("invoice", id));
        }
        uow.commit().await.during(Step::Commit)?;

        info!(invoice_id = %id, entries, items, "Invoice deleted");
        Ok(())
    }

    /// Turns a quotation into a new draft invoice with the next invoice
    /// number, and marks the quotation accepted.
    ///
    /// # Errors
    ///
    /// `NotFound` if no quotation with this ID exists.
    pub async fn convert_quotation_to_invoice(
        &self,
        quotation_id: InvoiceId,
    ) -> Result<InvoiceWithItems, InvoiceError> {
        let _guard = self.invoice_locks.lock(quotation_id).await;
        let _numbering = self.numbering_locks.lock(DocumentType::Invoice).await;
        self.convert_inner(quotation_id).await.inspect_err(|err| {
            warn!(quotation_id = %quotation_id, error = %err, "Quotation conversion failed");
        })
    }

    async fn convert_inner(&self, quotation_id: InvoiceId) -> Result<InvoiceWithItems, InvoiceError> {
        let mut uow = self.store.begin().await.during(Step::Begin)?;
        let mut quotation = uow
            .lock_invoice(quotation_id)
            .await
            .during(Step::LoadInvoice)?
            .filter(|doc| doc.document_type == DocumentType::Quotation)
            .ok_or_else(|| InvoiceError::not_found("quotation", quotation_id))?;
        let source_items = uow
            .load_items(quotation_id)
            .await
            .during(Step::LoadInvoice)?;

        let latest = uow
            .latest_document_number(DocumentType::Invoice)
            .await
            .during(Step::AllocateNumber)?;
        let document_number = next_number(DocumentType::Invoice, latest.as_deref());

        let now = Utc::now();
        let id = InvoiceId::new();
        let items: Vec<InvoiceItem> = source_items
            .iter()
            .map(|item| InvoiceItem {
                id: InvoiceItemId::new(),
                invoice_id: id,
                description: item.description.clone(),
                quantity: item.quantity,
                unit_price: item.unit_price,
                total: line_total(item.quantity, item.unit_price),
                sort_order: item.sort_order,
            })
            .collect();
        let invoice = Invoice {
            id,
            document_type: DocumentType::Invoice,
            document_number,
            date: now.date_naive(),
            client_id: quotation.client_id,
            subtotal: items.iter().map(|item| item.total).sum(),
            discount: quotation.discount,
            tax_rate: quotation.tax_rate,
            shipping: quotation.shipping,
            advance_paid: quotation.advance_paid,
            status: InvoiceStatus::Draft,
            remarks: quotation.remarks.clone(),
            quotation_id: Some(quotation_id),
            created_at: now,
            updated_at: now,
        };

        uow.insert_invoice(&invoice).await.during(Step::WriteHeader)?;
        uow.replace_items(id, &items).await.during(Step::ReplaceItems)?;
        // A converted invoice starts as a draft, so this never posts.
        self.post(uow.as_mut(), id, PostingPlanner::for_create(&invoice))
            .await?;

        quotation.status = InvoiceStatus::Accepted;
        quotation.updated_at = now;
        uow.update_invoice(&quotation).await.during(Step::WriteHeader)?;

        let converted = reload(uow.as_mut(), id).await?;
        uow.commit().await.during(Step::Commit)?;

        info!(
            quotation_id = %quotation_id,
            invoice_id = %id,
            document_number = %converted.invoice.document_number,
            "Quotation converted to invoice"
        );
        Ok(converted)
    }

    /// Loads a document with its items.
    ///
    /// # Errors
    ///
    /// `NotFound` if it does not exist.
    pub async fn get_invoice(&self, id: InvoiceId) -> Result<InvoiceWithItems, InvoiceError> {
        let mut uow = self.store.begin().await.during(Step::Begin)?;
        reload(uow.as_mut(), id).await
    }

    /// Lists documents newest first.
    pub async fn list_invoices(
        &self,
        filter: &InvoiceFilter,
        page: PageRequest,
    ) -> Result<PageResponse<Invoice>, InvoiceError> {
        let mut uow = self.store.begin().await.during(Step::Begin)?;
        let (data, total) = uow
            .list_invoices(filter, page)
            .await
            .during(Step::LoadInvoice)?;
        Ok(PageResponse::new(data, page, total))
    }

    /// The number the next document of this type would get. Nothing is
    /// reserved.
    pub async fn next_document_number(&self, document_type: DocumentType) -> Result<String, InvoiceError> {
        let mut uow = self.store.begin().await.during(Step::Begin)?;
        let latest = uow
            .latest_document_number(document_type)
            .await
            .during(Step::AllocateNumber)?;
        Ok(next_number(document_type, latest.as_deref()))
    }

    /// Writes planned postings against the receivables account, resolving
    /// the account and sales category only when something is posted.
    async fn post(
        &self,
        uow: &mut dyn UnitOfWork,
        invoice_id: InvoiceId,
        plan: Vec<PlannedPosting>,
    ) -> Result<usize, InvoiceError> {
        if plan.is_empty() {
            debug!(invoice_id = %invoice_id, "No receivable postings");
            return Ok(0);
        }

        let receivable = uow
            .find_or_create_account(&self.config.receivable_account, AccountKind::Asset)
            .await
            .during(Step::ResolveAccount)?;

        let sales_category = if plan.iter().any(PlannedPosting::needs_sales_category) {
            let category = uow
                .find_or_create_category(&self.config.sales_category, TransactionKind::Revenue)
                .await
                .during(Step::ResolveCategory)?;
            Some(category.id)
        } else {
            None
        };

        for posting in &plan {
            let Some(account) = posting.payment_account else {
                continue;
            };
            if account == receivable.id {
                return Err(InvoiceError::Validation(
                    "payment account must differ from the receivables account".to_string(),
                ));
            }
            if uow
                .find_account(account)
                .await
                .during(Step::ResolveAccount)?
                .is_none()
            {
                return Err(InvoiceError::not_found("account", account));
            }
        }

        let count = plan.len();
        for posting in plan {
            let purpose = posting.purpose;
            let amount = posting.amount.to_signed();
            let entry_id = uow
                .insert_entry(posting.into_entry(invoice_id, receivable.id, sales_category))
                .await
                .during(Step::PostEntry)?;
            info!(
                invoice_id = %invoice_id,
                entry_id = %entry_id,
                purpose = purpose_name(purpose),
                amount = %amount,
                "Posted receivable entry"
            );
        }
        Ok(count)
    }
}

async fn reload(uow: &mut dyn UnitOfWork, id: InvoiceId) -> Result<InvoiceWithItems, InvoiceError> {
    let invoice = uow
        .get_invoice(id)
        .await
        .during(Step::Reload)?
        .ok_or_else(|| InvoiceError::not_found("invoice", id))?;
    let items = uow.load_items(id).await.during(Step::Reload)?;
    Ok(InvoiceWithItems { invoice, items })
}

fn validate_number(number: &str) -> Result<(), InvoiceError> {
    if number.trim().is_empty() {
        return Err(InvoiceError::Validation(
            "document number cannot be empty".to_string(),
        ));
    }
    Ok(())
}

const fn purpose_name(purpose: PostingPurpose) -> &'static str {
    match purpose {
        PostingPurpose::Recognition => "recognition",
        PostingPurpose::Adjustment => "adjustment",
        PostingPurpose::Payment => "payment",
    }
}
