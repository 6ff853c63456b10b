//! Accounts and categories, with balances derived from the ledger.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
};
use uuid::Uuid;

use tally_core::ledger::{Account, Category};
use tally_shared::types::{AccountId, CategoryId};

use crate::entities::sea_orm_active_enums::{AccountKind, TransactionKind};
use crate::entities::{accounts, categories, ledger_entries};

impl From<categories::Model> for Category {
    fn from(model: categories::Model) -> Self {
        Self {
            id: CategoryId::from_uuid(model.id),
            name: model.name,
            kind: model.kind.into(),
        }
    }
}

fn to_account(model: accounts::Model, movement: Decimal) -> Account {
    Account {
        id: AccountId::from_uuid(model.id),
        name: model.name,
        kind: model.kind.into(),
        balance: model.opening_balance + movement,
        opening_balance: model.opening_balance,
        description: model.description,
    }
}

/// Net ledger movement per account: revenue and capital add to the account
/// they name, expenses subtract, transfers and loans move from the source to
/// the destination.
async fn movements<C>(db: &C, account_ids: &[Uuid]) -> Result<HashMap<Uuid, Decimal>, DbErr>
where
    C: ConnectionTrait,
{
    let outgoing: Vec<(Uuid, TransactionKind, Decimal)> = ledger_entries::Entity::find()
        .select_only()
        .column(ledger_entries::Column::AccountId)
        .column(ledger_entries::Column::Kind)
        .column_as(Expr::col(ledger_entries::Column::Amount).sum(), "total")
        .filter(ledger_entries::Column::AccountId.is_in(account_ids.to_vec()))
        .group_by(ledger_entries::Column::AccountId)
        .group_by(ledger_entries::Column::Kind)
        .into_tuple()
        .all(db)
        .await?;

    let incoming: Vec<(Uuid, Decimal)> = ledger_entries::Entity::find()
        .select_only()
        .column(ledger_entries::Column::ToAccountId)
        .column_as(Expr::col(ledger_entries::Column::Amount).sum(), "total")
        .filter(ledger_entries::Column::ToAccountId.is_in(account_ids.to_vec()))
        .filter(
            ledger_entries::Column::Kind.is_in([TransactionKind::Transfer, TransactionKind::Loan]),
        )
        .group_by(ledger_entries::Column::ToAccountId)
        .into_tuple()
        .all(db)
        .await?;

    let mut net: HashMap<Uuid, Decimal> = HashMap::new();
    for (account_id, kind, total) in outgoing {
        let signed = match kind {
            TransactionKind::Revenue | TransactionKind::Capital => total,
            TransactionKind::Expense | TransactionKind::Transfer | TransactionKind::Loan => -total,
        };
        *net.entry(account_id).or_default() += signed;
    }
    for (account_id, total) in incoming {
        *net.entry(account_id).or_default() += total;
    }
    Ok(net)
}

async fn with_balances<C>(db: &C, models: Vec<accounts::Model>) -> Result<Vec<Account>, DbErr>
where
    C: ConnectionTrait,
{
    if models.is_empty() {
        return Ok(Vec::new());
    }
    let ids: Vec<Uuid> = models.iter().map(|m| m.id).collect();
    let net = movements(db, &ids).await?;
    Ok(models
        .into_iter()
        .map(|model| {
            let movement = net.get(&model.id).copied().unwrap_or_default();
            to_account(model, movement)
        })
        .collect())
}

/// Inserts an account unless `(name, kind)` already exists, then returns
/// the stored row with its balance.
pub async fn find_or_create_account<C>(
    db: &C,
    name: &str,
    kind: AccountKind,
    opening_balance: Decimal,
) -> Result<Account, DbErr>
where
    C: ConnectionTrait,
{
    let row = accounts::ActiveModel {
        id: Set(AccountId::new().into_inner()),
        name: Set(name.to_string()),
        kind: Set(kind),
        opening_balance: Set(opening_balance),
        description: Set(None),
        created_at: Set(Utc::now().into()),
    };
    accounts::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([accounts::Column::Name, accounts::Column::Kind])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    let model = accounts::Entity::find()
        .filter(accounts::Column::Name.eq(name))
        .filter(accounts::Column::Kind.eq(kind))
        .one(db)
        .await?
        .ok_or_else(|| DbErr::RecordNotFound(format!("account {name} ({kind:?})")))?;

    let mut found = with_balances(db, vec![model]).await?;
    found
        .pop()
        .ok_or_else(|| DbErr::RecordNotFound(format!("account {name}")))
}

/// Loads one account with its balance.
pub async fn find_account<C>(db: &C, id: Uuid) -> Result<Option<Account>, DbErr>
where
    C: ConnectionTrait,
{
    let Some(model) = accounts::Entity::find_by_id(id).one(db).await? else {
        return Ok(None);
    };
    Ok(with_balances(db, vec![model]).await?.pop())
}

/// All accounts by name, with balances.
pub async fn list_accounts<C>(db: &C) -> Result<Vec<Account>, DbErr>
where
    C: ConnectionTrait,
{
    let models = accounts::Entity::find()
        .order_by_asc(accounts::Column::Name)
        .order_by_asc(accounts::Column::Id)
        .all(db)
        .await?;
    with_balances(db, models).await
}

/// Inserts a category unless `(name, kind)` already exists, then returns
/// the stored row.
pub async fn find_or_create_category<C>(
    db: &C,
    name: &str,
    kind: TransactionKind,
) -> Result<Category, DbErr>
where
    C: ConnectionTrait,
{
    let row = categories::ActiveModel {
        id: Set(CategoryId::new().into_inner()),
        name: Set(name.to_string()),
        kind: Set(kind),
        created_at: Set(Utc::now().into()),
    };
    categories::Entity::insert(row)
        .on_conflict(
            OnConflict::columns([categories::Column::Name, categories::Column::Kind])
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    categories::Entity::find()
        .filter(categories::Column::Name.eq(name))
        .filter(categories::Column::Kind.eq(kind))
        .one(db)
        .await?
        .map(Category::from)
        .ok_or_else(|| DbErr::RecordNotFound(format!("category {name} ({kind:?})")))
}

/// All categories by name.
pub async fn list_categories<C>(db: &C) -> Result<Vec<Category>, DbErr>
where
    C: ConnectionTrait,
{
    Ok(categories::Entity::find()
        .order_by_asc(categories::Column::Name)
        .order_by_asc(categories::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(Category::from)
        .collect())
}
