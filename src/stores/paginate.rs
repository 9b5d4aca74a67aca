use sea_orm::sea_query::{Expr, Func, IntoColumnRef, SimpleExpr};
use sea_orm::{ConnectionTrait, DbErr, EntityTrait, PaginatorTrait, QuerySelect, Select};

/// Fixed window size shared by every list endpoint
pub const PAGE_SIZE: u64 = 10;

/// Pagination metadata describing a windowed result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub last_page: u64,
}

/// One window of a paginated collection
#[derive(Debug, Clone)]
pub struct Page<M> {
    pub data: Vec<M>,
    pub meta: PageMeta,
}

/// Clamp the 1-indexed page parameter; absent or zero becomes page 1
pub fn clamp_page(page: Option<u64>) -> u64 {
    page.unwrap_or(1).max(1)
}

/// `ceil(total / PAGE_SIZE)`
pub fn last_page(total: u64) -> u64 {
    total.div_ceil(PAGE_SIZE)
}

/// Run `select` as one fixed-size window: a COUNT for the metadata plus an
/// OFFSET/LIMIT fetch for the data. Works with any filtered/joined select,
/// which is what lets every resource store share this one implementation.
pub async fn paginate<E, C>(db: &C, select: Select<E>, page: u64) -> Result<Page<E::Model>, DbErr>
where
    E: EntityTrait,
    E::Model: sea_orm::FromQueryResult + Send + Sync,
    C: ConnectionTrait,
{
    let total = select.clone().count(db).await?;

    let data = select
        .offset((page - 1) * PAGE_SIZE)
        .limit(PAGE_SIZE)
        .all(db)
        .await?;

    Ok(Page {
        data,
        meta: PageMeta {
            total,
            page,
            last_page: last_page(total),
        },
    })
}

/// Case-insensitive substring match: `lower(col) LIKE '%term%'`.
///
/// Lower-casing both sides keeps the behavior identical across sqlite and
/// postgres collations.
pub fn contains_ci(col: impl IntoColumnRef, term: &str) -> SimpleExpr {
    let pattern = format!("%{}%", term.to_lowercase());
    Expr::expr(Func::lower(Expr::col(col))).like(pattern)
}
