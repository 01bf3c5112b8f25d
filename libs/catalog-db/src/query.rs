//! Building blocks for filtered, sorted, offset-paginated selects.
//! Repositories translate their own criteria into these pieces.

use sea_orm::{
    sea_query::{Expr, Func, LikeExpr, Order},
    ColumnTrait, Condition, EntityTrait, QueryOrder, QuerySelect, Value,
};

/* ---------- LIKE helpers ---------- */

/// Escape LIKE metacharacters with `\`.
pub fn like_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '%' | '_' | '\\' => {
                out.push('\\');
                out.push(ch);
            }
            c => out.push(c),
        }
    }
    out
}

/// `%needle%` with the needle lowercased and escaped.
pub fn like_contains_ci(needle: &str) -> String {
    format!("%{}%", like_escape(&needle.to_lowercase()))
}

/// Case-insensitive substring match: `LOWER(col) LIKE '%needle%' ESCAPE '\'`.
pub fn contains_ci<C: ColumnTrait>(col: C, needle: &str) -> Condition {
    Condition::all().add(
        Expr::expr(Func::lower(Expr::col(col)))
            .like(LikeExpr::new(like_contains_ci(needle)).escape('\\')),
    )
}

/* ---------- ranges ---------- */

/// Inclusive bounds on an ordered value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RangeBound<T> {
    Between(T, T),
    AtLeast(T),
    AtMost(T),
}

impl<T> RangeBound<T> {
    /// Both bounds → `Between`, one bound → one-sided, none → `None`.
    pub fn from_bounds(min: Option<T>, max: Option<T>) -> Option<Self> {
        match (min, max) {
            (Some(lo), Some(hi)) => Some(Self::Between(lo, hi)),
            (Some(lo), None) => Some(Self::AtLeast(lo)),
            (None, Some(hi)) => Some(Self::AtMost(hi)),
            (None, None) => None,
        }
    }

    pub fn contains(&self, value: &T) -> bool
    where
        T: PartialOrd,
    {
        match self {
            Self::Between(lo, hi) => lo <= value && value <= hi,
            Self::AtLeast(lo) => lo <= value,
            Self::AtMost(hi) => value <= hi,
        }
    }
}

pub fn range_condition<C, T>(col: C, bound: RangeBound<T>) -> Condition
where
    C: ColumnTrait,
    T: Into<Value>,
{
    let expr = match bound {
        RangeBound::Between(lo, hi) => col.between(lo, hi),
        RangeBound::AtLeast(lo) => col.gte(lo),
        RangeBound::AtMost(hi) => col.lte(hi),
    };
    Condition::all().add(expr)
}

/* ---------- sort ---------- */

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SortDir {
    Asc,
    #[default]
    Desc,
}

impl From<SortDir> for Order {
    fn from(dir: SortDir) -> Self {
        match dir {
            SortDir::Asc => Order::Asc,
            SortDir::Desc => Order::Desc,
        }
    }
}

/* ---------- offset paging ---------- */

/// SQL drivers bind OFFSET/LIMIT as signed 64-bit integers.
pub const MAX_SQL_ROWS: u64 = i64::MAX as u64;

/// 1-based page number and page size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub limit: u64,
}

impl PageRequest {
    pub fn new(page: u64, limit: u64) -> Self {
        Self { page, limit }
    }

    /// `(page - 1) * limit`, saturating at [`MAX_SQL_ROWS`].
    pub fn offset(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.limit)
            .min(MAX_SQL_ROWS)
    }

    /// Page size as bound into SQL, capped at [`MAX_SQL_ROWS`].
    pub fn sql_limit(&self) -> u64 {
        self.limit.min(MAX_SQL_ROWS)
    }

    /// `ceil(total / limit)`; zero when `limit` is zero.
    pub fn pages(&self, total: u64) -> u64 {
        if self.limit == 0 {
            0
        } else {
            total.div_ceil(self.limit)
        }
    }
}

/// Sorting and paging on a plain `Select<E>`.
pub trait SelectPageExt<E: EntityTrait>: Sized {
    fn sorted_by(self, col: E::Column, dir: SortDir) -> Self;
    fn paged(self, page: PageRequest) -> Self;
}

impl<E> SelectPageExt<E> for sea_orm::Select<E>
where
    E: EntityTrait,
{
    fn sorted_by(self, col: E::Column, dir: SortDir) -> Self {
        self.order_by(col, Order::from(dir))
    }

    fn paged(self, page: PageRequest) -> Self {
        self.offset(page.offset()).limit(page.sql_limit())
    }
}
