//! Filter criteria for product listings and the plan derived from them.
//!
//! The plan is storage-agnostic: the SeaORM adapter turns it into a
//! `Condition` plus ordering and paging, the in-memory test repositories use
//! [`Predicate::matches`].

use catalog_db::query::{PageRequest, RangeBound};
use rust_decimal::Decimal;

pub use catalog_db::query::SortDir;

use crate::contract::model::Product;

/// Columns a listing can be ordered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum SortField {
    Country,
    VisaType,
    Price,
    LengthOfStay,
    EntryType,
    FilingFee,
    #[default]
    CreatedAt,
    UpdatedAt,
}

impl SortField {
    pub const ALL: [SortField; 8] = [
        SortField::Country,
        SortField::VisaType,
        SortField::Price,
        SortField::LengthOfStay,
        SortField::EntryType,
        SortField::FilingFee,
        SortField::CreatedAt,
        SortField::UpdatedAt,
    ];

    /// Wire name, as accepted by the `sortBy` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            SortField::Country => "country",
            SortField::VisaType => "visaType",
            SortField::Price => "price",
            SortField::LengthOfStay => "lengthOfStay",
            SortField::EntryType => "entryType",
            SortField::FilingFee => "filingFee",
            SortField::CreatedAt => "createdAt",
            SortField::UpdatedAt => "updatedAt",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.as_str() == s)
    }
}

/// Text columns that support substring search.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextField {
    Country,
    VisaType,
    EntryType,
}

impl TextField {
    fn value_of(self, p: &Product) -> &str {
        match self {
            TextField::Country => &p.country,
            TextField::VisaType => &p.visa_type,
            TextField::EntryType => &p.entry_type,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Clause {
    /// Case-insensitive substring match; the needle is matched literally.
    Contains { field: TextField, needle: String },
    Price(RangeBound<Decimal>),
    LengthOfStay(RangeBound<i32>),
}

impl Clause {
    pub fn matches(&self, p: &Product) -> bool {
        match self {
            Clause::Contains { field, needle } => field
                .value_of(p)
                .to_lowercase()
                .contains(&needle.to_lowercase()),
            Clause::Price(bound) => bound.contains(&p.price),
            Clause::LengthOfStay(bound) => bound.contains(&p.length_of_stay),
        }
    }
}

/// Conjunction of clauses; empty matches everything.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Predicate(pub Vec<Clause>);

impl Predicate {
    pub fn clauses(&self) -> &[Clause] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, p: &Product) -> bool {
        self.0.iter().all(|c| c.matches(p))
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Sort {
    pub field: SortField,
    pub dir: SortDir,
}

/// Validated filter criteria.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ProductQuery {
    pub page: u64,
    pub limit: u64,
    pub sort_by: SortField,
    pub sort_order: SortDir,
    pub country: Option<String>,
    pub visa_type: Option<String>,
    pub entry_type: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_length_of_stay: Option<i32>,
    pub max_length_of_stay: Option<i32>,
}

impl ProductQuery {
    pub const DEFAULT_LIMIT: u64 = 10;

    /// Defaults with a different page size.
    pub fn with_page_size(limit: u64) -> Self {
        Self {
            limit,
            ..Self::default()
        }
    }
}

impl Default for ProductQuery {
    fn default() -> Self {
        Self {
            page: 1,
            limit: Self::DEFAULT_LIMIT,
            sort_by: SortField::default(),
            sort_order: SortDir::default(),
            country: None,
            visa_type: None,
            entry_type: None,
            min_price: None,
            max_price: None,
            min_length_of_stay: None,
            max_length_of_stay: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct QueryPlan {
    pub predicate: Predicate,
    pub sort: Sort,
    pub page: PageRequest,
}

/// Translates criteria into a plan. Empty text filters add no clause.
pub fn build_plan(q: &ProductQuery) -> QueryPlan {
    let mut clauses = Vec::new();

    let text_filters = [
        (TextField::Country, &q.country),
        (TextField::VisaType, &q.visa_type),
        (TextField::EntryType, &q.entry_type),
    ];
    for (field, value) in text_filters {
        if let Some(needle) = value.as_deref().filter(|s| !s.is_empty()) {
            clauses.push(Clause::Contains {
                field,
                needle: needle.to_owned(),
            });
        }
    }

    if let Some(bound) = RangeBound::from_bounds(q.min_price, q.max_price) {
        clauses.push(Clause::Price(bound));
    }
    if let Some(bound) = RangeBound::from_bounds(q.min_length_of_stay, q.max_length_of_stay) {
        clauses.push(Clause::LengthOfStay(bound));
    }

    QueryPlan {
        predicate: Predicate(clauses),
        sort: Sort {
            field: q.sort_by,
            dir: q.sort_order,
        },
        page: PageRequest::new(q.page, q.limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal::prelude::FromPrimitive;
    use uuid::Uuid;

    fn dec(v: i64) -> Decimal {
        Decimal::from_i64(v).unwrap()
    }

    fn product(country: &str, price: i64, stay: i32) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            country: country.into(),
            visa_type: "Tourist".into(),
            price: dec(price),
            length_of_stay: stay,
            entry_type: "Single".into(),
            filing_fee: dec(20),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn defaults_sort_newest_first() {
        let plan = build_plan(&ProductQuery::default());
        assert!(plan.predicate.is_empty());
        assert_eq!(plan.sort.field, SortField::CreatedAt);
        assert_eq!(plan.sort.dir, SortDir::Desc);
        assert_eq!(plan.page, PageRequest::new(1, 10));
        assert_eq!(plan.page.offset(), 0);
    }

    #[test]
    fn offset_follows_page_and_limit() {
        let q = ProductQuery {
            page: 3,
            limit: 5,
            ..ProductQuery::default()
        };
        assert_eq!(build_plan(&q).page.offset(), 10);
    }

    #[test]
    fn empty_text_filters_are_ignored() {
        let q = ProductQuery {
            country: Some(String::new()),
            visa_type: Some("work".into()),
            ..ProductQuery::default()
        };
        assert_eq!(
            build_plan(&q).predicate.clauses(),
            &[Clause::Contains {
                field: TextField::VisaType,
                needle: "work".into()
            }]
        );
    }

    #[test]
    fn price_and_stay_share_range_logic() {
        let both = ProductQuery {
            min_price: Some(dec(100)),
            max_price: Some(dec(200)),
            min_length_of_stay: Some(30),
            max_length_of_stay: Some(90),
            ..ProductQuery::default()
        };
        assert_eq!(
            build_plan(&both).predicate.clauses(),
            &[
                Clause::Price(RangeBound::Between(dec(100), dec(200))),
                Clause::LengthOfStay(RangeBound::Between(30, 90)),
            ]
        );

        let min_only = ProductQuery {
            min_price: Some(dec(100)),
            min_length_of_stay: Some(30),
            ..ProductQuery::default()
        };
        assert_eq!(
            build_plan(&min_only).predicate.clauses(),
            &[
                Clause::Price(RangeBound::AtLeast(dec(100))),
                Clause::LengthOfStay(RangeBound::AtLeast(30)),
            ]
        );

        let max_only = ProductQuery {
            max_price: Some(dec(200)),
            max_length_of_stay: Some(90),
            ..ProductQuery::default()
        };
        assert_eq!(
            build_plan(&max_only).predicate.clauses(),
            &[
                Clause::Price(RangeBound::AtMost(dec(200))),
                Clause::LengthOfStay(RangeBound::AtMost(90)),
            ]
        );
    }

    #[test]
    fn predicate_matching() {
        let q = ProductQuery {
            country: Some("THAI".into()),
            min_price: Some(dec(100)),
            max_price: Some(dec(200)),
            ..ProductQuery::default()
        };
        let pred = build_plan(&q).predicate;

        assert!(pred.matches(&product("Thailand", 150, 30)));
        assert!(pred.matches(&product("thailand", 100, 30)));
        assert!(pred.matches(&product("Thailand", 200, 30)));
        assert!(!pred.matches(&product("Thailand", 201, 30)));
        assert!(!pred.matches(&product("Vietnam", 150, 30)));
    }

    #[test]
    fn sort_field_names_round_trip() {
        for f in SortField::ALL {
            assert_eq!(SortField::parse(f.as_str()), Some(f));
        }
        assert_eq!(SortField::parse("id"), None);
        assert_eq!(SortField::parse("CreatedAt"), None);
    }
}
