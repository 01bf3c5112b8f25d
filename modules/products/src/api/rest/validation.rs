//! Request validation as explicit rule tables.
//!
//! Every rule is evaluated and every violation is reported; nothing stops at
//! the first failure. Messages read `"<field> <rule>"`.

use std::str::FromStr;

use apikit::{ApiError, FieldViolation};
use rust_decimal::Decimal;
use serde_json::{Map, Number, Value};

use crate::contract::model::{NewProduct, ProductPatch};
use crate::domain::query::{ProductQuery, SortDir, SortField};
use crate::domain::service::round_amount;

fn violation(field: &str, rule: impl std::fmt::Display) -> FieldViolation {
    FieldViolation::field(field, format!("{field} {rule}"))
}

fn unknown_property(name: &str) -> FieldViolation {
    FieldViolation::field(name, format!("property {name} should not exist"))
}

const NOT_A_NUMBER: &str = "must be a number conforming to the specified constraints";

fn decimal_from_text(text: &str) -> Option<Decimal> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .ok()
}

fn decimal_from_number(n: &Number) -> Option<Decimal> {
    if let Some(i) = n.as_i64() {
        return Some(Decimal::from(i));
    }
    if let Some(u) = n.as_u64() {
        return Some(Decimal::from(u));
    }
    decimal_from_text(&n.to_string())
}

/// Whole numbers written as floats (`90.0`) count as integers.
fn integer_from_f64(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() < 9.0e18).then_some(f as i64)
}

fn integer_from_number(n: &Number) -> Option<i64> {
    n.as_i64()
        .or_else(|| n.as_u64().map(|_| i64::MAX))
        .or_else(|| n.as_f64().and_then(integer_from_f64))
}

fn integer_from_text(text: &str) -> Option<i64> {
    let text = text.trim();
    text.parse::<i64>()
        .ok()
        .or_else(|| text.parse::<f64>().ok().and_then(integer_from_f64))
}

/// Positive `i32`, shared by the body and query rules for lengths of stay.
fn positive_count(field: &str, value: i64, errors: &mut Vec<FieldViolation>) -> Option<i32> {
    if value <= 0 {
        errors.push(violation(field, "must be a positive number"));
        return None;
    }
    match i32::try_from(value) {
        Ok(v) => Some(v),
        Err(_) => {
            errors.push(violation(field, format!("must not be greater than {}", i32::MAX)));
            None
        }
    }
}

/* ---------- body ---------- */

/// Shape of one body field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldKind {
    /// Non-empty string with at least `min_len` characters.
    Text { min_len: usize },
    /// Number greater than zero.
    PositiveAmount,
    /// Integer greater than zero.
    PositiveCount,
}

#[derive(Clone, Copy, Debug)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
}

pub const PRODUCT_FIELDS: [FieldRule; 6] = [
    FieldRule { name: "country", kind: FieldKind::Text { min_len: 2 } },
    FieldRule { name: "visaType", kind: FieldKind::Text { min_len: 2 } },
    FieldRule { name: "price", kind: FieldKind::PositiveAmount },
    FieldRule { name: "lengthOfStay", kind: FieldKind::PositiveCount },
    FieldRule { name: "entryType", kind: FieldKind::Text { min_len: 1 } },
    FieldRule { name: "filingFee", kind: FieldKind::PositiveAmount },
];

#[derive(Clone, Debug, PartialEq, Eq)]
enum FieldValue {
    Text(String),
    Amount(Decimal),
    Count(i32),
}

impl FieldRule {
    /// Checks one value. `None` and JSON `null` mean absent.
    fn check(
        &self,
        value: Option<&Value>,
        required: bool,
        errors: &mut Vec<FieldViolation>,
    ) -> Option<FieldValue> {
        let name = self.name;
        let value = match value {
            None | Some(Value::Null) => {
                if required {
                    errors.push(violation(name, "should not be empty"));
                }
                return None;
            }
            Some(v) => v,
        };

        match self.kind {
            FieldKind::Text { min_len } => {
                let Value::String(s) = value else {
                    errors.push(violation(name, "must be a string"));
                    return None;
                };
                if s.is_empty() {
                    errors.push(violation(name, "should not be empty"));
                    return None;
                }
                if s.chars().count() < min_len {
                    errors.push(violation(
                        name,
                        format!("must be longer than or equal to {min_len} characters"),
                    ));
                    return None;
                }
                Some(FieldValue::Text(s.clone()))
            }
            FieldKind::PositiveAmount => {
                let Some(amount) = value.as_number().and_then(decimal_from_number) else {
                    errors.push(violation(name, NOT_A_NUMBER));
                    return None;
                };
                let amount = round_amount(amount);
                if amount <= Decimal::ZERO {
                    errors.push(violation(name, "must be a positive number"));
                    return None;
                }
                Some(FieldValue::Amount(amount))
            }
            FieldKind::PositiveCount => {
                let Some(n) = value.as_number() else {
                    errors.push(violation(name, NOT_A_NUMBER));
                    return None;
                };
                let Some(int) = integer_from_number(n) else {
                    errors.push(violation(name, "must be an integer number"));
                    if n.as_f64().is_some_and(|f| f <= 0.0) {
                        errors.push(violation(name, "must be a positive number"));
                    }
                    return None;
                };
                positive_count(name, int, errors).map(FieldValue::Count)
            }
        }
    }
}

/// Checked values keyed by rule, in [`PRODUCT_FIELDS`] order.
struct CheckedBody(Vec<(&'static str, FieldValue)>);

impl CheckedBody {
    fn take(&mut self, name: &str) -> Option<FieldValue> {
        let idx = self.0.iter().position(|(n, _)| *n == name)?;
        Some(self.0.remove(idx).1)
    }

    fn text(&mut self, name: &str) -> Option<String> {
        match self.take(name)? {
            FieldValue::Text(s) => Some(s),
            _ => None,
        }
    }

    fn amount(&mut self, name: &str) -> Option<Decimal> {
        match self.take(name)? {
            FieldValue::Amount(d) => Some(d),
            _ => None,
        }
    }

    fn count(&mut self, name: &str) -> Option<i32> {
        match self.take(name)? {
            FieldValue::Count(c) => Some(c),
            _ => None,
        }
    }
}

fn check_body(body: &Value, required: bool) -> Result<CheckedBody, Vec<FieldViolation>> {
    let empty = Map::new();
    let obj = match body {
        Value::Object(map) => map,
        Value::Null => &empty,
        _ => {
            return Err(vec![FieldViolation::general(
                "request body must be a JSON object",
            )])
        }
    };

    let mut errors = Vec::new();
    let mut checked = Vec::new();
    for rule in &PRODUCT_FIELDS {
        if let Some(v) = rule.check(obj.get(rule.name), required, &mut errors) {
            checked.push((rule.name, v));
        }
    }
    for key in obj.keys() {
        if !PRODUCT_FIELDS.iter().any(|r| r.name == key) {
            errors.push(unknown_property(key));
        }
    }

    if errors.is_empty() {
        Ok(CheckedBody(checked))
    } else {
        Err(errors)
    }
}

/// Decodes a request body. An empty body reads as `{}`.
pub fn parse_json_body(bytes: &[u8]) -> Result<Value, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Object(Map::new()));
    }
    serde_json::from_slice(bytes).map_err(|e| {
        tracing::debug!(error = %e, "Rejecting malformed JSON body");
        ApiError::bad_request("Malformed JSON in request body")
    })
}

/// All six fields are required.
pub fn validate_create(body: &Value) -> Result<NewProduct, Vec<FieldViolation>> {
    let mut c = check_body(body, true)?;
    let missing = || vec![FieldViolation::general("incomplete product payload")];
    Ok(NewProduct {
        country: c.text("country").ok_or_else(missing)?,
        visa_type: c.text("visaType").ok_or_else(missing)?,
        price: c.amount("price").ok_or_else(missing)?,
        length_of_stay: c.count("lengthOfStay").ok_or_else(missing)?,
        entry_type: c.text("entryType").ok_or_else(missing)?,
        filing_fee: c.amount("filingFee").ok_or_else(missing)?,
    })
}

/// Every field is optional; `null` counts as absent.
pub fn validate_update(body: &Value) -> Result<ProductPatch, Vec<FieldViolation>> {
    let mut c = check_body(body, false)?;
    Ok(ProductPatch {
        country: c.text("country"),
        visa_type: c.text("visaType"),
        price: c.amount("price"),
        length_of_stay: c.count("lengthOfStay"),
        entry_type: c.text("entryType"),
        filing_fee: c.amount("filingFee"),
    })
}

/* ---------- query ---------- */

type ApplyParam = fn(&mut ProductQuery, &str, &str, &mut Vec<FieldViolation>);

/// One accepted query parameter and how it lands in [`ProductQuery`].
pub struct QueryRule {
    pub name: &'static str,
    apply: ApplyParam,
}

pub const QUERY_RULES: [QueryRule; 11] = [
    QueryRule { name: "page", apply: |q, n, raw, e| q.page = page_number(n, raw, e).unwrap_or(q.page) },
    QueryRule { name: "limit", apply: |q, n, raw, e| q.limit = page_number(n, raw, e).unwrap_or(q.limit) },
    QueryRule { name: "sortBy", apply: apply_sort_by },
    QueryRule { name: "sortOrder", apply: apply_sort_order },
    QueryRule { name: "country", apply: |q, _, raw, _| q.country = Some(raw.to_owned()) },
    QueryRule { name: "visaType", apply: |q, _, raw, _| q.visa_type = Some(raw.to_owned()) },
    QueryRule { name: "entryType", apply: |q, _, raw, _| q.entry_type = Some(raw.to_owned()) },
    QueryRule { name: "minPrice", apply: |q, n, raw, e| q.min_price = price_bound(n, raw, e) },
    QueryRule { name: "maxPrice", apply: |q, n, raw, e| q.max_price = price_bound(n, raw, e) },
    QueryRule { name: "minLengthOfStay", apply: |q, n, raw, e| q.min_length_of_stay = stay_bound(n, raw, e) },
    QueryRule { name: "maxLengthOfStay", apply: |q, n, raw, e| q.max_length_of_stay = stay_bound(n, raw, e) },
];

fn page_number(name: &str, raw: &str, errors: &mut Vec<FieldViolation>) -> Option<u64> {
    let Some(v) = integer_from_text(raw) else {
        errors.push(violation(name, "must be an integer number"));
        return None;
    };
    if v < 1 {
        errors.push(violation(name, "must not be less than 1"));
        return None;
    }
    u64::try_from(v).ok()
}

fn price_bound(name: &str, raw: &str, errors: &mut Vec<FieldViolation>) -> Option<Decimal> {
    let Some(v) = decimal_from_text(raw.trim()) else {
        errors.push(violation(name, NOT_A_NUMBER));
        return None;
    };
    if v < Decimal::ZERO {
        errors.push(violation(name, "must not be less than 0"));
        return None;
    }
    Some(v)
}

fn stay_bound(name: &str, raw: &str, errors: &mut Vec<FieldViolation>) -> Option<i32> {
    let Some(v) = integer_from_text(raw) else {
        errors.push(violation(name, "must be an integer number"));
        return None;
    };
    positive_count(name, v, errors)
}

fn apply_sort_by(q: &mut ProductQuery, name: &str, raw: &str, errors: &mut Vec<FieldViolation>) {
    match SortField::parse(raw) {
        Some(f) => q.sort_by = f,
        None => {
            let allowed: Vec<&str> = SortField::ALL.iter().map(|f| f.as_str()).collect();
            errors.push(violation(
                name,
                format!("must be one of the following values: {}", allowed.join(", ")),
            ));
        }
    }
}

fn apply_sort_order(q: &mut ProductQuery, name: &str, raw: &str, errors: &mut Vec<FieldViolation>) {
    match raw {
        "ASC" => q.sort_order = SortDir::Asc,
        "DESC" => q.sort_order = SortDir::Desc,
        _ => errors.push(violation(name, "must be one of the following values: ASC, DESC")),
    }
}

/// Validates raw query pairs. A repeated parameter keeps its last value.
pub fn validate_query(
    pairs: &[(String, String)],
    default_limit: u64,
) -> Result<ProductQuery, Vec<FieldViolation>> {
    let mut query = ProductQuery::with_page_size(default_limit);
    let mut errors = Vec::new();

    for (key, raw) in pairs {
        match QUERY_RULES.iter().find(|r| r.name == key) {
            Some(rule) => (rule.apply)(&mut query, rule.name, raw, &mut errors),
            None => errors.push(unknown_property(key)),
        }
    }

    if errors.is_empty() {
        Ok(query)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn messages(errs: &[FieldViolation]) -> Vec<&str> {
        errs.iter().map(|e| e.message.as_str()).collect()
    }

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn valid_body() -> Value {
        json!({
            "country": "USA",
            "visaType": "Tourist",
            "price": 160,
            "lengthOfStay": 90,
            "entryType": "Single",
            "filingFee": 20.5
        })
    }

    #[test]
    fn create_accepts_a_complete_payload() {
        let p = validate_create(&valid_body()).unwrap();
        assert_eq!(p.country, "USA");
        assert_eq!(p.price, Decimal::from(160));
        assert_eq!(p.length_of_stay, 90);
        assert_eq!(p.filing_fee, Decimal::from_str("20.5").unwrap());
    }

    #[test]
    fn create_reports_every_missing_field() {
        let errs = validate_create(&json!({})).unwrap_err();
        assert_eq!(
            messages(&errs),
            vec![
                "country should not be empty",
                "visaType should not be empty",
                "price should not be empty",
                "lengthOfStay should not be empty",
                "entryType should not be empty",
                "filingFee should not be empty",
            ]
        );
    }

    #[test]
    fn create_checks_types_and_ranges() {
        let errs = validate_create(&json!({
            "country": "U",
            "visaType": 7,
            "price": -1,
            "lengthOfStay": 1.5,
            "entryType": "",
            "filingFee": "20"
        }))
        .unwrap_err();
        assert_eq!(
            messages(&errs),
            vec![
                "country must be longer than or equal to 2 characters",
                "visaType must be a string",
                "price must be a positive number",
                "lengthOfStay must be an integer number",
                "entryType should not be empty",
                "filingFee must be a number conforming to the specified constraints",
            ]
        );
        assert_eq!(errs[0].field.as_deref(), Some("country"));
    }

    #[test]
    fn zero_amount_is_not_positive() {
        let mut body = valid_body();
        body["filingFee"] = json!(0);
        let errs = validate_create(&body).unwrap_err();
        assert_eq!(messages(&errs), vec!["filingFee must be a positive number"]);
    }

    #[test]
    fn amounts_that_round_to_zero_are_not_positive() {
        let mut body = valid_body();
        body["price"] = json!(0.004);
        let errs = validate_create(&body).unwrap_err();
        assert_eq!(messages(&errs), vec!["price must be a positive number"]);

        body["price"] = json!(0.005);
        let p = validate_create(&body).unwrap();
        assert_eq!(p.price, Decimal::from_str("0.01").unwrap());

        let errs = validate_update(&json!({ "filingFee": 0.001 })).unwrap_err();
        assert_eq!(messages(&errs), vec!["filingFee must be a positive number"]);
    }

    #[test]
    fn whole_floats_are_integers() {
        let mut body = valid_body();
        body["lengthOfStay"] = json!(30.0);
        assert_eq!(validate_create(&body).unwrap().length_of_stay, 30);
    }

    #[test]
    fn oversized_stay_is_rejected() {
        let mut body = valid_body();
        body["lengthOfStay"] = json!(3_000_000_000_i64);
        let errs = validate_create(&body).unwrap_err();
        assert_eq!(
            messages(&errs),
            vec!["lengthOfStay must not be greater than 2147483647"]
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let mut body = valid_body();
        body["id"] = json!("x");
        body["discount"] = json!(5);
        let errs = validate_create(&body).unwrap_err();
        let mut got = messages(&errs);
        got.sort_unstable();
        assert_eq!(
            got,
            vec![
                "property discount should not exist",
                "property id should not exist"
            ]
        );
    }

    #[test]
    fn non_object_body_is_one_violation() {
        let errs = validate_create(&json!([1, 2])).unwrap_err();
        assert_eq!(errs.len(), 1);
        assert!(errs[0].field.is_none());
    }

    #[test]
    fn update_treats_null_as_absent() {
        let patch = validate_update(&json!({ "price": 199.99, "country": null })).unwrap();
        assert_eq!(patch.price, Some(Decimal::from_str("199.99").unwrap()));
        assert_eq!(patch.country, None);
        assert_eq!(patch.visa_type, None);

        assert!(validate_update(&json!({})).unwrap().is_empty());
    }

    #[test]
    fn update_still_checks_present_fields() {
        let errs = validate_update(&json!({ "lengthOfStay": 0, "extra": 1 })).unwrap_err();
        assert_eq!(
            messages(&errs),
            vec![
                "lengthOfStay must be a positive number",
                "property extra should not exist"
            ]
        );
    }

    #[test]
    fn body_parsing() {
        assert_eq!(parse_json_body(b"").unwrap(), json!({}));
        assert_eq!(parse_json_body(b" \n").unwrap(), json!({}));
        assert_eq!(parse_json_body(br#"{"a":1}"#).unwrap(), json!({ "a": 1 }));
        assert!(parse_json_body(b"{not json").is_err());
    }

    #[test]
    fn query_defaults() {
        let q = validate_query(&[], 25).unwrap();
        assert_eq!(q.page, 1);
        assert_eq!(q.limit, 25);
        assert_eq!(q.sort_by, SortField::CreatedAt);
        assert_eq!(q.sort_order, SortDir::Desc);
    }

    #[test]
    fn query_parses_every_parameter() {
        let q = validate_query(
            &pairs(&[
                ("page", "2"),
                ("limit", "5"),
                ("sortBy", "price"),
                ("sortOrder", "ASC"),
                ("country", "thai"),
                ("visaType", "tour"),
                ("entryType", "single"),
                ("minPrice", "0"),
                ("maxPrice", "200.5"),
                ("minLengthOfStay", "7"),
                ("maxLengthOfStay", "90"),
            ]),
            10,
        )
        .unwrap();

        assert_eq!((q.page, q.limit), (2, 5));
        assert_eq!(q.sort_by, SortField::Price);
        assert_eq!(q.sort_order, SortDir::Asc);
        assert_eq!(q.country.as_deref(), Some("thai"));
        assert_eq!(q.min_price, Some(Decimal::ZERO));
        assert_eq!(q.max_price, Some(Decimal::from_str("200.5").unwrap()));
        assert_eq!(q.min_length_of_stay, Some(7));
        assert_eq!(q.max_length_of_stay, Some(90));
    }

    #[test]
    fn query_collects_every_violation() {
        let errs = validate_query(
            &pairs(&[
                ("page", "0"),
                ("limit", "abc"),
                ("sortBy", "id"),
                ("sortOrder", "asc"),
                ("minPrice", "-1"),
                ("maxPrice", "cheap"),
                ("minLengthOfStay", "2.5"),
                ("maxLengthOfStay", "0"),
                ("color", "red"),
            ]),
            10,
        )
        .unwrap_err();

        assert_eq!(
            messages(&errs),
            vec![
                "page must not be less than 1",
                "limit must be an integer number",
                "sortBy must be one of the following values: country, visaType, price, lengthOfStay, entryType, filingFee, createdAt, updatedAt",
                "sortOrder must be one of the following values: ASC, DESC",
                "minPrice must not be less than 0",
                "maxPrice must be a number conforming to the specified constraints",
                "minLengthOfStay must be an integer number",
                "maxLengthOfStay must be a positive number",
                "property color should not exist",
            ]
        );
    }
}
