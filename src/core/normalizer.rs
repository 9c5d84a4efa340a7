//! Turns inbound submissions into the flat record sequence both sinks receive.
//!
//! Order submissions are expanded one record per ordered unit; lead
//! submissions collapse to a single trimmed record. Everything here is pure:
//! the whole expansion is computed before any sink sees a row.

use crate::domain::model::{
    LeadRecord, OrderRecord, OrderSubmission, ProductLine, ProductsField,
};
use crate::utils::error::ValidationError;
use serde_json::{Map, Value};

pub const DEFAULT_MAX_RECORDS: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Upper bound on records produced by one submission.
    pub max_records: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_records: DEFAULT_MAX_RECORDS,
        }
    }
}

/// 解析 `products`：字串先做 JSON 解碼，結果必須是陣列
pub fn decode_products(field: Option<ProductsField>) -> Result<Vec<Value>, ValidationError> {
    match field {
        Some(ProductsField::Structured(items)) => Ok(items),
        Some(ProductsField::Encoded(raw)) => {
            let decoded: Value = serde_json::from_str(&raw)
                .map_err(|e| ValidationError::MalformedProducts(e.to_string()))?;
            match decoded {
                Value::Array(items) => Ok(items),
                _ => Err(ValidationError::ProductsNotAList),
            }
        }
        Some(ProductsField::Other(_)) | None => Err(ValidationError::ProductsNotAList),
    }
}

/// Keeps lines with a non-empty description, in input order.
pub fn parse_product_lines(items: Vec<Value>) -> Result<Vec<ProductLine>, ValidationError> {
    let mut lines = Vec::with_capacity(items.len());

    for (index, item) in items.into_iter().enumerate() {
        let Value::Object(mut fields) = item else {
            return Err(ValidationError::InvalidProductLine { index });
        };

        let description = match fields.remove("ProductDescription") {
            None | Some(Value::Null) => continue,
            Some(Value::String(s)) if s.is_empty() => continue,
            Some(Value::String(s)) => s,
            Some(_) => return Err(ValidationError::InvalidProductLine { index }),
        };

        let quantity = parse_quantity(index, fields.get("Quantity"))?;

        lines.push(ProductLine {
            description,
            renewal: take(&mut fields, "NewRenewal"),
            term: take(&mut fields, "Term"),
            quantity,
        });
    }

    Ok(lines)
}

fn take(fields: &mut Map<String, Value>, key: &str) -> Value {
    fields.remove(key).unwrap_or(Value::Null)
}

fn parse_quantity(index: usize, value: Option<&Value>) -> Result<u32, ValidationError> {
    let invalid = |value: &str| ValidationError::InvalidQuantity {
        index,
        value: value.to_string(),
    };

    match value {
        Some(Value::Number(n)) => {
            if let Some(q) = n.as_u64() {
                return u32::try_from(q).map_err(|_| invalid(&n.to_string()));
            }
            // 3.0 is still a whole quantity
            match n.as_f64() {
                Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= f64::from(u32::MAX) => {
                    Ok(f as u32)
                }
                _ => Err(invalid(&n.to_string())),
            }
        }
        Some(Value::String(s)) => s.trim().parse::<u32>().map_err(|_| invalid(s)),
        Some(other) => Err(invalid(&other.to_string())),
        None => Err(invalid("missing")),
    }
}

/// Repeats each line `quantity` times, copying the submission's scalars.
pub fn expand(submission: &OrderSubmission, lines: &[ProductLine]) -> Vec<OrderRecord> {
    lines
        .iter()
        .flat_map(|line| {
            (0..line.quantity).map(move |_| OrderRecord {
                order_received: submission.order_received.clone(),
                email: submission.email.clone(),
                company: submission.company.clone(),
                contact_name: submission.contact_name.clone(),
                contract_number: submission.contract_number.clone(),
                start_date: submission.start_date.clone(),
                end_date: submission.end_date.clone(),
                product_description: line.description.clone(),
                new_renewal: line.renewal.clone(),
                term: line.term.clone(),
                quantity: 1,
            })
        })
        .collect()
}

pub fn normalize_order(raw: Value, limits: &Limits) -> Result<Vec<OrderRecord>, ValidationError> {
    // serde 也會把陣列當成依序排列的欄位，必須先擋掉
    if !raw.is_object() {
        return Err(ValidationError::InvalidBody(format!(
            "expected a JSON object, got {}",
            json_kind(&raw)
        )));
    }

    let mut submission: OrderSubmission = serde_json::from_value(raw)
        .map_err(|e| ValidationError::InvalidBody(e.to_string()))?;

    let items = decode_products(submission.products.take())?;
    let lines = parse_product_lines(items)?;

    let count: u64 = lines.iter().map(|line| u64::from(line.quantity)).sum();
    if count > limits.max_records as u64 {
        return Err(ValidationError::TooManyRecords {
            count,
            limit: limits.max_records,
        });
    }

    Ok(expand(&submission, &lines))
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub fn normalize_lead(raw: &Value) -> Result<LeadRecord, ValidationError> {
    let visitor = raw
        .pointer("/entity/visitor")
        .filter(|v| v.is_object())
        .ok_or_else(|| ValidationError::MissingField("visitor".to_string()))?;

    let field = |name: &str| -> Result<String, ValidationError> {
        visitor
            .get(name)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .ok_or_else(|| ValidationError::MissingField(name.to_string()))
    };

    Ok(LeadRecord {
        name: field("name")?,
        email: field("email")?,
        phone: field("phone")?,
    })
}
