use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Which payload shape an endpoint accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionKind {
    /// Order form: scalar fields plus a `products` list expanded per unit.
    Order,
    /// Chat-widget lead: `entity.visitor.{name,email,phone}`.
    Lead,
}

/// Order form body. Scalar fields are kept as raw JSON and copied verbatim
/// into every expanded record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OrderSubmission {
    #[serde(rename = "OrderReceived", default)]
    pub order_received: Value,
    #[serde(default)]
    pub email: Value,
    #[serde(default)]
    pub company: Value,
    #[serde(rename = "ContactName", default)]
    pub contact_name: Value,
    #[serde(rename = "ContractNumber", default)]
    pub contract_number: Value,
    #[serde(rename = "StartDate", default)]
    pub start_date: Value,
    #[serde(rename = "EndDate", default)]
    pub end_date: Value,
    #[serde(default)]
    pub products: Option<ProductsField>,
}

/// `products` arrives either as a JSON array or as that array serialized
/// into a string.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum ProductsField {
    Encoded(String),
    Structured(Vec<Value>),
    Other(Value),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProductLine {
    pub description: String,
    pub renewal: Value,
    pub term: Value,
    pub quantity: u32,
}

/// One unit of an ordered product. `Quantity` is always 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderRecord {
    #[serde(rename = "OrderReceived")]
    pub order_received: Value,
    pub email: Value,
    pub company: Value,
    #[serde(rename = "ContactName")]
    pub contact_name: Value,
    #[serde(rename = "ContractNumber")]
    pub contract_number: Value,
    #[serde(rename = "StartDate")]
    pub start_date: Value,
    #[serde(rename = "EndDate")]
    pub end_date: Value,
    #[serde(rename = "ProductDescription")]
    pub product_description: String,
    #[serde(rename = "NewRenewal")]
    pub new_renewal: Value,
    #[serde(rename = "Term")]
    pub term: Value,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeadRecord {
    pub name: String,
    pub email: String,
    pub phone: String,
}

/// A record that both sinks accept: a JSON row for the store and an
/// ordered cell list for the spreadsheet.
pub trait SinkRecord: Serialize {
    fn sheet_row(&self) -> Vec<Value>;
}

impl SinkRecord for OrderRecord {
    fn sheet_row(&self) -> Vec<Value> {
        vec![
            self.order_received.clone(),
            self.email.clone(),
            self.company.clone(),
            self.contact_name.clone(),
            self.contract_number.clone(),
            self.start_date.clone(),
            self.end_date.clone(),
            Value::String(self.product_description.clone()),
            self.new_renewal.clone(),
            self.term.clone(),
            Value::from(self.quantity),
        ]
    }
}

impl SinkRecord for LeadRecord {
    fn sheet_row(&self) -> Vec<Value> {
        vec![
            Value::String(self.name.clone()),
            Value::String(self.email.clone()),
            Value::String(self.phone.clone()),
        ]
    }
}

/// The same records rendered for both sinks, index-aligned.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordBatch {
    pub store_rows: Vec<Value>,
    pub sheet_rows: Vec<Vec<Value>>,
}

impl RecordBatch {
    pub fn from_records<R: SinkRecord>(records: &[R]) -> serde_json::Result<Self> {
        let store_rows = records
            .iter()
            .map(serde_json::to_value)
            .collect::<serde_json::Result<Vec<_>>>()?;
        let sheet_rows = records.iter().map(SinkRecord::sheet_row).collect();

        Ok(Self {
            store_rows,
            sheet_rows,
        })
    }

    pub fn len(&self) -> usize {
        self.store_rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store_rows.is_empty()
    }
}

/// Where one endpoint's records land.
#[derive(Debug, Clone, Copy)]
pub struct SinkTarget<'a> {
    pub table: &'a str,
    pub range: &'a str,
}

/// Rows echoed back by the store (identifiers included when it assigns them).
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct StoreReceipt {
    pub rows: Vec<Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MirrorReceipt {
    pub updated_range: Option<String>,
    pub updated_rows: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct WriteReport {
    pub records: usize,
    pub store: StoreReceipt,
    /// `None` when nothing was mirrored (empty batch).
    pub mirror: Option<MirrorReceipt>,
}
