use std::fmt;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const ORDER_ID_PREFIX: &str = "OJ-";
const ORDER_ID_DIGITS: usize = 6;
const PHONE_DIGITS: usize = 10;

/// Strips whitespace and accepts exactly ten ASCII digits.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let phone: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    (phone.len() == PHONE_DIGITS && phone.bytes().all(|b| b.is_ascii_digit())).then_some(phone)
}

/// Identifier shared by every line of one checkout: `OJ-` plus six digits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct OrderId(String);

impl OrderId {
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        let digits = raw.strip_prefix(ORDER_ID_PREFIX)?;
        let valid = digits.len() == ORDER_ID_DIGITS && digits.bytes().all(|b| b.is_ascii_digit());
        valid.then(|| Self(raw.to_string()))
    }

    pub fn generate() -> Self {
        let n: u32 = rand::thread_rng().gen_range(0..1_000_000);
        Self(format!("{ORDER_ID_PREFIX}{n:06}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for OrderId {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value).ok_or_else(|| format!("invalid order id '{value}', expected OJ-XXXXXX"))
    }
}

impl From<OrderId> for String {
    fn from(id: OrderId) -> Self {
        id.0
    }
}

/// Delivery progress of an order batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    Received,
    Preparing,
    OutForDelivery,
    Delivered,
}

impl OrderStatus {
    fn rank(self) -> u8 {
        match self {
            OrderStatus::Received => 0,
            OrderStatus::Preparing => 1,
            OrderStatus::OutForDelivery => 2,
            OrderStatus::Delivered => 3,
        }
    }

    /// Forward moves only. Skipping ahead is fine, going back is not.
    pub fn can_advance_to(self, next: OrderStatus) -> bool {
        next.rank() > self.rank()
    }

    pub fn is_terminal(self) -> bool {
        self == OrderStatus::Delivered
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Received => "received",
            OrderStatus::Preparing => "preparing",
            OrderStatus::OutForDelivery => "out_for_delivery",
            OrderStatus::Delivered => "delivered",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    Cash,
    Online,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Pending,
    Paid,
    Cod,
}

/// Who the order is for. Shared by every line of the batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDetails {
    #[serde(rename = "name")]
    pub customer_name: String,
    pub phone: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

/// Delivery staff member attached to an order once it leaves the kitchen.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StaffAssignment {
    pub staff_id: String,
    pub staff_name: String,
    pub staff_phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_email: Option<String>,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub line_id: Uuid,
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

/// One checkout batch with all of its lines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub order_id: OrderId,
    #[serde(flatten)]
    pub customer: CustomerDetails,
    pub payment_mode: PaymentMode,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_reference: Option<String>,
    pub status: OrderStatus,
    pub lines: Vec<OrderLine>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staff_assignment: Option<StaffAssignment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Order {
    pub fn total(&self) -> Decimal {
        self.lines.iter().map(|line| line.line_total).sum()
    }

    /// Product units across all lines; this is what loyalty accrual counts.
    pub fn units(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// Flat per-line rows, the shape the storefront's order table consumes.
    pub fn line_views(&self) -> Vec<OrderLineView> {
        self.lines
            .iter()
            .map(|line| OrderLineView {
                order_id: self.order_id.clone(),
                line_id: line.line_id,
                customer: self.customer.clone(),
                product_id: line.product_id.clone(),
                product_name: line.product_name.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                total_price: line.line_total,
                payment_mode: self.payment_mode,
                payment_status: self.payment_status,
                status: self.status,
                created_at: self.created_at,
                updated_at: self.updated_at,
            })
            .collect()
    }
}

/// A single line as it appears on the wire, header fields repeated.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLineView {
    pub order_id: OrderId,
    pub line_id: Uuid,
    #[serde(flatten)]
    pub customer: CustomerDetails,
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub total_price: Decimal,
    pub payment_mode: PaymentMode,
    pub payment_status: PaymentStatus,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Requested line before it becomes part of a stored batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemCreate {
    pub product_id: String,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price: Decimal,
}

impl LineItemCreate {
    pub fn line_total(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Params for creating an order batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderCreate {
    #[serde(flatten)]
    pub customer: CustomerDetails,
    pub payment_mode: PaymentMode,
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub payment_reference: Option<String>,
    pub lines: Vec<LineItemCreate>,
}

impl OrderCreate {
    pub fn subtotal(&self) -> Decimal {
        self.lines.iter().map(LineItemCreate::line_total).sum()
    }
}

/// Look-back periods offered by the admin screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeWindow {
    /// Since midnight UTC.
    Today,
    Week,
    Month,
    Year,
}

impl TimeWindow {
    pub fn since(self, now: DateTime<Utc>) -> DateTime<Utc> {
        let days = match self {
            TimeWindow::Today => return now.date_naive().and_time(chrono::NaiveTime::MIN).and_utc(),
            TimeWindow::Week => 7,
            TimeWindow::Month => 30,
            TimeWindow::Year => 365,
        };
        now - chrono::Duration::days(days)
    }
}

/// Filters accepted by the order listing.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    pub since: Option<DateTime<Utc>>,
    /// Exclusive upper bound on `createdAt`.
    pub until: Option<DateTime<Utc>>,
    pub payment_mode: Option<PaymentMode>,
    pub status: Option<OrderStatus>,
    pub search: Option<String>,
}

impl OrderFilter {
    pub fn matches(&self, order: &Order) -> bool {
        if let Some(since) = self.since {
            if order.created_at < since {
                return false;
            }
        }
        if let Some(until) = self.until {
            if order.created_at >= until {
                return false;
            }
        }
        if let Some(mode) = self.payment_mode {
            if order.payment_mode != mode {
                return false;
            }
        }
        if let Some(status) = self.status {
            if order.status != status {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(query) if !query.is_empty() => {
                let query = query.to_lowercase();
                let digits: String = query.chars().filter(|c| !c.is_whitespace()).collect();
                order.order_id.as_str().to_lowercase().contains(&query)
                    || order.customer.customer_name.to_lowercase().contains(&query)
                    || order.customer.phone.contains(&digits)
                    || order.status.as_str().contains(&query.replace(' ', "_"))
                    || order
                        .lines
                        .iter()
                        .any(|line| line.product_name.to_lowercase().contains(&query))
            }
            _ => true,
        }
    }
}
