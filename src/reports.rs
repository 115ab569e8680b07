//! Read-only admin reports computed from order snapshots.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{Order, OrderStatus};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUnits {
    pub product_name: String,
    pub units: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_orders: usize,
    pub total_sales: Decimal,
    /// Orders still in the kitchen: `received` or `preparing`.
    pub pending_orders: usize,
    pub delivered_orders: usize,
    pub units_by_product: Vec<ProductUnits>,
}

pub fn dashboard_stats(orders: &[Order]) -> DashboardStats {
    let mut units: HashMap<&str, u64> = HashMap::new();
    for line in orders.iter().flat_map(|order| &order.lines) {
        *units.entry(line.product_name.as_str()).or_default() += u64::from(line.quantity);
    }
    let mut units_by_product: Vec<ProductUnits> = units
        .into_iter()
        .map(|(name, units)| ProductUnits { product_name: name.to_string(), units })
        .collect();
    units_by_product.sort_by(|a, b| b.units.cmp(&a.units).then_with(|| a.product_name.cmp(&b.product_name)));

    DashboardStats {
        total_orders: orders.len(),
        total_sales: orders.iter().map(Order::total).sum(),
        pending_orders: orders
            .iter()
            .filter(|o| matches!(o.status, OrderStatus::Received | OrderStatus::Preparing))
            .count(),
        delivered_orders: orders.iter().filter(|o| o.status == OrderStatus::Delivered).count(),
        units_by_product,
    }
}

/// One row of the admin customer table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerSummary {
    pub name: String,
    pub phone: String,
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub total_orders: usize,
    pub total_spent: Decimal,
    pub last_order_at: DateTime<Utc>,
}

/// Customers keyed by phone number, most recent buyer first.
///
/// Contact details come from the customer's latest order.
pub fn customer_summaries(orders: &[Order]) -> Vec<CustomerSummary> {
    let mut by_phone: HashMap<&str, CustomerSummary> = HashMap::new();
    for order in orders {
        let summary = by_phone
            .entry(order.customer.phone.as_str())
            .or_insert_with(|| CustomerSummary {
                name: order.customer.customer_name.clone(),
                phone: order.customer.phone.clone(),
                address: order.customer.address.clone(),
                email: order.customer.email.clone(),
                total_orders: 0,
                total_spent: Decimal::ZERO,
                last_order_at: order.created_at,
            });
        summary.total_orders += 1;
        summary.total_spent += order.total();
        if order.created_at > summary.last_order_at {
            summary.last_order_at = order.created_at;
            summary.name = order.customer.customer_name.clone();
            summary.address = order.customer.address.clone();
            summary.email = order.customer.email.clone().or(summary.email.take());
        }
    }
    let mut customers: Vec<CustomerSummary> = by_phone.into_values().collect();
    customers.sort_by(|a, b| b.last_order_at.cmp(&a.last_order_at));
    customers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor_framework::Entity;
    use crate::domain::OrderId;
    use crate::order_actor::entity::tests::{cash_order, line};
    use chrono::Duration;

    fn order(id: &str, lines: Vec<crate::domain::LineItemCreate>) -> Order {
        Order::from_create_params(OrderId::parse(id).unwrap(), cash_order(lines)).unwrap()
    }

    #[test]
    fn stats_count_pending_and_units() {
        let mut delivered = order("OJ-000001", vec![line("1", 2, 89)]);
        delivered.status = OrderStatus::Delivered;
        let mut preparing = order("OJ-000002", vec![line("1", 1, 89), line("2", 4, 99)]);
        preparing.status = OrderStatus::Preparing;
        let received = order("OJ-000003", vec![line("2", 1, 99)]);

        let stats = dashboard_stats(&[delivered, preparing, received]);
        assert_eq!(stats.total_orders, 3);
        assert_eq!(stats.pending_orders, 2);
        assert_eq!(stats.delivered_orders, 1);
        assert_eq!(stats.total_sales, Decimal::from(178 + 89 + 396 + 99));
        assert_eq!(
            stats.units_by_product,
            vec![
                ProductUnits { product_name: "Juice 2".into(), units: 5 },
                ProductUnits { product_name: "Juice 1".into(), units: 3 },
            ]
        );
    }

    #[test]
    fn customers_grouped_by_phone() {
        let first = order("OJ-000001", vec![line("1", 1, 89)]);
        let mut second = order("OJ-000002", vec![line("2", 2, 99)]);
        second.created_at = first.created_at + Duration::minutes(5);
        second.customer.address = "New Flat 4".into();

        let customers = customer_summaries(&[first, second.clone()]);
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].total_orders, 2);
        assert_eq!(customers[0].total_spent, Decimal::from(287));
        assert_eq!(customers[0].address, "New Flat 4");
        assert_eq!(customers[0].last_order_at, second.created_at);
    }
}
