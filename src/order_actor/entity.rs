use chrono::{Duration, Utc};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

use super::actions::OrderAction;
use super::error::OrderError;
use crate::actor_framework::Entity;
use crate::domain::{
    normalize_phone, CustomerDetails, LineItemCreate, Order, OrderCreate, OrderId, OrderLine, OrderStatus,
    PaymentMode, PaymentStatus, StaffAssignment,
};

impl Entity for Order {
    type Id = OrderId;
    type CreateParams = OrderCreate;
    type Patch = ();
    type Action = OrderAction;
    type ActionResult = Order;
    type Error = OrderError;

    fn id(&self) -> &OrderId {
        &self.order_id
    }

    /// Builds a new batch in `received` state.
    ///
    /// # Errors
    /// `EmptyCart` without lines, `ValidationError` for a bad header or line.
    fn from_create_params(order_id: OrderId, params: OrderCreate) -> Result<Self, OrderError> {
        let params = validate_create(params)?;
        let now = Utc::now();
        Ok(Self {
            order_id,
            customer: params.customer,
            payment_mode: params.payment_mode,
            payment_status: params.payment_status,
            payment_reference: params.payment_reference,
            status: OrderStatus::Received,
            lines: params.lines.into_iter().map(new_line).collect(),
            staff_assignment: None,
            created_at: now,
            updated_at: now,
        })
    }

    /// Orders only change through actions.
    fn on_update(&mut self, _patch: ()) -> Result<(), OrderError> {
        Err(OrderError::InvalidState("orders are changed through status updates only".to_string()))
    }

    fn handle_action(&mut self, action: OrderAction) -> Result<Order, OrderError> {
        match action {
            OrderAction::UpdateStatus(next) => self.advance_to(next)?,
            OrderAction::AssignStaff(assignment) => self.assign_staff(assignment)?,
            OrderAction::AppendLines(params) => self.append_lines(params)?,
        }
        Ok(self.clone())
    }
}

impl Order {
    /// Guard for customer cancellation: only untouched orders may go.
    pub fn ensure_cancellable(order: &Order) -> Result<(), OrderError> {
        if order.status == OrderStatus::Received {
            Ok(())
        } else {
            Err(OrderError::InvalidState(format!(
                "order {} is already {} and can no longer be cancelled",
                order.order_id, order.status
            )))
        }
    }

    /// True when `params` describes exactly this batch, i.e. a retried create.
    pub fn is_replay_of(&self, params: &OrderCreate) -> bool {
        let Ok(params) = validate_create(params.clone()) else {
            return false;
        };
        self.customer == params.customer
            && self.payment_mode == params.payment_mode
            && self.payment_status == params.payment_status
            && self.lines.len() == params.lines.len()
            && self.lines.iter().zip(&params.lines).all(|(line, req)| same_line(line, req))
    }

    fn advance_to(&mut self, next: OrderStatus) -> Result<(), OrderError> {
        if next == self.status {
            debug!(order_id = %self.order_id, status = %next, "Status unchanged");
            return Ok(());
        }
        if !self.status.can_advance_to(next) {
            return Err(OrderError::InvalidState(format!(
                "order {} cannot move from {} back to {}",
                self.order_id, self.status, next
            )));
        }
        self.status = next;
        self.touch();
        Ok(())
    }

    fn assign_staff(&mut self, assignment: StaffAssignment) -> Result<(), OrderError> {
        if self.status.is_terminal() {
            return Err(OrderError::InvalidState(format!("order {} is already delivered", self.order_id)));
        }
        if let Some(current) = &self.staff_assignment {
            return Err(OrderError::InvalidState(format!(
                "order {} is already assigned to {}",
                self.order_id, current.staff_name
            )));
        }
        self.staff_assignment = Some(assignment);
        self.status = OrderStatus::OutForDelivery;
        self.touch();
        Ok(())
    }

    fn append_lines(&mut self, params: OrderCreate) -> Result<(), OrderError> {
        let params = validate_create(params)?;
        if self.status != OrderStatus::Received {
            return Err(OrderError::InvalidState(format!(
                "order {} is {} and no longer accepts lines",
                self.order_id, self.status
            )));
        }
        if self.customer != params.customer
            || self.payment_mode != params.payment_mode
            || self.payment_status != params.payment_status
        {
            return Err(OrderError::Conflict(format!(
                "order {} belongs to a different checkout",
                self.order_id
            )));
        }

        let mut appended = false;
        for line in params.lines {
            match self.lines.iter().find(|existing| existing.product_id == line.product_id) {
                Some(existing) if same_line(existing, &line) => {
                    debug!(order_id = %self.order_id, product_id = %line.product_id, "Line already present");
                }
                Some(_) => {
                    return Err(OrderError::Conflict(format!(
                        "order {} already has a different line for product {}",
                        self.order_id, line.product_id
                    )));
                }
                None => {
                    self.lines.push(new_line(line));
                    appended = true;
                }
            }
        }
        if appended {
            self.touch();
        }
        Ok(())
    }

    fn touch(&mut self) {
        let now = Utc::now();
        // The clock may not have moved since the previous write.
        self.updated_at = if now > self.updated_at {
            now
        } else {
            self.updated_at + Duration::milliseconds(1)
        };
    }
}

fn new_line(line: LineItemCreate) -> OrderLine {
    OrderLine {
        line_id: Uuid::new_v4(),
        line_total: line.line_total(),
        product_id: line.product_id,
        product_name: line.product_name,
        quantity: line.quantity,
        unit_price: line.unit_price,
    }
}

fn same_line(line: &OrderLine, req: &LineItemCreate) -> bool {
    line.product_id == req.product_id
        && line.product_name == req.product_name
        && line.quantity == req.quantity
        && line.unit_price == req.unit_price
}

/// Checks and normalizes creation params.
pub fn validate_create(mut params: OrderCreate) -> Result<OrderCreate, OrderError> {
    if params.lines.is_empty() {
        return Err(OrderError::EmptyCart);
    }
    params.customer = validate_customer(params.customer)?;
    validate_payment(params.payment_mode, params.payment_status)?;
    for line in &mut params.lines {
        validate_line(line)?;
    }
    params.payment_reference = params
        .payment_reference
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    Ok(params)
}

fn validate_customer(customer: CustomerDetails) -> Result<CustomerDetails, OrderError> {
    let customer_name = customer.customer_name.trim().to_string();
    if customer_name.is_empty() {
        return Err(OrderError::ValidationError("name is required".to_string()));
    }

    let phone = normalize_phone(&customer.phone)
        .ok_or_else(|| OrderError::ValidationError("phone must be exactly 10 digits".to_string()))?;

    let address = customer.address.trim().to_string();
    if address.is_empty() {
        return Err(OrderError::ValidationError("address is required".to_string()));
    }

    let email = customer
        .email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty());

    Ok(CustomerDetails { customer_name, phone, address, email })
}

fn validate_payment(mode: PaymentMode, status: PaymentStatus) -> Result<(), OrderError> {
    match (mode, status) {
        (_, PaymentStatus::Pending)
        | (PaymentMode::Cash, PaymentStatus::Cod)
        | (PaymentMode::Online, PaymentStatus::Paid) => Ok(()),
        (mode, status) => Err(OrderError::ValidationError(format!(
            "payment status {status:?} does not fit payment mode {mode:?}"
        ))),
    }
}

fn validate_line(line: &mut LineItemCreate) -> Result<(), OrderError> {
    line.product_id = line.product_id.trim().to_string();
    line.product_name = line.product_name.trim().to_string();
    if line.product_id.is_empty() || line.product_name.is_empty() {
        return Err(OrderError::ValidationError("every line needs a product id and name".to_string()));
    }
    if line.quantity < 1 {
        return Err(OrderError::ValidationError(format!(
            "quantity for {} must be at least 1",
            line.product_name
        )));
    }
    if line.unit_price < Decimal::ZERO {
        return Err(OrderError::ValidationError(format!(
            "price for {} must not be negative",
            line.product_name
        )));
    }
    Ok(())
}
