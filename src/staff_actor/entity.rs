use chrono::Utc;

use super::actions::StaffAction;
use super::error::StaffError;
use crate::actor_framework::Entity;
use crate::domain::{normalize_phone, DeliveryStaff, StaffCreate, StaffPatch, StaffStatus};

impl Entity for DeliveryStaff {
    type Id = String;
    type CreateParams = StaffCreate;
    type Patch = StaffPatch;
    type Action = StaffAction;
    type ActionResult = DeliveryStaff;
    type Error = StaffError;

    fn id(&self) -> &String { &self.id }

    fn from_create_params(id: String, params: StaffCreate) -> Result<Self, StaffError> {
        Ok(Self {
            id,
            name: required_name(params.name)?,
            phone: phone(&params.phone)?,
            email: optional_email(params.email),
            status: StaffStatus::NotAssigned,
            created_at: Utc::now(),
        })
    }

    fn on_update(&mut self, patch: StaffPatch) -> Result<(), StaffError> {
        if let Some(name) = patch.name {
            self.name = required_name(name)?;
        }
        if let Some(number) = patch.phone {
            self.phone = phone(&number)?;
        }
        if patch.email.is_some() {
            self.email = optional_email(patch.email);
        }
        Ok(())
    }

    /// Riders out on a delivery stay on the roster until released.
    fn on_delete(&self) -> Result<(), StaffError> {
        if self.status == StaffStatus::Assigned {
            return Err(StaffError::Unavailable(format!("{} is on a delivery", self.name)));
        }
        Ok(())
    }

    fn handle_action(&mut self, action: StaffAction) -> Result<DeliveryStaff, StaffError> {
        match action {
            StaffAction::Assign => {
                if self.status == StaffStatus::Assigned {
                    return Err(StaffError::Unavailable(format!("{} is already assigned", self.name)));
                }
                self.status = StaffStatus::Assigned;
            }
            StaffAction::Release => self.status = StaffStatus::NotAssigned,
            StaffAction::Toggle => {
                self.status = match self.status {
                    StaffStatus::Assigned => StaffStatus::NotAssigned,
                    StaffStatus::NotAssigned => StaffStatus::Assigned,
                };
            }
        }
        Ok(self.clone())
    }
}

fn required_name(name: String) -> Result<String, StaffError> {
    let name = name.trim().to_string();
    if name.is_empty() {
        return Err(StaffError::ValidationError("name is required".to_string()));
    }
    Ok(name)
}

fn phone(raw: &str) -> Result<String, StaffError> {
    normalize_phone(raw).ok_or_else(|| StaffError::ValidationError("phone must be 10 digits".to_string()))
}

fn optional_email(email: Option<String>) -> Option<String> {
    email
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rider() -> DeliveryStaff {
        DeliveryStaff::from_create_params(
            "staff_1".into(),
            StaffCreate { name: "Ravi".into(), phone: "98765 43210".into(), email: Some(" Ravi@Example.com ".into()) },
        )
        .unwrap()
    }

    #[test]
    fn new_riders_start_unassigned() {
        let rider = rider();
        assert_eq!(rider.status, StaffStatus::NotAssigned);
        assert_eq!(rider.phone, "9876543210");
        assert_eq!(rider.email.as_deref(), Some("ravi@example.com"));
    }

    #[test]
    fn assign_twice_is_rejected() {
        let mut rider = rider();
        rider.handle_action(StaffAction::Assign).unwrap();
        assert!(matches!(rider.handle_action(StaffAction::Assign), Err(StaffError::Unavailable(_))));
        assert_eq!(rider.handle_action(StaffAction::Release).unwrap().status, StaffStatus::NotAssigned);
    }

    #[test]
    fn toggle_flips_status() {
        let mut rider = rider();
        assert_eq!(rider.handle_action(StaffAction::Toggle).unwrap().status, StaffStatus::Assigned);
        assert_eq!(rider.handle_action(StaffAction::Toggle).unwrap().status, StaffStatus::NotAssigned);
    }

    #[test]
    fn assigned_riders_cannot_be_deleted() {
        let mut rider = rider();
        rider.handle_action(StaffAction::Assign).unwrap();
        assert!(rider.on_delete().is_err());
    }

    #[test]
    fn bad_phone_is_rejected() {
        let err = DeliveryStaff::from_create_params(
            "staff_2".into(),
            StaffCreate { name: "Ravi".into(), phone: "12345".into(), email: None },
        )
        .unwrap_err();
        assert!(matches!(err, StaffError::ValidationError(_)));
    }
}
