//! Checkout form state.

use crate::checkout::{BillingDetails, PaymentMethod};

/// Default delivery city.
pub const DEFAULT_CITY: &str = "Երևան";

/// Required form fields, named as on the order payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    FullName,
    Phone,
    Address,
}

impl FormField {
    pub fn as_str(&self) -> &'static str {
        match self {
            FormField::FullName => "full_name",
            FormField::Phone => "phone",
            FormField::Address => "address",
        }
    }
}

impl std::fmt::Display for FormField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the customer typed on the checkout page. Never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutForm {
    pub full_name: String,
    pub phone: String,
    pub email: String,
    pub city: String,
    pub address: String,
    pub notes: String,
    /// Text for the greeting card that goes with the bouquet.
    pub greeting_card: String,
    pub payment_method: PaymentMethod,
}

impl Default for CheckoutForm {
    fn default() -> Self {
        Self {
            full_name: String::new(),
            phone: String::new(),
            email: String::new(),
            city: DEFAULT_CITY.to_string(),
            address: String::new(),
            notes: String::new(),
            greeting_card: String::new(),
            payment_method: PaymentMethod::Cash,
        }
    }
}

impl CheckoutForm {
    /// Trim surrounding whitespace from every text field.
    pub fn trim(&mut self) {
        for field in [
            &mut self.full_name,
            &mut self.phone,
            &mut self.email,
            &mut self.city,
            &mut self.address,
            &mut self.notes,
            &mut self.greeting_card,
        ] {
            if field.trim().len() != field.len() {
                *field = field.trim().to_string();
            }
        }
    }

    /// Required fields that are blank.
    pub fn missing_fields(&self) -> Vec<FormField> {
        [
            (FormField::FullName, &self.full_name),
            (FormField::Phone, &self.phone),
            (FormField::Address, &self.address),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(field, _)| field)
        .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing_fields().is_empty()
    }

    /// Billing details handed to the payment processor.
    pub fn billing_details(&self) -> BillingDetails {
        BillingDetails {
            name: self.full_name.clone(),
            email: Some(self.email.clone()).filter(|e| !e.is_empty()),
            phone: self.phone.clone(),
            address_line1: self.address.clone(),
            city: self.city.clone(),
        }
    }

    /// Back to a blank form.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let form = CheckoutForm::default();
        assert_eq!(form.city, "Երևան");
        assert_eq!(form.payment_method, PaymentMethod::Cash);
        assert_eq!(
            form.missing_fields(),
            vec![FormField::FullName, FormField::Phone, FormField::Address]
        );
    }

    #[test]
    fn test_whitespace_counts_as_missing() {
        let mut form = CheckoutForm {
            full_name: "  Anna ".into(),
            phone: "   ".into(),
            address: "Abovyan 1".into(),
            ..CheckoutForm::default()
        };
        assert_eq!(form.missing_fields(), vec![FormField::Phone]);

        form.trim();
        assert_eq!(form.full_name, "Anna");
        assert_eq!(form.phone, "");
    }

    #[test]
    fn test_billing_details_skip_blank_email() {
        let form = CheckoutForm {
            full_name: "Anna".into(),
            phone: "+374".into(),
            address: "Abovyan 1".into(),
            ..CheckoutForm::default()
        };
        let billing = form.billing_details();
        assert_eq!(billing.email, None);
        assert_eq!(billing.city, "Երևան");
    }
}
