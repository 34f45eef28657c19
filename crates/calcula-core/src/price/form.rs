//! Manual price entry form.

use serde::{Deserialize, Serialize};

use crate::error::{CalculaError, Result};
use crate::parsing::{format_decimal_comma, parse_currency, parse_quantity};
use crate::price::model::PriceItem;
use crate::price::request::NewPrice;

/// Raw form values exactly as the user typed them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceForm {
    pub name: String,
    pub quantity: String,
    pub value: String,
}

impl Default for PriceForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            quantity: "1".to_string(),
            value: String::new(),
        }
    }
}

impl PriceForm {
    pub fn new(
        name: impl Into<String>,
        quantity: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            value: value.into(),
        }
    }

    /// Prefills the form for editing an existing item.
    pub fn for_edit(price: &PriceItem) -> Self {
        Self {
            name: price.name.clone().unwrap_or_default(),
            quantity: price.quantity.to_string(),
            value: price.value.map(format_decimal_comma).unwrap_or_default(),
        }
    }

    /// Validates the form. Quantity is checked first, then value, then name.
    pub fn validate(&self) -> Result<NewPrice> {
        let quantity = parse_quantity(&self.quantity).ok_or_else(|| {
            CalculaError::validation("quantity", "Enter a whole quantity greater than zero.")
        })?;

        let value = parse_currency(&self.value)
            .ok_or_else(|| CalculaError::validation("value", "Enter a value greater than zero."))?;

        let name = self.name.trim();
        if name.is_empty() {
            return Err(CalculaError::validation(
                "name",
                "Enter a description for the item.",
            ));
        }

        Ok(NewPrice {
            quantity,
            name: name.to_string(),
            value,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::price::model::PriceStatus;

    #[test]
    fn test_default_form() {
        let form = PriceForm::default();
        assert_eq!(form.quantity, "1");
        assert!(form.name.is_empty());
        assert!(form.value.is_empty());
    }

    #[test]
    fn test_validate_ok_trims_name() {
        let price = PriceForm::new("  Bread ", "2", "5,25").validate().unwrap();
        assert_eq!(
            price,
            NewPrice {
                quantity: 2,
                name: "Bread".into(),
                value: 5.25,
            }
        );
    }

    #[test]
    fn test_validate_reports_first_bad_field() {
        let err = PriceForm::new("", "0", "abc").validate().unwrap_err();
        assert!(matches!(err, CalculaError::Validation { field: "quantity", .. }));

        let err = PriceForm::new("", "1", "abc").validate().unwrap_err();
        assert!(matches!(err, CalculaError::Validation { field: "value", .. }));

        let err = PriceForm::new("   ", "1", "3").validate().unwrap_err();
        assert!(matches!(err, CalculaError::Validation { field: "name", .. }));
    }

    #[test]
    fn test_for_edit_prefill() {
        let item = PriceItem {
            id: "p1".into(),
            name: Some("Cheese".into()),
            value: Some(10.5),
            quantity: 3,
            status: PriceStatus::Ready,
        };
        assert_eq!(PriceForm::for_edit(&item), PriceForm::new("Cheese", "3", "10,5"));

        let pending = PriceItem {
            id: "p2".into(),
            name: None,
            value: None,
            quantity: 1,
            status: PriceStatus::Pending,
        };
        assert_eq!(PriceForm::for_edit(&pending), PriceForm::new("", "1", ""));
    }
}
