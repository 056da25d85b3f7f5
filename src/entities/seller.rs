// 🧑‍💼 Seller Entity
//
// Seller carries everything a department has plus contact and payroll data.
// Birth date and base salary are optional: a blank field means "unknown".

use crate::form::{FieldKind, FormBinding, FormFields, TextField};
use crate::validation::{
    parse_optional, require_text, try_parse_date, try_parse_decimal, try_parse_int,
    ParsePolicy, ValidationErrors, INVALID_DATE_MESSAGE, INVALID_NUMBER_MESSAGE,
    NOT_AN_EMAIL_MESSAGE,
};
use super::NAME_MAX_LENGTH;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub const EMAIL_MAX_LENGTH: usize = 60;

/// Format used when showing a birth date in the form
pub const DISPLAY_DATE_FORMAT: &str = "%d/%m/%Y";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Seller {
    pub id: Option<i64>,
    pub name: String,
    pub email: String,
    pub birth_date: Option<NaiveDate>,
    pub base_salary: Option<f64>,
}

impl Seller {
    pub fn new(
        name: &str,
        email: &str,
        birth_date: Option<NaiveDate>,
        base_salary: Option<f64>,
    ) -> Self {
        Seller {
            id: None,
            name: name.to_string(),
            email: email.to_string(),
            birth_date,
            base_salary,
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

impl FormBinding for Seller {
    const KIND: &'static str = "seller";

    fn form_fields() -> FormFields {
        FormFields::new(vec![
            TextField::new("id", "Id", FieldKind::Integer).read_only(),
            TextField::new("name", "Name", FieldKind::Text).max_length(NAME_MAX_LENGTH),
            TextField::new("email", "Email", FieldKind::Text).max_length(EMAIL_MAX_LENGTH),
            TextField::new("birth_date", "Birth date", FieldKind::Date),
            TextField::new("base_salary", "Base salary", FieldKind::Decimal),
        ])
    }

    fn write_fields(&self, fields: &mut FormFields) {
        fields.set_text("id", &self.id.map(|id| id.to_string()).unwrap_or_default());
        fields.set_text("name", &self.name);
        fields.set_text("email", &self.email);
        fields.set_text(
            "birth_date",
            &self
                .birth_date
                .map(|date| date.format(DISPLAY_DATE_FORMAT).to_string())
                .unwrap_or_default(),
        );
        fields.set_text(
            "base_salary",
            &self
                .base_salary
                // Unrounded, so resaving an untouched field keeps its value
                .map(|salary| salary.to_string())
                .unwrap_or_default(),
        );
    }

    fn read_fields(fields: &FormFields, policy: ParsePolicy) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let id = try_parse_int(fields.text("id"));

        let name = fields.text("name");
        require_text(&mut errors, "name", name);

        // Required check runs first so a blank email never gets the format message
        let email = fields.text("email");
        if require_text(&mut errors, "email", email) && !email.contains('@') {
            errors.add("email", NOT_AN_EMAIL_MESSAGE);
        }

        let birth_date = parse_optional(
            &mut errors,
            "birth_date",
            fields.text("birth_date"),
            policy,
            try_parse_date,
            INVALID_DATE_MESSAGE,
        );

        let base_salary = parse_optional(
            &mut errors,
            "base_salary",
            fields.text("base_salary"),
            policy,
            try_parse_decimal,
            INVALID_NUMBER_MESSAGE,
        );

        errors.into_result(Seller {
            id,
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            birth_date,
            base_salary,
        })
    }

    fn id(&self) -> Option<i64> {
        self.id
    }
}
