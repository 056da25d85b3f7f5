// 🏢 Department Entity
//
// A department is just an identity plus a name. The id is assigned by the
// persistence layer on first save; until then it is None.

use crate::form::{FieldKind, FormBinding, FormFields, TextField};
use crate::validation::{require_text, try_parse_int, ParsePolicy, ValidationErrors};
use super::NAME_MAX_LENGTH;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Department {
    /// None until the record is persisted
    pub id: Option<i64>,
    pub name: String,
}

impl Department {
    pub fn new(name: &str) -> Self {
        Department {
            id: None,
            name: name.to_string(),
        }
    }

    pub fn with_id(id: i64, name: &str) -> Self {
        Department {
            id: Some(id),
            name: name.to_string(),
        }
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }
}

impl FormBinding for Department {
    const KIND: &'static str = "department";

    fn form_fields() -> FormFields {
        FormFields::new(vec![
            TextField::new("id", "Id", FieldKind::Integer).read_only(),
            TextField::new("name", "Name", FieldKind::Text).max_length(NAME_MAX_LENGTH),
        ])
    }

    fn write_fields(&self, fields: &mut FormFields) {
        fields.set_text("id", &self.id.map(|id| id.to_string()).unwrap_or_default());
        fields.set_text("name", &self.name);
    }

    fn read_fields(fields: &FormFields, _policy: ParsePolicy) -> Result<Self, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let id = try_parse_int(fields.text("id"));

        let name = fields.text("name");
        require_text(&mut errors, "name", name);

        errors.into_result(Department {
            id,
            name: name.trim().to_string(),
        })
    }

    fn id(&self) -> Option<i64> {
        self.id
    }
}
