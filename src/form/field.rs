// Editable text fields with input-time constraints
//
// Constraints are applied while the user types (push_char). Programmatic
// writes through set_text show stored values as they are.

/// What characters a field accepts while typing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Digits only
    Integer,
    /// Digits and one decimal separator (`.` or `,`)
    Decimal,
    /// Digits and `/` `-`, at most 10 characters
    Date,
}

impl FieldKind {
    fn accepts(&self, current: &str, c: char) -> bool {
        match self {
            FieldKind::Text => !c.is_control(),
            FieldKind::Integer => c.is_ascii_digit(),
            FieldKind::Decimal => {
                c.is_ascii_digit()
                    || ((c == '.' || c == ',') && !current.contains(['.', ',']))
            }
            FieldKind::Date => {
                (c.is_ascii_digit() || c == '/' || c == '-') && current.chars().count() < 10
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct TextField {
    name: &'static str,
    label: &'static str,
    kind: FieldKind,
    max_length: Option<usize>,
    editable: bool,
    text: String,
}

impl TextField {
    pub fn new(name: &'static str, label: &'static str, kind: FieldKind) -> Self {
        TextField {
            name,
            label,
            kind,
            max_length: None,
            editable: true,
            text: String::new(),
        }
    }

    pub fn max_length(mut self, max: usize) -> Self {
        self.max_length = Some(max);
        self
    }

    pub fn read_only(mut self) -> Self {
        self.editable = false;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn is_editable(&self) -> bool {
        self.editable
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: &str) {
        self.text = text.to_string();
    }

    /// Types one character. Returns false if the field refused it.
    pub fn push_char(&mut self, c: char) -> bool {
        if !self.editable || !self.kind.accepts(&self.text, c) {
            return false;
        }
        if let Some(max) = self.max_length {
            if self.text.chars().count() >= max {
                return false;
            }
        }
        self.text.push(c);
        true
    }

    pub fn backspace(&mut self) {
        if self.editable {
            self.text.pop();
        }
    }

    pub fn clear(&mut self) {
        if self.editable {
            self.text.clear();
        }
    }
}

/// The ordered set of fields one form shows
#[derive(Debug, Clone)]
pub struct FormFields {
    fields: Vec<TextField>,
}

impl FormFields {
    pub fn new(fields: Vec<TextField>) -> Self {
        FormFields { fields }
    }

    /// Text of a field, or "" if the form has no such field
    pub fn text(&self, name: &str) -> &str {
        self.field(name).map(TextField::text).unwrap_or("")
    }

    pub fn set_text(&mut self, name: &str, text: &str) {
        if let Some(field) = self.field_mut(name) {
            field.set_text(text);
        }
    }

    pub fn field(&self, name: &str) -> Option<&TextField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut TextField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    pub fn get(&self, index: usize) -> Option<&TextField> {
        self.fields.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut TextField> {
        self.fields.get_mut(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TextField> {
        self.fields.iter()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Positions of the fields a user can type into
    pub fn editable_indices(&self) -> Vec<usize> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.editable)
            .map(|(i, _)| i)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_text(field: &mut TextField, text: &str) {
        for c in text.chars() {
            field.push_char(c);
        }
    }

    #[test]
    fn test_integer_field_rejects_non_digits() {
        let mut field = TextField::new("id", "Id", FieldKind::Integer);
        type_text(&mut field, "1a2-3");
        assert_eq!(field.text(), "123");
    }

    #[test]
    fn test_max_length() {
        let mut field = TextField::new("name", "Name", FieldKind::Text).max_length(5);
        assert!(field.push_char('a'));
        type_text(&mut field, "bcdefgh");
        assert_eq!(field.text(), "abcde");
        assert!(!field.push_char('x'));
    }

    #[test]
    fn test_decimal_field_single_separator() {
        let mut field = TextField::new("base_salary", "Salary", FieldKind::Decimal);
        type_text(&mut field, "12.5.0,x");
        assert_eq!(field.text(), "12.50");
    }

    #[test]
    fn test_date_field() {
        let mut field = TextField::new("birth_date", "Birth", FieldKind::Date);
        type_text(&mut field, "01/0a1/2000123");
        assert_eq!(field.text(), "01/01/2000");
    }

    #[test]
    fn test_read_only_field_ignores_typing() {
        let mut field = TextField::new("id", "Id", FieldKind::Integer).read_only();
        field.set_text("9");
        assert!(!field.push_char('1'));
        field.backspace();
        field.clear();
        assert_eq!(field.text(), "9");
    }

    #[test]
    fn test_set_text_skips_input_constraints() {
        let mut field = TextField::new("name", "Name", FieldKind::Text).max_length(3);
        field.set_text("Electronics");
        assert_eq!(field.text(), "Electronics");
    }

    #[test]
    fn test_form_fields_lookup() {
        let mut fields = FormFields::new(vec![
            TextField::new("id", "Id", FieldKind::Integer).read_only(),
            TextField::new("name", "Name", FieldKind::Text),
        ]);
        fields.set_text("name", "Books");
        fields.set_text("missing", "ignored");

        assert_eq!(fields.text("name"), "Books");
        assert_eq!(fields.text("missing"), "");
        assert_eq!(fields.editable_indices(), vec![1]);
        assert_eq!(fields.len(), 2);
    }
}
