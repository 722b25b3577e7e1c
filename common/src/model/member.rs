use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Maximum length, in characters, of the name and profession fields.
pub const MAX_NAME_LEN: usize = 32;
/// Maximum length, in characters, of the phone field.
pub const MAX_PHONE_LEN: usize = 9;

/// A club member as seen by the card pipeline.
///
/// The member store owns these records; within one generation call the
/// record is immutable. The email is the member's unique key (enforced
/// by the store, not here).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Member {
    pub first_name: String,
    pub last_name: String,
    /// Display name of the member's department.
    pub department: String,
    pub phone: String,
    pub email: String,
    pub profession: String,
    /// Optional portrait pasted onto the card front.
    pub photo: Option<PathBuf>,
}

impl Member {
    /// Applies the bounded-length contract. This is the single
    /// truncation point: callers apply it once at the boundary, and the
    /// pipeline below never mutates field data.
    pub fn truncated(mut self) -> Self {
        truncate_chars(&mut self.first_name, MAX_NAME_LEN);
        truncate_chars(&mut self.last_name, MAX_NAME_LEN);
        truncate_chars(&mut self.phone, MAX_PHONE_LEN);
        truncate_chars(&mut self.profession, MAX_NAME_LEN);
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Truncates to `max` characters on a char boundary.
fn truncate_chars(value: &mut String, max: usize) {
    if let Some((idx, _)) = value.char_indices().nth(max) {
        value.truncate(idx);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(first_name: &str, phone: &str) -> Member {
        Member {
            first_name: first_name.to_string(),
            last_name: "Doe".to_string(),
            department: "IT".to_string(),
            phone: phone.to_string(),
            email: "a@x.com".to_string(),
            profession: "Eng".to_string(),
            photo: None,
        }
    }

    #[test]
    fn truncated_applies_field_bounds() {
        let m = member(&"x".repeat(40), "123456789012").truncated();
        assert_eq!(m.first_name.chars().count(), MAX_NAME_LEN);
        assert_eq!(m.phone, "123456789");
    }

    #[test]
    fn truncated_respects_char_boundaries() {
        let m = member(&"é".repeat(40), "555").truncated();
        assert_eq!(m.first_name.chars().count(), MAX_NAME_LEN);
        assert_eq!(m.phone, "555");
    }

    #[test]
    fn truncated_leaves_short_fields_alone() {
        let m = member("Ana", "555123456").truncated();
        assert_eq!(m.first_name, "Ana");
        assert_eq!(m.phone, "555123456");
    }
}
