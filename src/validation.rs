//! Per-endpoint request validators. Pure functions, no I/O: each one takes
//! the raw payload and returns every violation it finds, so a client sees
//! all problems in a single round trip.

use chrono::Datelike;
use serde_json::Value;
use validator::ValidateEmail;

use crate::models::{Category, Condition, ItemStatus, MemberType};

const VALID_CATEGORIES: &str = "TEXTBOOK, ELECTRONICS, FURNITURE, APPAREL, SPORTS";
const VALID_CONDITIONS: &str = "NEW, LIKE_NEW, GOOD, FAIR, POOR";
const VALID_UPDATE_STATUSES: &str = "AVAILABLE, RESERVED, SOLD";
const MAX_PRICE: f64 = 1_000_000.0;
const MAX_IMAGES: usize = 5;
const EDU_EMAIL_SUFFIX: &str = ".edu";

/// Prices arrive as JSON numbers or numeric strings; both are accepted.
pub fn parse_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn parse_enum<T: serde::de::DeserializeOwned>(value: &Value) -> Option<T> {
    value
        .as_str()
        .and_then(|s| serde_json::from_value(Value::String(s.to_string())).ok())
}

/// Item creation rules, applied to the normalized (snake_case) payload.
pub fn validate_item_create(payload: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    match payload.get("title").and_then(Value::as_str) {
        None => errors.push("Title is required".to_string()),
        Some(title) => {
            if title.trim().chars().count() < 2 {
                errors.push("Title must be at least 2 characters".to_string());
            } else if title.chars().count() > 200 {
                errors.push("Title must not exceed 200 characters".to_string());
            }
        }
    }

    if let Some(description) = payload.get("description").and_then(Value::as_str) {
        if description.chars().count() > 2000 {
            errors.push("Description must not exceed 2000 characters".to_string());
        }
    }

    if parse_enum::<Category>(payload.get("category").unwrap_or(&Value::Null)).is_none() {
        errors.push(format!("Category must be one of: {}", VALID_CATEGORIES));
    }

    match payload.get("price") {
        None | Some(Value::Null) => errors.push("Price is required".to_string()),
        Some(raw) => match parse_price(raw) {
            None => errors.push("Price must be a valid number".to_string()),
            Some(price) if price < 0.0 => errors.push("Price cannot be negative".to_string()),
            Some(price) if price > MAX_PRICE => {
                errors.push("Price must not exceed 1,000,000".to_string())
            }
            Some(_) => {}
        },
    }

    if parse_enum::<Condition>(payload.get("condition").unwrap_or(&Value::Null)).is_none() {
        errors.push(format!("Condition must be one of: {}", VALID_CONDITIONS));
    }

    errors.extend(validate_images(payload));
    errors
}

/// Item update rules: the same bounds, but every field is optional and the
/// status may only move among the live states (DELETED is reserved for the
/// delete operation).
pub fn validate_item_update(payload: &Value) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(raw) = payload.get("title") {
        match raw.as_str() {
            None => errors.push("Title must be a string".to_string()),
            Some(title) => {
                if title.trim().chars().count() < 2 {
                    errors.push("Title must be at least 2 characters".to_string());
                } else if title.chars().count() > 200 {
                    errors.push("Title must not exceed 200 characters".to_string());
                }
            }
        }
    }

    if let Some(description) = payload.get("description").and_then(Value::as_str) {
        if description.chars().count() > 2000 {
            errors.push("Description must not exceed 2000 characters".to_string());
        }
    }

    if let Some(raw) = payload.get("price") {
        match parse_price(raw) {
            None => errors.push("Price must be a valid number".to_string()),
            Some(price) if price < 0.0 => errors.push("Price cannot be negative".to_string()),
            Some(price) if price > MAX_PRICE => {
                errors.push("Price must not exceed 1,000,000".to_string())
            }
            Some(_) => {}
        }
    }

    if let Some(raw) = payload.get("condition") {
        if parse_enum::<Condition>(raw).is_none() {
            errors.push(format!("Condition must be one of: {}", VALID_CONDITIONS));
        }
    }

    if let Some(raw) = payload.get("status") {
        match parse_enum::<ItemStatus>(raw) {
            Some(status) if status != ItemStatus::Deleted => {}
            _ => errors.push(format!("Status must be one of: {}", VALID_UPDATE_STATUSES)),
        }
    }

    errors.extend(validate_images(payload));
    errors
}

fn validate_images(payload: &Value) -> Vec<String> {
    let mut errors = Vec::new();
    if let Some(raw) = payload.get("images") {
        match raw.as_array() {
            None => errors.push("Images must be an array".to_string()),
            Some(images) if images.len() > MAX_IMAGES => {
                errors.push("A maximum of 5 images is allowed".to_string())
            }
            Some(_) => {}
        }
    }
    errors
}

/// Registration rules. Self-registration is limited to STUDENT/ASSOCIATE,
/// both of which must supply a university (.edu) email.
pub fn validate_register(
    email: Option<&str>,
    password: Option<&str>,
    member_type: Option<&str>,
    name: Option<&str>,
) -> Vec<String> {
    let mut errors = Vec::new();

    match email {
        None | Some("") => errors.push("Email is required".to_string()),
        Some(email) => {
            if !email.validate_email() {
                errors.push("Invalid email format".to_string());
            } else if email.chars().count() > 255 {
                errors.push("Email must not exceed 255 characters".to_string());
            } else if !email.to_ascii_lowercase().ends_with(EDU_EMAIL_SUFFIX) {
                errors.push(
                    "Student and associate members must register with a university email (.edu domain)"
                        .to_string(),
                );
            }
        }
    }

    match password {
        None | Some("") => errors.push("Password is required".to_string()),
        Some(password) => {
            let len = password.chars().count();
            if !(8..=20).contains(&len) {
                errors.push("Password must be 8-20 characters".to_string());
            }
            let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
            let has_digit = password.chars().any(|c| c.is_ascii_digit());
            if !(has_letter && has_digit) {
                errors.push("Password must contain at least one letter and one number".to_string());
            }
        }
    }

    let parsed_type = member_type
        .and_then(|t| serde_json::from_value::<MemberType>(Value::String(t.to_string())).ok());
    match parsed_type {
        Some(MemberType::Student) | Some(MemberType::Associate) => {}
        _ => errors.push("Member type must be STUDENT or ASSOCIATE".to_string()),
    }

    if let Some(name) = name {
        if !name.is_empty() {
            if name.trim().chars().count() < 2 {
                errors.push("Name must be at least 2 characters".to_string());
            } else if name.chars().count() > 100 {
                errors.push("Name must not exceed 100 characters".to_string());
            }
        }
    }

    errors
}

/// Login checks presence only; format problems surface as the generic
/// invalid-credentials answer so the response never says which field was
/// wrong.
pub fn validate_login(email: Option<&str>, password: Option<&str>) -> Vec<String> {
    let mut errors = Vec::new();
    if email.map_or(true, |e| e.trim().is_empty()) {
        errors.push("Email is required".to_string());
    }
    if password.map_or(true, |p| p.trim().is_empty()) {
        errors.push("Password is required".to_string());
    }
    errors
}

/// Profile update rules. An empty name means "no change".
pub fn validate_profile_update(
    name: Option<&str>,
    bio: Option<&str>,
    university: Option<&str>,
    enrollment_year: Option<i32>,
) -> Vec<String> {
    let mut errors = Vec::new();

    if let Some(name) = name {
        let trimmed = name.trim();
        if !trimmed.is_empty() && trimmed.chars().count() < 2 {
            errors.push("Name must be at least 2 characters".to_string());
        } else if name.chars().count() > 100 {
            errors.push("Name must not exceed 100 characters".to_string());
        }
    }

    if let Some(bio) = bio {
        if bio.chars().count() > 500 {
            errors.push("Bio must not exceed 500 characters".to_string());
        }
    }

    if let Some(university) = university {
        if university.chars().count() > 200 {
            errors.push("University name must not exceed 200 characters".to_string());
        }
    }

    if let Some(year) = enrollment_year {
        let max_year = chrono::Utc::now().year() + 10;
        if year < 1900 || year > max_year {
            errors.push(format!(
                "Enrollment year must be between 1900 and {}",
                max_year
            ));
        }
    }

    errors
}
