use serde_json::{Map, Value};

/// Convert a snake_case key to camelCase.
pub fn to_camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '_' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Convert a camelCase key to snake_case.
pub fn to_snake_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len() + 4);
    for c in key.chars() {
        if c.is_ascii_uppercase() {
            out.push('_');
            out.extend(c.to_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

/// Recursively convert all object keys to camelCase.
pub fn convert_keys_to_camel_case(value: Value) -> Value {
    convert_keys(value, &to_camel_case)
}

/// Recursively convert all object keys to snake_case.
pub fn convert_keys_to_snake_case(value: Value) -> Value {
    convert_keys(value, &to_snake_case)
}

fn convert_keys(value: Value, convert: &dyn Fn(&str) -> String) -> Value {
    match value {
        Value::Object(map) => {
            let converted: Map<String, Value> = map
                .into_iter()
                .map(|(k, v)| (convert(&k), convert_keys(v, convert)))
                .collect();
            Value::Object(converted)
        }
        Value::Array(items) => Value::Array(
            items
                .into_iter()
                .map(|v| convert_keys(v, convert))
                .collect(),
        ),
        other => other,
    }
}

/// Parse the stored image list (serialized JSON array of URLs).
/// Malformed or absent data degrades to an empty list.
pub fn parse_image_list(raw: Option<&str>) -> Vec<String> {
    let raw = match raw {
        Some(s) => s,
        None => return Vec::new(),
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(images) => images,
        Err(_) => Vec::new(),
    }
}

/// Client-side aliases for category fields. Clients may send either the
/// short name or the fully-qualified one; both map to the canonical column.
const ITEM_FIELD_ALIASES: &[(&str, &str)] = &[
    ("courseCode", "course_code"),
    ("moduleName", "module_name"),
    ("model", "model_number"),
    ("modelNumber", "model_number"),
    ("warrantyStatus", "warranty_status"),
    ("purchaseDate", "original_purchase_date"),
    ("originalPurchaseDate", "original_purchase_date"),
    ("accessories", "accessories_included"),
    ("accessoriesIncluded", "accessories_included"),
    ("itemType", "item_type"),
    ("assemblyRequired", "assembly_required"),
    ("conditionDetails", "condition_details"),
    ("clothingBrand", "clothing_brand"),
    ("materialType", "material_type"),
    ("sportsBrand", "sports_brand"),
    ("sizeDimensions", "size_dimensions"),
    ("sportType", "sport_type"),
    ("sportsConditionDetails", "sports_condition_details"),
];

/// Normalize an inbound item payload: resolve known aliases to canonical
/// column names, then snake_case every remaining key. Unknown fields pass
/// through unchanged.
pub fn normalize_item_payload(value: Value) -> Value {
    let map = match value {
        Value::Object(map) => map,
        other => return other,
    };

    let mut normalized = Map::with_capacity(map.len());
    for (key, val) in map {
        let canonical = ITEM_FIELD_ALIASES
            .iter()
            .find(|(alias, _)| *alias == key)
            .map(|(_, column)| column.to_string())
            .unwrap_or_else(|| to_snake_case(&key));
        normalized.insert(canonical, val);
    }
    Value::Object(normalized)
}
