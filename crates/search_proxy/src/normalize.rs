//! Turns whatever the upstream search service returns into [`Listing`]s.

use serde_json::{Map, Value};
use shared::protocol::Listing;
use tracing::warn;

pub const PLACEHOLDER_IMAGE: &str = "https://via.placeholder.com/400";
const DEFAULT_NAME: &str = "Product";
const DEFAULT_DESCRIPTION: &str = "No description available";
const DEFAULT_PRICE: &str = "$0.00";
const DEFAULT_CATEGORY: &str = "Uncategorized";

// Keys that get a normalized value; everything else is passed through.
// Normalized values win over raw upstream ones, unlike the old proxy which
// let raw fields overwrite them (a numeric price stayed numeric).
const NORMALIZED_KEYS: [&str; 10] = [
    "id",
    "name",
    "description",
    "image",
    "price",
    "rating",
    "category",
    "reviewsCount",
    "attributes",
    "abv",
];

/// Finds the product list in `payload` and normalizes every entry.
/// Unrecognized shapes yield an empty list.
pub fn normalize_listings(payload: &Value) -> Vec<Listing> {
    let Some(items) = find_items(payload) else {
        warn!(
            shape = shape_of(payload),
            "could not find a usable list in upstream response"
        );
        return Vec::new();
    };

    items
        .iter()
        .enumerate()
        .map(|(index, item)| normalize_item(item, index))
        .collect()
}

fn find_items(payload: &Value) -> Option<&Vec<Value>> {
    if payload.get("status").and_then(Value::as_str) == Some("success") {
        if let Some(data) = payload.get("data").and_then(Value::as_array) {
            return Some(data);
        }
    }
    if let Some(items) = payload.as_array() {
        return Some(items);
    }
    ["results", "products"]
        .iter()
        .find_map(|key| payload.get(*key).and_then(Value::as_array))
}

pub fn normalize_item(item: &Value, index: usize) -> Listing {
    let empty = Map::new();
    let fields = item.as_object().unwrap_or(&empty);
    let reviews = fields
        .get("reviews")
        .and_then(Value::as_array)
        .filter(|reviews| !reviews.is_empty());

    let extra = fields
        .iter()
        .filter(|(key, _)| !NORMALIZED_KEYS.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    Listing {
        id: text(fields, "id").unwrap_or_else(|| format!("item-{index}")),
        name: text(fields, "name")
            .or_else(|| text(fields, "title"))
            .unwrap_or_else(|| DEFAULT_NAME.to_string()),
        description: text(fields, "description")
            .unwrap_or_else(|| DEFAULT_DESCRIPTION.to_string()),
        image: image(fields),
        price: price(fields.get("price")),
        rating: match reviews {
            Some(reviews) => average_rating(reviews),
            None => fields.get("rating").and_then(number).unwrap_or(0.0),
        },
        category: text(fields, "category").unwrap_or_else(|| DEFAULT_CATEGORY.to_string()),
        reviews_count: fields
            .get("reviews")
            .and_then(Value::as_array)
            .map_or(0, Vec::len),
        attributes: fields
            .get("attributes")
            .filter(|value| truthy(value))
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())),
        abv: text(fields, "abv"),
        extra,
    }
}

fn image(fields: &Map<String, Value>) -> String {
    if let Some(first) = fields
        .get("images")
        .and_then(Value::as_array)
        .and_then(|images| images.first())
        .and_then(Value::as_str)
    {
        return first.to_string();
    }
    ["image", "imageUrl", "image_url", "img"]
        .iter()
        .find_map(|key| text(fields, key))
        .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string())
}

fn price(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(amount)) => format!("${:.2}", amount.as_f64().unwrap_or(0.0)),
        Some(value) if truthy(value) => scalar_text(value).unwrap_or_else(|| DEFAULT_PRICE.to_string()),
        _ => DEFAULT_PRICE.to_string(),
    }
}

fn average_rating(reviews: &[Value]) -> f64 {
    let total: f64 = reviews
        .iter()
        .map(|review| review.get("rating").and_then(number).unwrap_or(0.0))
        .sum();
    total / reviews.len() as f64
}

/// Falsy values (null, false, 0, "") count as absent.
fn truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

fn text(fields: &Map<String, Value>, key: &str) -> Option<String> {
    fields
        .get(key)
        .filter(|value| truthy(value))
        .and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    if !truthy(value) {
        return None;
    }
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

fn shape_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_envelope_fills_defaults() {
        let listings = normalize_listings(&json!({
            "status": "success",
            "data": [{ "name": "X" }]
        }));

        assert_eq!(listings.len(), 1);
        let item = &listings[0];
        assert_eq!(item.id, "item-0");
        assert_eq!(item.name, "X");
        assert_eq!(item.description, "No description available");
        assert_eq!(item.image, "https://via.placeholder.com/400");
        assert_eq!(item.price, "$0.00");
        assert_eq!(item.rating, 0.0);
        assert_eq!(item.category, "Uncategorized");
        assert_eq!(item.reviews_count, 0);
        assert_eq!(item.attributes, json!({}));
        assert_eq!(item.abv, None);
        assert!(item.extra.is_empty());
    }

    #[test]
    fn bare_array_uses_fallback_fields_and_review_average() {
        let listings = normalize_listings(&json!([
            {
                "id": 42,
                "title": "Running Shoe",
                "images": ["https://img.example/shoe-1.jpg", "https://img.example/shoe-2.jpg"],
                "image": "https://img.example/ignored.jpg",
                "price": 59.5,
                "rating": 1,
                "reviews": [{ "rating": 4 }, { "rating": 5 }, { "comment": "no score" }],
                "brand": "Acme"
            },
            { "name": "", "imageUrl": "https://img.example/u.jpg", "price": "€5", "rating": 3.5 }
        ]));

        assert_eq!(listings.len(), 2);
        let shoe = &listings[0];
        assert_eq!(shoe.id, "42");
        assert_eq!(shoe.name, "Running Shoe");
        assert_eq!(shoe.image, "https://img.example/shoe-1.jpg");
        assert_eq!(shoe.price, "$59.50");
        assert_eq!(shoe.rating, 3.0);
        assert_eq!(shoe.reviews_count, 3);
        assert_eq!(shoe.extra.get("brand"), Some(&json!("Acme")));
        assert_eq!(shoe.extra.get("title"), Some(&json!("Running Shoe")));
        assert!(shoe.extra.get("image").is_none());

        let second = &listings[1];
        assert_eq!(second.id, "item-1");
        assert_eq!(second.name, "Product");
        assert_eq!(second.image, "https://img.example/u.jpg");
        assert_eq!(second.price, "€5");
        assert_eq!(second.rating, 3.5);
    }

    #[test]
    fn results_and_products_keys_are_recognized() {
        let from_results = normalize_listings(&json!({ "results": [{ "name": "A" }] }));
        assert_eq!(from_results[0].name, "A");

        let from_products = normalize_listings(&json!({
            "products": [{ "name": "B", "category": "Watches", "abv": "4.5%" }]
        }));
        assert_eq!(from_products[0].category, "Watches");
        assert_eq!(from_products[0].abv.as_deref(), Some("4.5%"));
    }

    #[test]
    fn unrecognized_shapes_normalize_to_empty() {
        assert!(normalize_listings(&json!({ "data": [{ "name": "X" }] })).is_empty());
        assert!(normalize_listings(&json!({ "status": "error", "data": [] })).is_empty());
        assert!(normalize_listings(&json!({ "items": "nope" })).is_empty());
        assert!(normalize_listings(&json!("just text")).is_empty());
        assert!(normalize_listings(&Value::Null).is_empty());
    }

    #[test]
    fn non_object_items_get_all_defaults() {
        let listings = normalize_listings(&json!(["stray", null]));
        assert_eq!(listings[0].id, "item-0");
        assert_eq!(listings[1].id, "item-1");
        assert_eq!(listings[1].name, "Product");
    }

    #[test]
    fn zero_price_and_empty_attributes_fall_back() {
        let item = normalize_item(&json!({ "price": 0, "attributes": null }), 3);
        assert_eq!(item.price, "$0.00");
        assert_eq!(item.attributes, json!({}));

        let item = normalize_item(&json!({ "attributes": { "size": "M" } }), 0);
        assert_eq!(item.attributes, json!({ "size": "M" }));
    }
}
