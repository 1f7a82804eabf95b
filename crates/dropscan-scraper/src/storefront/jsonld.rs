//! schema.org `Product` extraction from `<script type="application/ld+json">`.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

static SCRIPT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<script[^>]*type\s*=\s*["']application/ld\+json["'][^>]*>(.*?)</script>"#)
        .expect("valid regex")
});

static PRICE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("valid regex"));

/// A product found in a page's structured data, before validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCandidate {
    pub name: String,
    pub price: Option<f64>,
    pub image_url: Option<String>,
}

/// Collects every `Product` node in the page, in document order.
///
/// Top-level arrays, `@graph` containers, and `ItemList` wrappers are all
/// expanded. Script blocks that fail to parse as JSON are skipped.
#[must_use]
pub fn extract_products(html: &str) -> Vec<ProductCandidate> {
    let mut out = Vec::new();

    for cap in SCRIPT_RE.captures_iter(html) {
        let Some(json_text) = cap.get(1) else {
            continue;
        };
        let Ok(value) = serde_json::from_str::<Value>(json_text.as_str().trim()) else {
            continue;
        };
        collect(&value, &mut out);
    }

    out
}

fn collect(node: &Value, out: &mut Vec<ProductCandidate>) {
    match node {
        Value::Array(items) => {
            for item in items {
                collect(item, out);
            }
        }
        Value::Object(map) => {
            if let Some(graph) = map.get("@graph") {
                collect(graph, out);
            }
            if has_type(node, "ItemList") {
                if let Some(elements) = map.get("itemListElement").and_then(Value::as_array) {
                    for element in elements {
                        // ListItem wraps the product in `item`; some sites inline it.
                        collect(element.get("item").unwrap_or(element), out);
                    }
                }
            }
            if has_type(node, "Product") {
                if let Some(candidate) = to_candidate(node) {
                    out.push(candidate);
                }
            }
        }
        _ => {}
    }
}

/// `@type` may be a plain string or an array of strings.
fn has_type(node: &Value, wanted: &str) -> bool {
    match node.get("@type") {
        Some(Value::String(s)) => s.eq_ignore_ascii_case(wanted),
        Some(Value::Array(types)) => types
            .iter()
            .filter_map(Value::as_str)
            .any(|s| s.eq_ignore_ascii_case(wanted)),
        _ => false,
    }
}

fn to_candidate(node: &Value) -> Option<ProductCandidate> {
    let name = node.get("name")?.as_str()?.trim();
    if name.is_empty() {
        return None;
    }

    Some(ProductCandidate {
        name: name.to_owned(),
        price: node.get("offers").and_then(offer_price),
        image_url: node.get("image").and_then(image_url),
    })
}

fn offer_price(offers: &Value) -> Option<f64> {
    match offers {
        Value::Array(list) => list.iter().find_map(offer_price),
        Value::Object(map) => map
            .get("price")
            .or_else(|| map.get("lowPrice"))
            .and_then(parse_price),
        _ => None,
    }
}

fn image_url(image: &Value) -> Option<String> {
    match image {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_owned()),
        Value::Array(list) => list.iter().find_map(image_url),
        Value::Object(map) => map.get("url").and_then(image_url),
        _ => None,
    }
}

/// Reads a price from a JSON number or a display string such as `"$1,299.00"`.
#[must_use]
pub fn parse_price(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => parse_price_text(s),
        _ => None,
    }
}

pub(crate) fn parse_price_text(text: &str) -> Option<f64> {
    let m = PRICE_RE.find(text)?;
    m.as_str().replace(',', "").parse::<f64>().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(json: &str) -> String {
        format!(
            r#"<html><head><script type="application/ld+json">{json}</script></head><body></body></html>"#
        )
    }

    #[test]
    fn extracts_single_product_with_object_offer() {
        let html = page(
            r#"{"@context":"https://schema.org","@type":"Product","name":"Mini Projector",
                "image":"https://cdn.example.com/p.jpg",
                "offers":{"@type":"Offer","price":"49.99","priceCurrency":"USD"}}"#,
        );
        let products = extract_products(&html);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].name, "Mini Projector");
        assert_eq!(products[0].price, Some(49.99));
        assert_eq!(
            products[0].image_url.as_deref(),
            Some("https://cdn.example.com/p.jpg")
        );
    }

    #[test]
    fn expands_item_list_elements() {
        let html = page(
            r#"{"@type":"ItemList","itemListElement":[
                {"@type":"ListItem","position":1,"item":{"@type":"Product","name":"A","offers":{"price":10}}},
                {"@type":"ListItem","position":2,"item":{"@type":"Product","name":"B","offers":[{"lowPrice":"$1,299.50"}]}}
            ]}"#,
        );
        let products = extract_products(&html);
        assert_eq!(products.len(), 2);
        assert_eq!(products[0].price, Some(10.0));
        assert_eq!(products[1].price, Some(1299.5));
    }

    #[test]
    fn expands_graph_and_type_arrays() {
        let html = page(
            r#"{"@graph":[{"@type":"WebPage"},{"@type":["Product","Thing"],"name":"Lamp",
                "image":[{"url":"https://cdn.example.com/l.png"}]}]}"#,
        );
        let products = extract_products(&html);
        assert_eq!(products.len(), 1);
        assert_eq!(products[0].price, None);
        assert_eq!(
            products[0].image_url.as_deref(),
            Some("https://cdn.example.com/l.png")
        );
    }

    #[test]
    fn skips_malformed_blocks_and_nameless_products() {
        let html = format!(
            "{}{}",
            page("{not json"),
            page(r#"{"@type":"Product","name":"  ","offers":{"price":5}}"#)
        );
        assert!(extract_products(&html).is_empty());
    }

    #[test]
    fn price_text_ignores_currency_symbols() {
        assert_eq!(parse_price_text("USD 24.50"), Some(24.5));
        assert_eq!(parse_price_text("free"), None);
    }
}
