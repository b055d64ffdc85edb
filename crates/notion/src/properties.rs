//! Mapping from a [`Payout`] to Notion page properties.
//!
//! The target Notion database has a fixed schema of seven properties; the
//! shapes below match Notion's page-property JSON (`number`, `rich_text`,
//! `select`, `date`).

use royalty_core::payout::Payout;
use serde::Serialize;
use serde_json::Number;

/// A single Notion property value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PropertyValue {
    /// `None` serializes as `null` (absent or non-finite number).
    Number(Option<Number>),
    RichText(Vec<RichText>),
    Select(SelectOption),
    Date(DateValue),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RichText {
    pub text: TextContent,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextContent {
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectOption {
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DateValue {
    pub start: Option<String>,
}

/// Properties of the page mirroring one payout.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PayoutProperties {
    #[serde(rename = "Sale ID")]
    pub sale_id: PropertyValue,
    #[serde(rename = "Recipient Role")]
    pub recipient_role: PropertyValue,
    #[serde(rename = "Recipient ID")]
    pub recipient_id: PropertyValue,
    #[serde(rename = "Pct")]
    pub pct: PropertyValue,
    #[serde(rename = "Amount")]
    pub amount: PropertyValue,
    #[serde(rename = "Status")]
    pub status: PropertyValue,
    #[serde(rename = "Created At")]
    pub created_at: PropertyValue,
}

/// Build the page properties for a payout. Total: never fails.
///
/// Missing text fields become empty strings; NaN amounts become `null`.
pub fn payout_properties(payout: &Payout) -> PayoutProperties {
    PayoutProperties {
        sale_id: PropertyValue::Number(payout.sale_id.and_then(number_from_f64)),
        recipient_role: rich_text(payout.recipient_role.as_deref().unwrap_or_default()),
        recipient_id: rich_text(payout.recipient_id.as_deref().unwrap_or_default()),
        pct: PropertyValue::Number(number_from_f64(payout.pct)),
        amount: PropertyValue::Number(number_from_f64(payout.amount)),
        status: PropertyValue::Select(SelectOption {
            name: payout.status.as_str().to_string(),
        }),
        created_at: PropertyValue::Date(DateValue {
            start: payout.created_at.clone(),
        }),
    }
}

fn rich_text(content: &str) -> PropertyValue {
    PropertyValue::RichText(vec![RichText {
        text: TextContent {
            content: content.to_string(),
        },
    }])
}

/// Whole values are emitted as integers (`50`, not `50.0`).
fn number_from_f64(value: f64) -> Option<Number> {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        Some(Number::from(value as i64))
    } else {
        Number::from_f64(value)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::*;

    fn payout(value: Value) -> Payout {
        Payout::from_json(value).unwrap()
    }

    #[test]
    fn maps_example_payout() {
        let props = payout_properties(&payout(json!({
            "id": 5,
            "sale_id": 10,
            "pct": "0.1",
            "amount": "50",
            "status": "queued",
            "created_at": "2024-01-01",
        })));
        let json = serde_json::to_value(&props).unwrap();

        assert_eq!(
            json,
            json!({
                "Sale ID": {"number": 10},
                "Recipient Role": {"rich_text": [{"text": {"content": ""}}]},
                "Recipient ID": {"rich_text": [{"text": {"content": ""}}]},
                "Pct": {"number": 0.1},
                "Amount": {"number": 50},
                "Status": {"select": {"name": "queued"}},
                "Created At": {"date": {"start": "2024-01-01"}},
            })
        );
    }

    #[test]
    fn exactly_seven_keys_with_numeric_pct_and_amount() {
        let props = payout_properties(&payout(json!({
            "id": 1,
            "sale_id": 3,
            "recipient_role": "artist",
            "recipient_id": "user_42",
            "pct": 0.35,
            "amount": 17.5,
            "status": "queued",
            "created_at": "2024-06-01T12:00:00Z",
        })));
        let json = serde_json::to_value(&props).unwrap();
        let object = json.as_object().unwrap();

        assert_eq!(object.len(), 7);
        assert!(object["Pct"]["number"].is_number());
        assert!(object["Amount"]["number"].is_number());
        assert_eq!(
            object["Recipient Role"]["rich_text"][0]["text"]["content"],
            "artist"
        );
        assert_eq!(object["Recipient ID"]["rich_text"][0]["text"]["content"], "user_42");
    }

    #[test]
    fn malformed_numbers_serialize_as_null() {
        let props = payout_properties(&payout(json!({
            "id": 2,
            "pct": "n/a",
            "amount": "oops",
            "status": "queued",
        })));
        let json = serde_json::to_value(&props).unwrap();

        assert!(json["Pct"]["number"].is_null());
        assert!(json["Amount"]["number"].is_null());
        assert!(json["Sale ID"]["number"].is_null());
        assert!(json["Created At"]["date"]["start"].is_null());
    }

    #[test]
    fn loosely_typed_sale_id_and_recipient_map() {
        for sale_id in [json!("10"), json!(10.0), json!(10)] {
            let props = payout_properties(&payout(json!({
                "id": 4,
                "sale_id": sale_id,
                "recipient_id": 42,
                "pct": 0.1,
                "amount": 5,
                "status": "queued",
            })));
            let json = serde_json::to_value(&props).unwrap();

            assert_eq!(json["Sale ID"], json!({"number": 10}));
            assert_eq!(json["Recipient ID"]["rich_text"][0]["text"]["content"], "42");
        }
    }

    #[test]
    fn whole_floats_render_as_integers() {
        assert_eq!(number_from_f64(50.0), Some(Number::from(50)));
        assert_eq!(number_from_f64(-3.0), Some(Number::from(-3)));
        assert_eq!(number_from_f64(0.5), Number::from_f64(0.5));
        assert_eq!(number_from_f64(f64::INFINITY), None);
    }
}
