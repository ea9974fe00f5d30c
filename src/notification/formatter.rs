//! Message templates - render intents into customer-facing text
//!
//! Texts mirror what the storefront has always sent; changing them is a
//! product decision, not a refactor.

use crate::notification::intent::{IntentKind, NotificationIntent};
use crate::order::{OrderItem, OrderStatus};

/// Fixed notification texts.
pub mod msg {
    pub const ORDER_CONFIRMED: &str =
        "✅ *Your order has been confirmed!* We'll begin preparing your food soon.";
    pub const ORDER_COOKING: &str =
        "🍳 *Your order is now being prepared!* We'll notify you once it's ready for delivery.";
    pub const ORDER_DELIVERED: &str =
        "🎉 *Thank you for your order!* We hope you enjoyed your meal. Come back soon!";
}

/// Render the item lines of an order summary, one bullet per item.
pub fn render_items(items: &[OrderItem]) -> String {
    let mut out = String::new();
    for item in items {
        out.push_str(&format!(
            "• {} (x{}) - ₹{}\n",
            item.name,
            item.quantity,
            format_price(item.price)
        ));
    }
    out
}

/// Whole rupee amounts print without a decimal point.
fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{}", price as i64)
    } else {
        format!("{price}")
    }
}

/// Fixed message for a notifiable status, `None` otherwise.
pub fn status_message(status: &OrderStatus) -> Option<&'static str> {
    match status {
        OrderStatus::Confirmed => Some(msg::ORDER_CONFIRMED),
        OrderStatus::Cooking => Some(msg::ORDER_COOKING),
        OrderStatus::Delivered => Some(msg::ORDER_DELIVERED),
        _ => None,
    }
}

/// Render an intent into the outbound message text.
///
/// Returns `None` for a status with no template; the classifier never
/// emits such an intent, so a `None` here means a caller bug upstream.
pub fn render(intent: &NotificationIntent) -> Option<String> {
    match &intent.kind {
        IntentKind::OrderCreated {
            customer_name,
            order_date,
            order_time,
            status,
        } => Some(format!(
            "🍽️ *New Order Received!*\n\n👤 *Customer:* {}\n📞 *Phone:* {}\n📅 *Date:* {}\n⏰ *Time:* {}\n\n🛒 *Items:*\n{}\n🚚 *Status:* {}",
            customer_name,
            intent.audience_phone,
            order_date,
            order_time,
            intent.rendered_items,
            status
        )),
        IntentKind::StatusChanged { to, .. } => status_message(to).map(str::to_string),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::OrderStatus;

    fn pizza() -> Vec<OrderItem> {
        vec![OrderItem {
            name: "Pizza".to_string(),
            quantity: 2,
            price: 400.0,
        }]
    }

    #[test]
    fn test_render_items_whole_price() {
        assert_eq!(render_items(&pizza()), "• Pizza (x2) - ₹400\n");
    }

    #[test]
    fn test_render_items_fractional_price() {
        let items = vec![OrderItem {
            name: "Chai".to_string(),
            quantity: 1,
            price: 24.5,
        }];
        assert_eq!(render_items(&items), "• Chai (x1) - ₹24.5\n");
    }

    #[test]
    fn test_render_items_multiple() {
        let mut items = pizza();
        items.push(OrderItem {
            name: "Garlic Bread".to_string(),
            quantity: 1,
            price: 120.0,
        });
        let rendered = render_items(&items);
        assert_eq!(
            rendered,
            "• Pizza (x2) - ₹400\n• Garlic Bread (x1) - ₹120\n"
        );
    }

    #[test]
    fn test_status_messages() {
        assert_eq!(
            status_message(&OrderStatus::Confirmed),
            Some(msg::ORDER_CONFIRMED)
        );
        assert_eq!(
            status_message(&OrderStatus::Cooking),
            Some(msg::ORDER_COOKING)
        );
        assert_eq!(
            status_message(&OrderStatus::Delivered),
            Some(msg::ORDER_DELIVERED)
        );
        assert_eq!(status_message(&OrderStatus::New), None);
        assert_eq!(
            status_message(&OrderStatus::Other("refunded".to_string())),
            None
        );
    }

    #[test]
    fn test_render_order_created() {
        let intent = NotificationIntent {
            order_key: "K1".to_string(),
            audience_phone: "9876543210".to_string(),
            kind: IntentKind::OrderCreated {
                customer_name: "Asha".to_string(),
                order_date: "2026-08-26".to_string(),
                order_time: "19:30".to_string(),
                status: OrderStatus::New,
            },
            rendered_items: render_items(&pizza()),
            record_timestamp: 100,
        };

        let text = render(&intent).unwrap();
        assert!(text.starts_with("🍽️ *New Order Received!*"));
        assert!(text.contains("👤 *Customer:* Asha"));
        assert!(text.contains("📞 *Phone:* 9876543210"));
        assert!(text.contains("🛒 *Items:*\n• Pizza (x2) - ₹400\n"));
        assert!(text.contains("🚚 *Status:* new"));
    }

    #[test]
    fn test_render_status_changed() {
        let intent = NotificationIntent {
            order_key: "K1".to_string(),
            audience_phone: "9876543210".to_string(),
            kind: IntentKind::StatusChanged {
                from: Some(OrderStatus::New),
                to: OrderStatus::Confirmed,
            },
            rendered_items: String::new(),
            record_timestamp: 101,
        };

        assert_eq!(render(&intent).unwrap(), msg::ORDER_CONFIRMED);
    }

    #[test]
    fn test_render_unrecognized_status_has_no_template() {
        let intent = NotificationIntent {
            order_key: "K1".to_string(),
            audience_phone: "9876543210".to_string(),
            kind: IntentKind::StatusChanged {
                from: None,
                to: OrderStatus::Other("refunded".to_string()),
            },
            rendered_items: String::new(),
            record_timestamp: 102,
        };

        assert!(render(&intent).is_none());
    }
}
