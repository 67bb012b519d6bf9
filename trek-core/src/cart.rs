use chrono::{NaiveDate, NaiveTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineItemKind {
    Tour,
    AddOn,
}

/// A priced unit handed to the cart: the tour itself or one add-on
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LineItem {
    pub kind: LineItemKind,
    /// Resource id for tours, catalog key for add-ons
    pub item_id: String,
    pub title: String,
    /// Fare per adult
    pub unit_fare: Decimal,
    /// Fare per child; add-ons are never sold per child
    pub child_unit_fare: Option<Decimal>,
    pub adults: u32,
    pub children: u32,
    pub date: NaiveDate,
    #[serde(with = "trek_shared::time::option")]
    pub time: Option<NaiveTime>,
}

impl LineItem {
    pub fn amount(&self) -> Decimal {
        let adult_line = self.unit_fare * Decimal::from(self.adults);
        let child_line = self
            .child_unit_fare
            .map(|fare| fare * Decimal::from(self.children))
            .unwrap_or(Decimal::ZERO);
        adult_line + child_line
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_line_item_amount() {
        let item = LineItem {
            kind: LineItemKind::Tour,
            item_id: "tour-1".to_string(),
            title: "Old Town Walk".to_string(),
            unit_fare: dec!(100),
            child_unit_fare: Some(dec!(50)),
            adults: 2,
            children: 1,
            date: NaiveDate::from_ymd_opt(2026, 10, 20).unwrap(),
            time: NaiveTime::from_hms_opt(9, 0, 0),
        };
        assert_eq!(item.amount(), dec!(250));

        let json = serde_json::to_value(&item).unwrap();
        assert_eq!(json["kind"], "TOUR");
        assert_eq!(json["date"], "2026-10-20");
        assert_eq!(json["time"], "09:00");
    }
}
