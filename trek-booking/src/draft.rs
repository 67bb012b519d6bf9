use chrono::{NaiveDate, NaiveTime};
use serde::Serialize;
use trek_catalog::AddOnSelection;

/// Mutations a user can make while composing a reservation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DraftAction {
    SelectDate(NaiveDate),
    SelectTime(NaiveTime),
    IncrementAdults,
    DecrementAdults,
    IncrementChildren,
    DecrementChildren,
    /// Choose an add-on together with its start time
    SelectAddOn { id: String, time: NaiveTime },
    ClearAddOn,
}

/// The reservation being composed.
///
/// Values are immutable: every mutation returns a new draft. Adults never
/// drop below one and an add-on is always held with its start time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookingDraft {
    date: NaiveDate,
    #[serde(with = "trek_shared::time::option")]
    time: Option<NaiveTime>,
    adults: u32,
    children: u32,
    add_on: Option<AddOnSelection>,
}

impl BookingDraft {
    pub const MIN_ADULTS: u32 = 1;

    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            time: None,
            adults: Self::MIN_ADULTS,
            children: 0,
            add_on: None,
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn time(&self) -> Option<NaiveTime> {
        self.time
    }

    pub fn adults(&self) -> u32 {
        self.adults
    }

    pub fn children(&self) -> u32 {
        self.children
    }

    pub fn guests(&self) -> u32 {
        self.adults.saturating_add(self.children)
    }

    pub fn add_on(&self) -> Option<&AddOnSelection> {
        self.add_on.as_ref()
    }

    pub fn add_on_id(&self) -> Option<&str> {
        self.add_on.as_ref().map(|a| a.id.as_str())
    }

    /// Picking another day invalidates the chosen start time
    pub fn with_date(&self, date: NaiveDate) -> Self {
        let mut next = self.clone();
        if next.date != date {
            next.time = None;
        }
        next.date = date;
        next
    }

    pub fn with_time(&self, time: NaiveTime) -> Self {
        Self {
            time: Some(time),
            ..self.clone()
        }
    }

    pub fn without_time(&self) -> Self {
        Self {
            time: None,
            ..self.clone()
        }
    }

    pub fn with_adults(&self, adults: u32) -> Self {
        Self {
            adults: adults.max(Self::MIN_ADULTS),
            ..self.clone()
        }
    }

    pub fn with_children(&self, children: u32) -> Self {
        Self {
            children,
            ..self.clone()
        }
    }

    /// Replaces any previous add-on and its time
    pub fn with_add_on(&self, selection: AddOnSelection) -> Self {
        Self {
            add_on: Some(selection),
            ..self.clone()
        }
    }

    pub fn without_add_on(&self) -> Self {
        Self {
            add_on: None,
            ..self.clone()
        }
    }

    /// Pure reducer. Availability and catalog checks happen in the flow
    /// before an action reaches the draft.
    pub fn apply(&self, action: &DraftAction) -> Self {
        match action {
            DraftAction::SelectDate(date) => self.with_date(*date),
            DraftAction::SelectTime(time) => self.with_time(*time),
            DraftAction::IncrementAdults => self.with_adults(self.adults.saturating_add(1)),
            DraftAction::DecrementAdults => self.with_adults(self.adults.saturating_sub(1)),
            DraftAction::IncrementChildren => self.with_children(self.children.saturating_add(1)),
            DraftAction::DecrementChildren => self.with_children(self.children.saturating_sub(1)),
            DraftAction::SelectAddOn { id, time } => self.with_add_on(AddOnSelection::new(id, *time)),
            DraftAction::ClearAddOn => self.without_add_on(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 20).unwrap()
    }

    fn time(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn test_adults_never_drop_below_one() {
        let draft = BookingDraft::new(today());
        assert_eq!(draft.adults(), 1);

        let draft = draft.apply(&DraftAction::DecrementAdults);
        assert_eq!(draft.adults(), 1);

        let draft = draft.apply(&DraftAction::IncrementAdults).apply(&DraftAction::DecrementAdults);
        assert_eq!(draft.adults(), 1);
        assert_eq!(draft.with_adults(0).adults(), 1);
    }

    #[test]
    fn test_children_floor_at_zero() {
        let draft = BookingDraft::new(today()).apply(&DraftAction::DecrementChildren);
        assert_eq!(draft.children(), 0);
        assert_eq!(draft.apply(&DraftAction::IncrementChildren).children(), 1);
    }

    #[test]
    fn test_mutation_returns_new_value() {
        let draft = BookingDraft::new(today());
        let next = draft.apply(&DraftAction::IncrementAdults);

        assert_eq!(draft.adults(), 1);
        assert_eq!(next.adults(), 2);
    }

    #[test]
    fn test_changing_date_clears_time() {
        let draft = BookingDraft::new(today()).with_time(time(9, 0));

        let same_day = draft.with_date(today());
        assert_eq!(same_day.time(), Some(time(9, 0)));

        let other_day = draft.with_date(today().succ_opt().unwrap());
        assert_eq!(other_day.time(), None);
    }

    #[test]
    fn test_add_on_id_and_time_change_together() {
        let draft = BookingDraft::new(today()).apply(&DraftAction::SelectAddOn {
            id: "sunset-cruise".to_string(),
            time: time(17, 0),
        });
        assert_eq!(draft.add_on(), Some(&AddOnSelection::new("sunset-cruise", time(17, 0))));

        let switched = draft.apply(&DraftAction::SelectAddOn {
            id: "food-tasting".to_string(),
            time: time(11, 30),
        });
        assert_eq!(switched.add_on_id(), Some("food-tasting"));
        assert_eq!(switched.add_on().unwrap().time, time(11, 30));

        let cleared = switched.apply(&DraftAction::ClearAddOn);
        assert!(cleared.add_on().is_none());
        assert!(cleared.add_on_id().is_none());
    }

    #[test]
    fn test_guests_saturate() {
        let draft = BookingDraft::new(today()).with_adults(u32::MAX).with_children(1);
        assert_eq!(draft.guests(), u32::MAX);
    }

    #[test]
    fn test_serializes_wire_times() {
        let draft = BookingDraft::new(today())
            .with_time(time(9, 30))
            .with_add_on(AddOnSelection::new("food-tasting", time(11, 30)));
        let json = serde_json::to_value(&draft).unwrap();

        assert_eq!(json["date"], "2026-10-20");
        assert_eq!(json["time"], "09:30");
        assert_eq!(json["add_on"]["time"], "11:30");
    }
}
