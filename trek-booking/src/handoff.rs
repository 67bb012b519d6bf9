use std::sync::Arc;
use tracing::{error, info, warn};
use trek_catalog::pricing::CHILD_FARE_RATIO;
use trek_core::{CartBoundary, CartError, CheckoutBoundary, LineItem, LineItemKind};

use crate::flow::{BookingFlow, Reservation};

/// What to do once the line items are in the cart
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandoffIntent {
    /// Stay on the page
    Cart,
    /// Go straight to checkout
    Checkout,
}

#[derive(Debug, Clone, PartialEq)]
pub struct HandoffReceipt {
    pub items: Vec<LineItem>,
    pub entered_checkout: bool,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum HandoffError {
    #[error("Reservation is not ready for handoff")]
    NotReady,

    #[error("Cart rejected the reservation: {0}")]
    Cart(CartError),

    /// The tour line went in, the add-on line did not. The emitted item stays
    /// in the cart.
    #[error("Add-on could not be added after the tour was: {source}")]
    PartialEmission { emitted: Box<LineItem>, source: CartError },

    #[error("Could not enter checkout: {0}")]
    Checkout(CartError),
}

/// Hands finished reservations to the cart and checkout boundaries.
///
/// Emission is two independent appends, tour first. There is no rollback:
/// an add-on failure leaves the tour line in the cart.
#[derive(Clone)]
pub struct ReservationHandoff {
    cart: Arc<dyn CartBoundary>,
    checkout: Arc<dyn CheckoutBoundary>,
}

impl ReservationHandoff {
    pub fn new(cart: Arc<dyn CartBoundary>, checkout: Arc<dyn CheckoutBoundary>) -> Self {
        Self { cart, checkout }
    }

    /// Confirm the flow and emit its reservation. The flow is closed and its
    /// draft consumed before anything is sent, whatever the outcome.
    pub async fn submit(
        &self,
        flow: &mut BookingFlow,
        intent: HandoffIntent,
    ) -> Result<HandoffReceipt, HandoffError> {
        let reservation = flow.confirm().ok_or(HandoffError::NotReady)?;
        self.emit(reservation, intent).await
    }

    pub async fn emit(
        &self,
        reservation: Reservation,
        intent: HandoffIntent,
    ) -> Result<HandoffReceipt, HandoffError> {
        let (tour, add_on) = line_items(&reservation).ok_or(HandoffError::NotReady)?;

        self.cart.add_line_item(&tour).await.map_err(|e| {
            error!("Cart rejected tour {}: {}", tour.item_id, e);
            HandoffError::Cart(e)
        })?;
        let mut items = vec![tour];

        if let Some(add_on) = add_on {
            if let Err(e) = self.cart.add_line_item(&add_on).await {
                warn!("Add-on {} not added, tour line already in cart: {}", add_on.item_id, e);
                let emitted = items.remove(0);
                return Err(HandoffError::PartialEmission {
                    emitted: Box::new(emitted),
                    source: e,
                });
            }
            items.push(add_on);
        }

        let entered_checkout = match intent {
            HandoffIntent::Cart => false,
            HandoffIntent::Checkout => {
                self.checkout.enter_checkout().await.map_err(HandoffError::Checkout)?;
                true
            }
        };

        info!(
            "Handed off {} line items for {} (checkout: {})",
            items.len(),
            reservation.resource.id,
            entered_checkout
        );
        Ok(HandoffReceipt { items, entered_checkout })
    }
}

/// Tour line plus the add-on line when one is selected. `None` when the
/// reservation has no start time, or its add-on is missing from the catalog
/// or does not run at the chosen time.
pub fn line_items(reservation: &Reservation) -> Option<(LineItem, Option<LineItem>)> {
    let draft = &reservation.draft;
    let time = draft.time()?;
    let fare = reservation.resource.effective_fare();

    let tour = LineItem {
        kind: LineItemKind::Tour,
        item_id: reservation.resource.id.to_string(),
        title: reservation.resource.title.clone(),
        unit_fare: fare,
        child_unit_fare: Some(fare * CHILD_FARE_RATIO),
        adults: draft.adults(),
        children: draft.children(),
        date: draft.date(),
        time: Some(time),
    };

    let add_on = match draft.add_on() {
        Some(selection) => {
            let add_on = reservation.add_ons.resolve(selection).ok()?;
            Some(LineItem {
                kind: LineItemKind::AddOn,
                item_id: add_on.id.clone(),
                title: add_on.title.clone(),
                unit_fare: add_on.fare,
                child_unit_fare: None,
                adults: draft.adults(),
                children: 0,
                date: draft.date(),
                time: Some(selection.time),
            })
        }
        None => None,
    };

    Some((tour, add_on))
}
