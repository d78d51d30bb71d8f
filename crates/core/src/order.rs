//! User-triggered ordering at a quoted price.

use std::sync::Arc;

use serde::Serialize;
use taxi_protocol::{OrderCommitResponse, ServiceLevel};
use tracing::{info, warn};

use crate::backend::{DraftOrder, TaxiBackend};
use crate::error::{FareError, OrderStage, Result};
use crate::price::Price;
use crate::store::SharedState;

/// A committed order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
	pub order_id: String,
	pub level: ServiceLevel,
	pub price: Price,
	pub confirmation: OrderCommitResponse,
}

pub struct OrderDesk {
	state: SharedState,
	backend: Arc<dyn TaxiBackend>,
}

impl OrderDesk {
	pub fn new(state: SharedState, backend: Arc<dyn TaxiBackend>) -> Self {
		Self { state, backend }
	}

	/// Drafts and commits an order using the live offer for `(level, price)`
	/// on the current route.
	///
	/// Fails if the offer has expired or no route is resolved. Backend
	/// failures are returned as is and never retried.
	pub async fn place_order(&self, level: ServiceLevel, price: Price) -> Result<OrderReceipt> {
		let order = {
			let state = self.state.lock();
			let offer = state.offer(level, price).cloned().ok_or(FareError::OfferUnavailable { level, price })?;
			let route = state.current_resolved_route().ok_or(FareError::NoActiveRoute)?;
			DraftOrder {
				level,
				offer,
				route: route.points.iter().map(|point| point.to_draft_point()).collect(),
			}
		};

		let draft = self.backend.create_order_draft(&order).await.map_err(|e| {
			warn!(target = "fare.order", %level, %price, error = %e, "order draft failed");
			FareError::order(OrderStage::Draft, e)
		})?;

		let confirmation = self.backend.commit_order(&draft.orderid).await.map_err(|e| {
			warn!(target = "fare.order", order_id = %draft.orderid, error = %e, "order commit failed");
			FareError::order(OrderStage::Commit, e)
		})?;

		info!(target = "fare.order", order_id = %draft.orderid, %level, %price, "order placed");
		Ok(OrderReceipt {
			order_id: draft.orderid,
			level,
			price,
			confirmation,
		})
	}
}
