//! `reqwest` implementation of [`TaxiBackend`].

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue, ORIGIN, REFERER};
use serde::Serialize;
use serde::de::DeserializeOwned;
use taxi_protocol::{
	FinalizeRequest, FinalizeResponse, FinalizedAddress, GeoPoint, OrderCommitRequest, OrderCommitResponse, OrderDraftRequest, OrderDraftResponse, Payment,
	Requirements, RouteStatsRequest, RouteStatsResponse, ServiceLevel, SuggestCandidate, SuggestRequest, SuggestResponse,
};
use tracing::debug;

use super::{DraftOrder, TaxiBackend};
use crate::config::BackendConfig;
use crate::error::{FareError, Result};
use crate::host::{CredentialSource, SessionCredentials};

const SUGGEST: &str = "/4.0/persuggest/v1/suggest";
const FINALIZE: &str = "/4.0/persuggest/v1/finalsuggest";
const ROUTESTATS: &str = "/3.0/routestats";
const ORDER_DRAFT: &str = "/external/3.0/orderdraft";
const ORDER_COMMIT: &str = "/external/3.0/ordercommit";

const USER_ID_HEADER: &str = "X-Yataxi-Userid";
const CSRF_HEADER: &str = "X-Csrf-Token";

/// HTTP client for the backend's JSON endpoints.
///
/// Credentials are fetched from the [`CredentialSource`] for every request.
pub struct HttpBackend {
	client: reqwest::Client,
	config: BackendConfig,
	credentials: Arc<dyn CredentialSource>,
}

impl HttpBackend {
	pub fn new(config: BackendConfig, credentials: Arc<dyn CredentialSource>) -> Result<Self> {
		let client = reqwest::Client::builder()
			.timeout(config.timeout())
			.build()
			.map_err(|e| FareError::Backend(format!("Failed to create HTTP client: {e}")))?;
		Ok(Self { client, config, credentials })
	}

	fn headers(&self, credentials: &SessionCredentials) -> Result<HeaderMap> {
		let value = |raw: &str, name: &str| HeaderValue::from_str(raw).map_err(|_| FareError::Credentials(format!("{name} contains characters not allowed in a header")));

		let mut headers = HeaderMap::new();
		headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
		headers.insert(USER_ID_HEADER, value(&credentials.user_id, "user id")?);
		headers.insert(CSRF_HEADER, value(&credentials.csrf_token, "csrf token")?);
		headers.insert(ORIGIN, value(&self.config.origin, "origin")?);
		headers.insert(REFERER, value(&self.config.origin, "origin")?);
		Ok(headers)
	}

	async fn post<B, T>(&self, endpoint: &'static str, credentials: &SessionCredentials, body: &B) -> Result<T>
	where
		B: Serialize + ?Sized,
		T: DeserializeOwned,
	{
		let url = format!("{}{}", self.config.base_url.trim_end_matches('/'), endpoint);
		debug!(target = "fare.http", %url, "POST");

		let response = self
			.client
			.post(&url)
			.headers(self.headers(credentials)?)
			.json(body)
			.send()
			.await
			.map_err(|source| FareError::Http { endpoint, source })?;

		let status = response.status();
		if !status.is_success() {
			let body = response.text().await.unwrap_or_default();
			return Err(FareError::Status {
				endpoint,
				status: status.as_u16(),
				body,
			});
		}

		response.json::<T>().await.map_err(|source| FareError::Http { endpoint, source })
	}

	fn payment(&self) -> Payment {
		Payment::new(self.config.payment_type.clone())
	}
}

#[async_trait]
impl TaxiBackend for HttpBackend {
	async fn suggest(&self, text: &str, reference: GeoPoint) -> Result<Vec<SuggestCandidate>> {
		let credentials = self.credentials.credentials()?;
		let request = SuggestRequest::user_input(credentials.user_id.clone(), text, reference);
		let response: SuggestResponse = self.post(SUGGEST, &credentials, &request).await?;
		Ok(response.results)
	}

	async fn finalize(&self, candidate: &SuggestCandidate) -> Result<FinalizedAddress> {
		let credentials = self.credentials.credentials()?;
		let request = FinalizeRequest::for_candidate(credentials.user_id.clone(), candidate);
		let response: FinalizeResponse = self.post(FINALIZE, &credentials, &request).await?;
		response.results.into_iter().next().ok_or(FareError::EmptyResponse { endpoint: FINALIZE })
	}

	async fn route_stats(&self, route: &[GeoPoint], tariffs: &[ServiceLevel]) -> Result<RouteStatsResponse> {
		let credentials = self.credentials.credentials()?;
		let request = RouteStatsRequest::new(credentials.user_id.clone(), route.to_vec(), self.payment(), tariffs);
		self.post(ROUTESTATS, &credentials, &request).await
	}

	async fn create_order_draft(&self, order: &DraftOrder) -> Result<OrderDraftResponse> {
		let credentials = self.credentials.credentials()?;
		let request = OrderDraftRequest {
			id: credentials.user_id.clone(),
			offer: order.offer.as_str().to_string(),
			requirements: Requirements::default(),
			parks: Vec::new(),
			dont_sms: false,
			driverclientchat_enabled: true,
			payment: self.payment(),
			route: order.route.clone(),
			class: vec![order.level],
		};
		self.post(ORDER_DRAFT, &credentials, &request).await
	}

	async fn commit_order(&self, order_id: &str) -> Result<OrderCommitResponse> {
		let credentials = self.credentials.credentials()?;
		let request = OrderCommitRequest {
			id: credentials.user_id.clone(),
			orderid: order_id.to_string(),
		};
		self.post(ORDER_COMMIT, &credentials, &request).await
	}
}
