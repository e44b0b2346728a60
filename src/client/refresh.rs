//! Refresh coordination: one refresh call at a time, FIFO replay of the requests that waited.
//!
//! The first request to see a refreshable `401` becomes the leader: it flips the in-flight flag and
//! calls the refresh endpoint (cookie-authenticated, no `Authorization` header, outside the `401`
//! interception path). Requests that fail while the flag is set are parked in a FIFO queue with a
//! one-shot reply channel instead of issuing their own refresh. The flag and the queue live behind
//! one mutex, so the "already refreshing?" check and the enqueue/flag flip are a single decision.
//!
//! When the refresh settles the leader resets the flag and takes the whole queue in the same
//! critical section, after the token store has been updated (success) or cleared (failure):
//!
//! - On success every queued request is replayed with the new token in arrival order, followed by
//!   the leader's own request. Replays are marked retried, so a replay that fails with `401` is
//!   returned as-is instead of triggering another refresh.
//! - On failure every queued request and the leader receive [`Error::SessionExpired`] wrapping the
//!   same shared refresh error; nothing is replayed.
//!
//! Every step runs inside the leader's future, so the leader's caller can cancel it at any point.
//! A drop guard then resets the flag and empties the queue, which closes the waiters' reply
//! channels. A waiter whose channel closes keeps its own copy of the request and recovers alone:
//! if the stored token differs from the one its request was rejected with, a refresh already
//! succeeded and the request is replayed with the current token; otherwise it joins coordination
//! again, becoming the next leader or queuing behind it. A waiter that goes away is skipped when
//! the queue drains and never affects the refresh call itself.

mod metrics;

pub use metrics::RefreshMetrics;

// std
use std::mem;
// crates.io
use futures::{channel::oneshot, future};
// self
use crate::{
	_prelude::*,
	auth::{AccessToken, TokenResponse},
	client::ApiClient,
	http::{ApiRequest, ApiResponse, ApiTransport},
	obs::{self, CallKind, CallOutcome, CallSpan},
};

type Reply = oneshot::Sender<Result<ApiResponse>>;

/// A request parked behind an in-flight refresh, settled exactly once.
pub(crate) struct PendingRequest {
	request: ApiRequest,
	reply: Reply,
}

/// Outcome of asking to join refresh coordination.
pub(crate) enum Admission {
	/// No refresh was in flight; the caller must perform it.
	Leader,
	/// A refresh is in flight; the request was queued and the reply arrives here.
	Queued(oneshot::Receiver<Result<ApiResponse>>),
}

/// In-flight flag plus the FIFO queue of waiting requests. Idle → Refreshing → Idle.
#[derive(Default)]
pub(crate) struct RefreshState {
	in_flight: bool,
	queue: VecDeque<PendingRequest>,
}
impl RefreshState {
	pub(crate) fn is_refreshing(&self) -> bool {
		self.in_flight
	}

	pub(crate) fn admit(&mut self, request: ApiRequest) -> Admission {
		if !self.in_flight {
			self.in_flight = true;

			return Admission::Leader;
		}

		let (reply, receiver) = oneshot::channel();

		self.queue.push_back(PendingRequest { request, reply });

		Admission::Queued(receiver)
	}

	fn settle(&mut self) -> VecDeque<PendingRequest> {
		self.in_flight = false;

		mem::take(&mut self.queue)
	}
}

/// Leader-held guard that returns the state to idle exactly once.
struct RefreshLease<'a> {
	state: &'a Mutex<RefreshState>,
	settled: bool,
}
impl<'a> RefreshLease<'a> {
	fn new(state: &'a Mutex<RefreshState>) -> Self {
		Self { state, settled: false }
	}

	fn settle(mut self) -> VecDeque<PendingRequest> {
		self.settled = true;

		self.state.lock().settle()
	}
}
impl Drop for RefreshLease<'_> {
	fn drop(&mut self) {
		if self.settled {
			return;
		}

		// Dropping the senders wakes every waiter with a cancellation; each waiter recovers alone.
		let abandoned = self.state.lock().settle();

		drop(abandoned);
	}
}

impl<T> ApiClient<T>
where
	T: ?Sized + ApiTransport,
{
	/// Joins (or leads) refresh coordination for a request that already failed with `401`.
	///
	/// `rejected` is the token the request carried when it was answered with `401`.
	pub(crate) async fn refresh_and_replay(
		&self,
		request: ApiRequest,
		rejected: &AccessToken,
	) -> Result<ApiResponse> {
		loop {
			let admission = self.refresh.lock().admit(request.clone());

			if let Admission::Queued(reply) = admission {
				self.refresh_metrics.record_queued();
				obs::record_call_outcome(CallKind::Refresh, CallOutcome::Queued);

				match reply.await {
					Ok(result) => return result,
					// The leader was cancelled before answering this request.
					Err(_) => match self.tokens.get_token() {
						Some(current) if current != *rejected =>
							return self.replay(&request, &current).await,
						_ => continue,
					},
				}
			}

			return self.lead_refresh(request).await;
		}
	}

	async fn lead_refresh(&self, request: ApiRequest) -> Result<ApiResponse> {
		let lease = RefreshLease::new(&self.refresh);

		match self.refresh_access_token().await {
			Ok(token) => {
				self.tokens.set_token(token.clone());

				let pending = lease.settle();

				self.replay_all(pending, request, &token).await
			},
			Err(err) => {
				self.tokens.clear_token();

				let pending = lease.settle();
				let source = Arc::new(err);

				for entry in pending {
					let _ = entry.reply.send(Err(Error::SessionExpired { source: source.clone() }));
				}

				Err(Error::SessionExpired { source })
			},
		}
	}

	async fn refresh_access_token(&self) -> Result<AccessToken> {
		const KIND: CallKind = CallKind::Refresh;

		let span = CallSpan::new(KIND, "refresh_access_token");

		obs::record_call_outcome(KIND, CallOutcome::Attempt);
		self.refresh_metrics.record_attempt();

		let request = ApiRequest::post(self.config.endpoints.refresh.clone());
		let result = span
			.instrument(async {
				self.dispatch(&request, None).await?.json::<TokenResponse>()?.into_access_token()
			})
			.await;

		match &result {
			Ok(_) => {
				self.refresh_metrics.record_success();
				obs::record_call_outcome(KIND, CallOutcome::Success);
			},
			Err(_) => {
				self.refresh_metrics.record_failure();
				obs::record_call_outcome(KIND, CallOutcome::Failure);
			},
		}

		result
	}

	async fn replay_all(
		&self,
		pending: VecDeque<PendingRequest>,
		leader: ApiRequest,
		token: &AccessToken,
	) -> Result<ApiResponse> {
		let queued =
			future::join_all(pending.into_iter().map(|entry| self.replay_pending(entry, token)));
		let (_, result) = future::join(queued, self.replay(&leader, token)).await;

		result
	}

	async fn replay_pending(&self, entry: PendingRequest, token: &AccessToken) {
		let PendingRequest { request, reply } = entry;

		if reply.is_canceled() {
			return;
		}

		let result = self.replay(&request, token).await;

		let _ = reply.send(result);
	}

	async fn replay(&self, request: &ApiRequest, token: &AccessToken) -> Result<ApiResponse> {
		const KIND: CallKind = CallKind::Replay;

		obs::record_call_outcome(KIND, CallOutcome::Attempt);

		let result = self.dispatch(request, Some(token)).await;

		match &result {
			Ok(_) => obs::record_call_outcome(KIND, CallOutcome::Success),
			Err(_) => obs::record_call_outcome(KIND, CallOutcome::Failure),
		}

		result
	}
}

#[cfg(test)]
mod tests {
	// self
	use super::*;

	#[test]
	fn first_admission_leads_and_later_ones_queue_in_order() {
		let mut state = RefreshState::default();

		assert!(matches!(state.admit(ApiRequest::get("/books/1")), Admission::Leader));
		assert!(state.is_refreshing());
		assert!(matches!(state.admit(ApiRequest::get("/books/2")), Admission::Queued(_)));
		assert!(matches!(state.admit(ApiRequest::get("/books/3")), Admission::Queued(_)));

		let drained = state.settle();
		let paths = drained.iter().map(|entry| entry.request.path()).collect::<Vec<_>>();

		assert_eq!(paths, ["/books/2", "/books/3"]);
		assert!(!state.is_refreshing());
		assert!(state.settle().is_empty());
	}

	#[test]
	fn settled_state_admits_a_new_leader() {
		let mut state = RefreshState::default();
		let _ = state.admit(ApiRequest::get("/books/1"));
		let _ = state.settle();

		assert!(matches!(state.admit(ApiRequest::get("/books/2")), Admission::Leader));
	}

	#[tokio::test]
	async fn dropped_lease_resets_flag_and_cancels_waiters() {
		let state = Mutex::new(RefreshState::default());
		let _ = state.lock().admit(ApiRequest::get("/books/1"));
		let lease = RefreshLease::new(&state);
		let waiter = match state.lock().admit(ApiRequest::get("/books/2")) {
			Admission::Queued(receiver) => receiver,
			Admission::Leader => panic!("Second admission should queue."),
		};

		drop(lease);

		assert!(!state.lock().is_refreshing());
		assert!(waiter.await.is_err(), "Abandoned waiters should observe cancellation.");
	}

	#[test]
	fn settled_lease_hands_over_the_queue() {
		let state = Mutex::new(RefreshState::default());
		let _ = state.lock().admit(ApiRequest::get("/books/1"));
		let lease = RefreshLease::new(&state);
		let _ = state.lock().admit(ApiRequest::get("/books/2"));
		let drained = lease.settle();

		assert_eq!(drained.len(), 1);
		assert!(!state.lock().is_refreshing());
	}
}
