//! Broadcast bus for execution progress events.
//!
//! The engine publishes [`SwapEvent`]s as each phase advances; callers
//! subscribe to render progress without polling. Publishing with no
//! subscribers is fine, the event is simply dropped.

use omniswap_types::SwapEvent;
use tokio::sync::broadcast;

/// Broadcast bus carrying one execution's progress events.
pub struct EventBus {
	sender: broadcast::Sender<SwapEvent>,
}

impl EventBus {
	/// Creates a bus with the given channel capacity.
	///
	/// When the channel fills, the oldest buffered events are dropped
	/// for lagging subscribers.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	/// Creates a new subscriber receiving every event published after
	/// this call.
	pub fn subscribe(&self) -> broadcast::Receiver<SwapEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to all current subscribers.
	pub fn publish(&self, event: SwapEvent) {
		// No subscribers is not an error; progress is advisory.
		let _ = self.sender.send(event);
	}
}

impl Clone for EventBus {
	fn clone(&self) -> Self {
		Self {
			sender: self.sender.clone(),
		}
	}
}

impl Default for EventBus {
	fn default() -> Self {
		Self::new(64)
	}
}
