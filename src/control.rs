use tokio::sync::mpsc::{self, error::TryRecvError};

pub const DEFAULT_SCALAR: f32 = 0.5;

/// Discrete commands coming from the UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiSignal {
    Reset,
}

/// The UI-facing input state: a scalar in `[0, 1]` and a signal channel.
///
/// Constructed once at startup and handed by reference to the UI layer;
/// the controller only ever sees it through a [`ControlSubscription`].
/// Every subscriber gets its own unbounded queue, so no emission is dropped.
pub struct ControlState {
    scalar: f32,
    scalar_txs: Vec<mpsc::UnboundedSender<f32>>,
    signal_txs: Vec<mpsc::UnboundedSender<UiSignal>>,
}

impl ControlState {
    pub fn new(initial: f32) -> Self {
        let scalar = if initial.is_finite() {
            initial.clamp(0.0, 1.0)
        } else {
            DEFAULT_SCALAR
        };

        Self {
            scalar,
            scalar_txs: Vec::new(),
            signal_txs: Vec::new(),
        }
    }

    pub fn scalar(&self) -> f32 {
        self.scalar
    }

    /// Publishes a new scalar value, clamped to `[0, 1]`. Unchanged values are
    /// not re-emitted and non-finite input is dropped.
    pub fn set_scalar(&mut self, value: f32) {
        if !value.is_finite() {
            log::warn!("Ignoring non-finite scalar input {}", value);
            return;
        }

        let value = value.clamp(0.0, 1.0);
        if value == self.scalar {
            return;
        }

        self.scalar = value;
        fan_out(&mut self.scalar_txs, value);
    }

    pub fn send(&mut self, signal: UiSignal) {
        if fan_out(&mut self.signal_txs, signal) == 0 {
            log::debug!("{:?} sent with no subscribers", signal);
        }
    }

    /// Subscribes to both channels. The current scalar is replayed as the first emission.
    pub fn subscribe(&mut self) -> ControlSubscription {
        let (scalar_tx, scalar_rx) = mpsc::unbounded_channel();
        let (signal_tx, signal_rx) = mpsc::unbounded_channel();

        scalar_tx.send(self.scalar).ok();
        self.scalar_txs.push(scalar_tx);
        self.signal_txs.push(signal_tx);

        ControlSubscription {
            scalar_rx,
            signal_rx,
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.scalar_txs.iter().filter(|tx| !tx.is_closed()).count()
    }
}

impl Default for ControlState {
    fn default() -> Self {
        Self::new(DEFAULT_SCALAR)
    }
}

/// Sends to every live subscriber, forgetting dropped ones. Returns how many received it.
fn fan_out<T: Copy>(txs: &mut Vec<mpsc::UnboundedSender<T>>, value: T) -> usize {
    txs.retain(|tx| tx.send(value).is_ok());
    txs.len()
}

/// Receiving side of both control channels. Dropping it releases both.
pub struct ControlSubscription {
    scalar_rx: mpsc::UnboundedReceiver<f32>,
    signal_rx: mpsc::UnboundedReceiver<UiSignal>,
}

impl ControlSubscription {
    /// Next pending scalar emission, if any. Never blocks.
    pub fn next_scalar(&mut self) -> Option<f32> {
        try_recv(&mut self.scalar_rx)
    }

    /// Next pending signal, if any. Never blocks.
    pub fn next_signal(&mut self) -> Option<UiSignal> {
        try_recv(&mut self.signal_rx)
    }
}

fn try_recv<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> Option<T> {
    match rx.try_recv() {
        Ok(value) => Some(value),
        Err(TryRecvError::Empty | TryRecvError::Disconnected) => None,
    }
}
