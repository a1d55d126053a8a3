use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::outputs::report::Renderer;
use crate::storage::store::KeyValueStore;
use super::effect::SideEffect;
use super::engine::Engine;
use super::event::Event;
use super::time::Timestamp;

/// Single-task driver around the engine.
/// Samples are handled in arrival order; the flush timer interleaves between them.
pub struct Reactor<S: KeyValueStore, R: Renderer> {
    pub receiver: mpsc::Receiver<Event>,
    pub engine: Engine<S>,
    renderer: R,
    flush_every: Duration,
}

impl<S: KeyValueStore, R: Renderer> Reactor<S, R> {
    pub fn new(receiver: mpsc::Receiver<Event>, engine: Engine<S>, renderer: R) -> Self {
        let flush_every = engine.config().flush_interval();
        Self {
            receiver,
            engine,
            renderer,
            flush_every,
        }
    }

    /// Pure step: one event in, effects executed. MUST NOT await.
    pub fn step(&mut self, event: Event) {
        let effects = self.engine.handle(event);
        self.execute(effects);
    }

    fn execute(&mut self, effects: Vec<SideEffect>) {
        for effect in effects {
            match effect {
                SideEffect::Log(msg) => info!("[LOG] {}", msg),
                SideEffect::Render(report) => self.renderer.render(&report),
            }
        }
    }

    /// Async driver loop. Returns after the shutdown flush, triggered by
    /// cancellation, an explicit `Event::Shutdown`, or every sender being dropped.
    pub async fn run(mut self, cancel: CancellationToken) -> Engine<S> {
        info!("Reactor started. Flush every {}ms", self.flush_every.as_millis());

        let mut cadence = interval(self.flush_every);
        cadence.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // First tick of a tokio interval fires immediately; nothing to flush yet.
        cadence.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                // Ahead of the receiver so a never-empty channel cannot starve flushes.
                _ = cadence.tick() => self.step(Event::FlushTick { at: Timestamp::now() }),
                maybe_event = self.receiver.recv() => match maybe_event {
                    Some(Event::Shutdown { at }) => {
                        self.step(Event::Shutdown { at });
                        return self.engine;
                    }
                    Some(event) => self.step(event),
                    None => break,
                },
            }
        }

        // Events already queued still belong to this session.
        while let Ok(event) = self.receiver.try_recv() {
            if matches!(event, Event::Shutdown { .. }) {
                break;
            }
            self.step(event);
        }
        self.step(Event::Shutdown { at: Timestamp::now() });
        info!("Reactor stopped");
        self.engine
    }
}
