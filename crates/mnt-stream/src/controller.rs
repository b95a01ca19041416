use std::{sync::Arc, time::Duration};

use mnt_model::TelemetryRecord;
use tokio::{
    sync::{mpsc, oneshot},
    task::{JoinError, JoinHandle},
    time::{Instant, MissedTickBehavior},
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use crate::{
    config::StreamConfig,
    error::{IngestError, StreamError},
    event::{StreamEvent, StreamEventKind},
    generator::SyntheticRecordGenerator,
    sink::{IngestSink, encode_record},
    subscriber::StreamSubscriber,
};

enum Command {
    Toggle(oneshot::Sender<Result<bool, StreamError>>),
    Status(oneshot::Sender<bool>),
    Shutdown(oneshot::Sender<()>),
}

enum Wake {
    Command(Option<Command>),
    EmitterExited(Result<(), JoinError>),
}

/// Cloneable handle to the stream controller actor.
#[derive(Clone)]
pub struct StreamHandle {
    tx: mpsc::Sender<Command>,
}

impl StreamHandle {
    /// Flip the streaming flag and return the new value.
    ///
    /// On the stop path the emitter has fully exited before this returns,
    /// so no further record is emitted afterwards.
    pub async fn toggle(&self) -> Result<bool, StreamError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Toggle(tx)).await?;
        rx.await.map_err(|_| StreamError::Closed)?
    }

    /// Current value of the streaming flag.
    pub async fn status(&self) -> Result<bool, StreamError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Status(tx)).await?;
        rx.await.map_err(|_| StreamError::Closed)
    }

    /// Stop emitting (if active) and terminate the controller.
    pub async fn shutdown(&self) -> Result<(), StreamError> {
        let (tx, rx) = oneshot::channel();
        self.send(Command::Shutdown(tx)).await?;
        rx.await.map_err(|_| StreamError::Closed)
    }

    async fn send(&self, cmd: Command) -> Result<(), StreamError> {
        self.tx.send(cmd).await.map_err(|_| StreamError::Closed)
    }
}

/// Everything an emitter task needs, shared across restarts.
struct Emission {
    sink: Arc<dyn IngestSink>,
    stream_name: String,
    period: Duration,
    ingest_timeout: Duration,
    generator: SyntheticRecordGenerator,
    subscribers: Vec<Arc<dyn StreamSubscriber>>,
}

struct Emitter {
    token: CancellationToken,
    handle: JoinHandle<()>,
    /// Start of the tick schedule, kept across restarts.
    origin: Instant,
}

/// Sole owner of the streaming flag and the emitter task.
///
/// Runs as one actor task; commands are handled strictly one at a time, so
/// the read-modify-write of the flag never interleaves and at most one
/// emitter exists at any instant.
pub struct StreamController {
    emission: Arc<Emission>,
    emitter: Option<Emitter>,
    rx: mpsc::Receiver<Command>,
}

impl StreamController {
    /// Spawn the controller on the current runtime, initially not streaming.
    pub fn spawn(
        sink: Arc<dyn IngestSink>,
        config: StreamConfig,
        subscribers: Vec<Arc<dyn StreamSubscriber>>,
    ) -> Result<StreamHandle, StreamError> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.mailbox);
        let emission = Arc::new(Emission {
            sink,
            stream_name: config.stream_name,
            period: config.period,
            ingest_timeout: config.ingest_timeout,
            generator: SyntheticRecordGenerator::new(),
            subscribers,
        });

        let controller = Self {
            emission,
            emitter: None,
            rx,
        };
        tokio::spawn(controller.run());
        Ok(StreamHandle { tx })
    }

    async fn run(mut self) {
        loop {
            let wake = match self.emitter.as_mut() {
                Some(emitter) => tokio::select! {
                    cmd = self.rx.recv() => Wake::Command(cmd),
                    joined = &mut emitter.handle => Wake::EmitterExited(joined),
                },
                None => Wake::Command(self.rx.recv().await),
            };

            match wake {
                Wake::Command(Some(Command::Toggle(reply))) => {
                    let result = self.toggle().await;
                    let _ = reply.send(result);
                }
                Wake::Command(Some(Command::Status(reply))) => {
                    let _ = reply.send(self.emitter.is_some());
                }
                Wake::Command(Some(Command::Shutdown(reply))) => {
                    self.stop().await;
                    let _ = reply.send(());
                    break;
                }
                Wake::Command(None) => {
                    self.stop().await;
                    break;
                }
                Wake::EmitterExited(joined) => self.restart(joined),
            }
        }
        debug!("stream controller exited");
    }

    async fn toggle(&mut self) -> Result<bool, StreamError> {
        if self.emitter.is_some() {
            self.stop().await;
            info!("streaming stopped");
            return Ok(false);
        }

        if self.emission.stream_name.trim().is_empty() {
            return Err(StreamError::MissingStreamName);
        }
        self.emitter = Some(Arc::clone(&self.emission).launch());
        info!(
            stream = %self.emission.stream_name,
            period_ms = self.emission.period.as_millis() as u64,
            "streaming started"
        );
        Ok(true)
    }

    async fn stop(&mut self) {
        let Some(emitter) = self.emitter.take() else {
            return;
        };
        emitter.token.cancel();
        if let Err(e) = emitter.handle.await
            && e.is_panic()
        {
            error!("emitter panicked while stopping");
        }
    }

    /// The emitter only exits on its own by panicking. The replacement waits
    /// for the next tick of the original schedule, so a crash loop costs at
    /// most one restart per period.
    fn restart(&mut self, joined: Result<(), JoinError>) {
        let reason = match joined {
            Err(e) if e.is_panic() => "emitter panicked".to_string(),
            Err(e) => e.to_string(),
            Ok(()) => "emitter exited".to_string(),
        };
        let origin = self
            .emitter
            .as_ref()
            .map_or_else(Instant::now, |e| e.origin);
        self.emission
            .publish(StreamEvent::new(StreamEventKind::Restarted).with_reason(reason));
        self.emitter = Some(Arc::clone(&self.emission).relaunch(origin));
    }
}

impl Emission {
    /// New schedule: `Started` right away, first tick one period later.
    fn launch(self: Arc<Self>) -> Emitter {
        let origin = Instant::now();
        let first = origin + self.period;
        self.spawn(origin, first, false)
    }

    /// Resume the schedule begun at `origin`; nothing runs before its next tick.
    fn relaunch(self: Arc<Self>, origin: Instant) -> Emitter {
        let first = next_tick(origin, self.period, Instant::now());
        self.spawn(origin, first, true)
    }

    fn spawn(self: Arc<Self>, origin: Instant, first: Instant, wait: bool) -> Emitter {
        let token = CancellationToken::new();
        let handle = tokio::spawn(self.run(token.clone(), first, wait));
        Emitter {
            token,
            handle,
            origin,
        }
    }

    async fn run(self: Arc<Self>, token: CancellationToken, first: Instant, wait: bool) {
        if wait {
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = tokio::time::sleep_until(first) => {}
            }
        }
        self.publish(StreamEvent::new(StreamEventKind::Started));

        let mut ticker = tokio::time::interval_at(first, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut expected = first;

        loop {
            let fired = tokio::select! {
                biased;
                _ = token.cancelled() => break,
                at = ticker.tick() => at,
            };

            if fired > expected {
                let missed = (fired - expected).as_millis() / self.period.as_millis().max(1);
                let skipped = u32::try_from(missed).unwrap_or(u32::MAX);
                if skipped > 0 {
                    self.publish(StreamEvent::new(StreamEventKind::TickSkipped).with_skipped(skipped));
                }
            }
            expected = fired + self.period;

            tokio::select! {
                biased;
                _ = token.cancelled() => break,
                _ = self.emit_once() => {}
            }
        }

        self.publish(StreamEvent::new(StreamEventKind::Stopped));
    }

    async fn emit_once(&self) {
        let record = self.generator.generate();
        match self.deliver(&record).await {
            Ok(()) => self.publish(
                StreamEvent::new(StreamEventKind::Delivered).with_machine(record.machine_id),
            ),
            Err(e) => {
                self.publish(
                    StreamEvent::new(StreamEventKind::DeliveryFailed)
                        .with_machine(record.machine_id)
                        .with_reason(e.to_string()),
                );
            }
        }
    }

    async fn deliver(&self, record: &TelemetryRecord) -> Result<(), IngestError> {
        let data = encode_record(record)?;
        let put = self
            .sink
            .put(&self.stream_name, data, record.partition_key());
        tokio::time::timeout(self.ingest_timeout, put)
            .await
            .map_err(|_| IngestError::Timeout(self.ingest_timeout))?
    }

    fn publish(&self, event: StreamEvent) {
        for s in &self.subscribers {
            s.on_event(&event);
        }
    }
}

/// First tick of the `origin`-based schedule strictly after `now`.
fn next_tick(origin: Instant, period: Duration, now: Instant) -> Instant {
    let elapsed = now.saturating_duration_since(origin).as_nanos();
    let into_period = Duration::from_nanos((elapsed % period.as_nanos().max(1)) as u64);
    now + (period - into_period)
}

#[cfg(test)]
mod tests {
    use std::sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    };

    use async_trait::async_trait;
    use tokio::task::JoinSet;

    use super::*;

    const PERIOD: Duration = Duration::from_millis(5_000);

    #[derive(Default)]
    struct CountingSink {
        puts: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        fail: bool,
        panic_on_first: bool,
        delay: Option<Duration>,
    }

    impl CountingSink {
        fn puts(&self) -> usize {
            self.puts.load(Ordering::SeqCst)
        }

        fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl IngestSink for CountingSink {
        async fn put(
            &self,
            stream: &str,
            data: Vec<u8>,
            partition_key: &str,
        ) -> Result<(), IngestError> {
            let n = self.puts.fetch_add(1, Ordering::SeqCst);
            assert_eq!(stream, "mri-telemetry");
            let record: TelemetryRecord = serde_json::from_slice(&data)?;
            assert_eq!(record.machine_id, partition_key);

            if self.panic_on_first && n == 0 {
                panic!("sink exploded");
            }
            if let Some(delay) = self.delay {
                let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                self.max_in_flight.fetch_max(now, Ordering::SeqCst);
                tokio::time::sleep(delay).await;
                self.in_flight.fetch_sub(1, Ordering::SeqCst);
            }
            if self.fail {
                return Err(IngestError::Transport("connection reset".into()));
            }
            Ok(())
        }
    }

    /// Tracks how many emitter tasks are alive, and the most ever seen at once.
    #[derive(Default)]
    struct Recorder {
        live: Mutex<(i64, i64)>,
        events: Mutex<Vec<StreamEvent>>,
    }

    impl Recorder {
        fn count(&self, kind: StreamEventKind) -> usize {
            self.events.lock().unwrap().iter().filter(|e| e.kind == kind).count()
        }
    }

    impl StreamSubscriber for Recorder {
        fn on_event(&self, event: &StreamEvent) {
            let mut live = self.live.lock().unwrap();
            match event.kind {
                StreamEventKind::Started => {
                    live.0 += 1;
                    live.1 = live.1.max(live.0);
                }
                StreamEventKind::Stopped => live.0 -= 1,
                _ => {}
            }
            self.events.lock().unwrap().push(event.clone());
        }

        fn name(&self) -> &'static str {
            "recorder"
        }
    }

    /// Panics whenever an emitter announces itself.
    #[derive(Default)]
    struct PanicsOnStart {
        starts: AtomicUsize,
    }

    impl StreamSubscriber for PanicsOnStart {
        fn on_event(&self, event: &StreamEvent) {
            if event.kind == StreamEventKind::Started {
                self.starts.fetch_add(1, Ordering::SeqCst);
                panic!("subscriber rejects start");
            }
        }

        fn name(&self) -> &'static str {
            "panics-on-start"
        }
    }

    fn config() -> StreamConfig {
        StreamConfig {
            stream_name: "mri-telemetry".into(),
            ..Default::default()
        }
    }

    fn spawn(sink: Arc<CountingSink>, recorder: Arc<Recorder>, config: StreamConfig) -> StreamHandle {
        StreamController::spawn(sink, config, vec![recorder as Arc<dyn StreamSubscriber>]).unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn toggle_flips_and_reports_state() {
        let sink = Arc::new(CountingSink::default());
        let handle = spawn(sink, Arc::new(Recorder::default()), config());

        assert!(!handle.status().await.unwrap());
        assert!(handle.toggle().await.unwrap());
        assert!(handle.status().await.unwrap());
        assert!(!handle.toggle().await.unwrap());
        assert!(!handle.status().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn emits_once_per_period() {
        let sink = Arc::new(CountingSink::default());
        let recorder = Arc::new(Recorder::default());
        let handle = spawn(Arc::clone(&sink), Arc::clone(&recorder), config());

        handle.toggle().await.unwrap();
        tokio::time::sleep(PERIOD * 3 + Duration::from_millis(500)).await;

        assert_eq!(sink.puts(), 3);
        assert_eq!(recorder.count(StreamEventKind::Delivered), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn nothing_is_emitted_after_stop() {
        let sink = Arc::new(CountingSink::default());
        let recorder = Arc::new(Recorder::default());
        let handle = spawn(Arc::clone(&sink), Arc::clone(&recorder), config());

        handle.toggle().await.unwrap();
        tokio::time::sleep(PERIOD * 2 + Duration::from_millis(500)).await;
        assert!(!handle.toggle().await.unwrap());

        let emitted = sink.puts();
        assert_eq!(emitted, 2);
        assert_eq!(recorder.count(StreamEventKind::Stopped), 1);

        tokio::time::sleep(PERIOD * 2 + Duration::from_millis(100)).await;
        assert_eq!(sink.puts(), emitted);
    }

    #[tokio::test(start_paused = true)]
    async fn delivery_failures_do_not_stop_the_schedule() {
        let sink = Arc::new(CountingSink {
            fail: true,
            ..Default::default()
        });
        let recorder = Arc::new(Recorder::default());
        let handle = spawn(Arc::clone(&sink), Arc::clone(&recorder), config());

        handle.toggle().await.unwrap();
        tokio::time::sleep(PERIOD * 3 + Duration::from_millis(500)).await;

        assert_eq!(sink.puts(), 3);
        assert_eq!(recorder.count(StreamEventKind::DeliveryFailed), 3);
        assert!(handle.status().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn slow_delivery_times_out() {
        let sink = Arc::new(CountingSink {
            delay: Some(Duration::from_secs(60)),
            ..Default::default()
        });
        let recorder = Arc::new(Recorder::default());
        let cfg = StreamConfig {
            ingest_timeout: Duration::from_secs(1),
            ..config()
        };
        let handle = spawn(Arc::clone(&sink), Arc::clone(&recorder), cfg);

        handle.toggle().await.unwrap();
        tokio::time::sleep(PERIOD + Duration::from_millis(1_500)).await;

        let events = recorder.events.lock().unwrap().clone();
        let failed = events
            .iter()
            .find(|e| e.kind == StreamEventKind::DeliveryFailed)
            .expect("timeout reported");
        assert!(failed.reason.as_deref().unwrap().contains("timed out"));
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_emitter_is_restarted() {
        let sink = Arc::new(CountingSink {
            panic_on_first: true,
            ..Default::default()
        });
        let recorder = Arc::new(Recorder::default());
        let handle = spawn(Arc::clone(&sink), Arc::clone(&recorder), config());

        handle.toggle().await.unwrap();
        tokio::time::sleep(PERIOD * 2 + Duration::from_millis(500)).await;

        assert_eq!(recorder.count(StreamEventKind::Restarted), 1);
        assert_eq!(recorder.count(StreamEventKind::Delivered), 1);
        assert!(handle.status().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn crash_loop_restarts_at_most_once_per_period() {
        let recorder = Arc::new(Recorder::default());
        let panicker = Arc::new(PanicsOnStart::default());
        let subscribers: Vec<Arc<dyn StreamSubscriber>> =
            vec![recorder.clone(), panicker.clone()];
        let handle =
            StreamController::spawn(Arc::new(CountingSink::default()), config(), subscribers)
                .unwrap();

        handle.toggle().await.unwrap();
        tokio::time::sleep(PERIOD * 3 + Duration::from_millis(500)).await;

        // One immediate failure, then one attempt per tick at 5 s, 10 s and 15 s.
        let restarts = recorder.count(StreamEventKind::Restarted);
        assert!((1..=4).contains(&restarts), "restarts = {restarts}");
        assert_eq!(panicker.starts.load(Ordering::SeqCst), restarts);

        assert!(!handle.toggle().await.unwrap());
        tokio::time::sleep(PERIOD * 2).await;
        assert_eq!(recorder.count(StreamEventKind::Restarted), restarts);
    }

    #[tokio::test(start_paused = true)]
    async fn overrunning_delivery_skips_ticks() {
        let sink = Arc::new(CountingSink {
            delay: Some(Duration::from_secs(11)),
            ..Default::default()
        });
        let recorder = Arc::new(Recorder::default());
        let cfg = StreamConfig {
            ingest_timeout: Duration::from_secs(30),
            ..config()
        };
        let handle = spawn(Arc::clone(&sink), Arc::clone(&recorder), cfg);

        handle.toggle().await.unwrap();
        tokio::time::sleep(Duration::from_secs(40)).await;

        let events = recorder.events.lock().unwrap().clone();
        let skips: Vec<_> = events
            .iter()
            .filter(|e| e.kind == StreamEventKind::TickSkipped)
            .collect();
        assert!(!skips.is_empty());
        assert!(skips.iter().all(|e| e.skipped.unwrap_or(0) >= 1));

        assert_eq!(sink.max_in_flight(), 1);
        assert!(recorder.count(StreamEventKind::Delivered) >= 2);
        assert!(sink.puts() < 8, "puts = {}", sink.puts());
        assert_eq!(recorder.count(StreamEventKind::DeliveryFailed), 0);
    }

    #[test]
    fn next_tick_stays_on_the_original_grid() {
        let origin = Instant::now();
        let at = |secs| origin + Duration::from_secs(secs);

        assert_eq!(next_tick(origin, PERIOD, at(12)), at(15));
        assert_eq!(next_tick(origin, PERIOD, at(10)), at(15));
        assert_eq!(next_tick(origin, PERIOD, origin), at(5));
    }

    #[tokio::test(start_paused = true)]
    async fn missing_stream_name_refuses_to_start() {
        let sink = Arc::new(CountingSink::default());
        let handle = spawn(Arc::clone(&sink), Arc::new(Recorder::default()), StreamConfig::default());

        assert!(matches!(
            handle.toggle().await,
            Err(StreamError::MissingStreamName)
        ));
        assert!(!handle.status().await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn shutdown_stops_emitter_and_closes_handle() {
        let sink = Arc::new(CountingSink::default());
        let handle = spawn(Arc::clone(&sink), Arc::new(Recorder::default()), config());

        handle.toggle().await.unwrap();
        handle.shutdown().await.unwrap();
        let emitted = sink.puts();

        tokio::time::sleep(PERIOD * 2).await;
        assert_eq!(sink.puts(), emitted);
        assert!(matches!(handle.toggle().await, Err(StreamError::Closed)));
    }

    #[test]
    fn rejects_zero_period() {
        let cfg = StreamConfig {
            period: Duration::ZERO,
            ..config()
        };
        assert!(matches!(cfg.validate(), Err(StreamError::InvalidConfig(_))));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_toggles_keep_at_most_one_emitter() {
        let sink = Arc::new(CountingSink::default());
        let recorder = Arc::new(Recorder::default());
        let handle = spawn(sink, Arc::clone(&recorder), config());

        const N: usize = 9;
        let mut set = JoinSet::new();
        for _ in 0..N {
            let handle = handle.clone();
            set.spawn(async move { handle.toggle().await });
        }
        let mut on = 0;
        while let Some(joined) = set.join_next().await {
            if joined.unwrap().unwrap() {
                on += 1;
            }
        }

        // Every call observed a distinct flag value: ceil(N/2) starts.
        assert_eq!(on, N.div_ceil(2));
        assert_eq!(handle.status().await.unwrap(), N % 2 == 1);

        tokio::time::sleep(Duration::from_millis(50)).await;
        let (live, max_live) = *recorder.live.lock().unwrap();
        assert_eq!(live, 1);
        assert_eq!(max_live, 1);
    }
}
