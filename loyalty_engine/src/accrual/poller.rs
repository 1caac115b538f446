//! The polling worker pool that moves claimed orders through their lifecycle.
//!
//! One dispatcher task periodically fetches every unterminated order and feeds a bounded job queue; N worker
//! tasks consume it, query the accrual system and apply the resulting status transition through the store.
//! A 429 from the accrual system is pushed onto a second, small channel that only the dispatcher reads: the
//! next dispatch pass is delayed by the largest pending `Retry-After`, so backpressure is shared by the whole
//! pool instead of being tracked per order.
use std::{sync::Arc, time::Duration};

use log::{debug, error, info, trace};
use lp_common::Amount;
use tokio::{
    sync::{mpsc, Mutex},
    task::JoinHandle,
    time::MissedTickBehavior,
};
use tokio_util::sync::CancellationToken;

use crate::{
    db_types::{Order, OrderStatus},
    traits::{AccrualClient, AccrualClientError, AccrualOrderState, ExternalStatus, LoyaltyStore},
};

pub const DEFAULT_WORKERS: usize = 5;
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

pub struct WorkerPool<S, C> {
    inner: Arc<PoolInner<S, C>>,
    interval: Duration,
    workers: usize,
}

struct PoolInner<S, C> {
    store: S,
    client: C,
}

impl<S, C> WorkerPool<S, C>
where
    S: LoyaltyStore + 'static,
    C: AccrualClient + 'static,
{
    pub fn new(store: S, client: C, interval: Duration, workers: usize) -> Self {
        let interval = if interval.is_zero() { DEFAULT_POLL_INTERVAL } else { interval };
        let workers = if workers == 0 { DEFAULT_WORKERS } else { workers };
        Self { inner: Arc::new(PoolInner { store, client }), interval, workers }
    }

    /// Spawns the dispatcher and the workers. Cancelling `token` stops the dispatcher, which closes the job
    /// queue; the workers drain it and exit. [`PollerHandle::wait`] completes once every task has returned.
    pub fn start(&self, token: CancellationToken) -> PollerHandle {
        let (jobs_tx, jobs_rx) = mpsc::channel::<Order>(2 * self.workers);
        let (rate_tx, rate_rx) = mpsc::channel::<Duration>(self.workers);
        let jobs_rx = Arc::new(Mutex::new(jobs_rx));
        let mut handles = Vec::with_capacity(self.workers + 1);
        let dispatcher = Dispatcher {
            inner: Arc::clone(&self.inner),
            interval: self.interval,
            jobs: jobs_tx,
            rate_limit: rate_rx,
            token: token.clone(),
        };
        handles.push(tokio::spawn(dispatcher.run()));
        for id in 0..self.workers {
            let worker = Worker {
                id,
                inner: Arc::clone(&self.inner),
                jobs: Arc::clone(&jobs_rx),
                rate_limit: rate_tx.clone(),
                token: token.clone(),
            };
            handles.push(tokio::spawn(worker.run()));
        }
        info!("📡️ Accrual poller started: {} workers, polling every {:?}", self.workers, self.interval);
        PollerHandle { handles }
    }
}

pub struct PollerHandle {
    handles: Vec<JoinHandle<()>>,
}

impl PollerHandle {
    /// Completes when the dispatcher and every worker have returned.
    pub async fn wait(self) {
        for handle in self.handles {
            let _ = handle.await;
        }
    }
}

struct Dispatcher<S, C> {
    inner: Arc<PoolInner<S, C>>,
    interval: Duration,
    jobs: mpsc::Sender<Order>,
    rate_limit: mpsc::Receiver<Duration>,
    token: CancellationToken,
}

impl<S, C> Dispatcher<S, C>
where
    S: LoyaltyStore,
    C: AccrualClient,
{
    async fn run(mut self) {
        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut delay = Duration::ZERO;
        loop {
            if !delay.is_zero() {
                debug!("📡️ Pausing dispatch for {delay:?} at the accrual system's request");
                tokio::select! {
                    _ = self.token.cancelled() => break,
                    _ = tokio::time::sleep(delay) => {},
                }
                delay = Duration::ZERO;
            }
            tokio::select! {
                _ = self.token.cancelled() => break,
                Some(retry_after) = self.rate_limit.recv() => {
                    delay = delay.max(retry_after);
                    continue;
                },
                _ = ticker.tick() => {},
            }
            // A worker may have hit the rate limit while we slept on the ticker.
            while let Ok(retry_after) = self.rate_limit.try_recv() {
                delay = delay.max(retry_after);
            }
            if !delay.is_zero() {
                continue;
            }
            if !self.enqueue_pending_orders().await {
                break;
            }
        }
        debug!("📡️ Dispatcher stopped");
        // Dropping `self.jobs` closes the queue, letting the workers drain and exit.
    }

    /// Feeds every NEW, then every PROCESSING order into the job queue. Returns `false` on cancellation.
    async fn enqueue_pending_orders(&self) -> bool {
        for status in [OrderStatus::New, OrderStatus::Processing] {
            let orders = match self.inner.store.orders_by_status(status).await {
                Ok(orders) => orders,
                Err(e) => {
                    error!("📡️ Could not fetch {status} orders: {e}");
                    continue;
                },
            };
            trace!("📡️ Dispatching {} {status} orders", orders.len());
            for order in orders {
                tokio::select! {
                    _ = self.token.cancelled() => return false,
                    sent = self.jobs.send(order) => {
                        if sent.is_err() {
                            return false;
                        }
                    },
                }
            }
        }
        true
    }
}

struct Worker<S, C> {
    id: usize,
    inner: Arc<PoolInner<S, C>>,
    jobs: Arc<Mutex<mpsc::Receiver<Order>>>,
    rate_limit: mpsc::Sender<Duration>,
    token: CancellationToken,
}

impl<S, C> Worker<S, C>
where
    S: LoyaltyStore,
    C: AccrualClient,
{
    async fn run(self) {
        loop {
            let order = tokio::select! {
                _ = self.token.cancelled() => break,
                order = next_job(&self.jobs) => match order {
                    Some(order) => order,
                    None => break,
                },
            };
            self.process(&order).await;
        }
        debug!("📡️ Worker #{} stopped", self.id);
    }

    async fn process(&self, order: &Order) {
        match self.inner.client.get_order(&order.number).await {
            Ok(state) => self.apply(order, state).await,
            Err(AccrualClientError::NotRegistered) => {
                // The accrual system has not ingested the order yet; the next tick retries.
                trace!("📡️ Order [{}] is not registered with the accrual system yet", order.number);
            },
            Err(AccrualClientError::RateLimited(retry_after)) => {
                // One queued delay already suffices, so drop the sample when the channel is full.
                let _ = self.rate_limit.try_send(retry_after);
                debug!("📡️ Worker #{}: rate limited, asked to retry after {retry_after:?}", self.id);
            },
            Err(e) => {
                error!("📡️ Worker #{}: could not query accrual for order [{}]: {e}", self.id, order.number);
            },
        }
    }

    async fn apply(&self, order: &Order, state: AccrualOrderState) {
        let Some((status, accrual)) = map_status(&state) else {
            return;
        };
        match self.inner.store.update_order_status(&order.number, status, accrual).await {
            Ok(()) => trace!("📡️ Order [{}] moved to {status}", order.number),
            Err(e) => {
                error!("📡️ Worker #{}: could not move order [{}] to {status}: {e}", self.id, order.number);
            },
        }
    }
}

async fn next_job(jobs: &Mutex<mpsc::Receiver<Order>>) -> Option<Order> {
    jobs.lock().await.recv().await
}

/// Maps the accrual system's vocabulary onto the loyalty order lifecycle. `None` means no transition.
fn map_status(state: &AccrualOrderState) -> Option<(OrderStatus, Amount)> {
    match state.status {
        ExternalStatus::Registered | ExternalStatus::Processing => Some((OrderStatus::Processing, Amount::ZERO)),
        ExternalStatus::Invalid => Some((OrderStatus::Invalid, Amount::ZERO)),
        ExternalStatus::Processed => {
            Some((OrderStatus::Processed, Amount::from_points(state.accrual.unwrap_or(0.0))))
        },
        ExternalStatus::Unknown => None,
    }
}
