use anyhow::Result;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use super::queue::{RequestQueue, ResponseTable, Ticket};
use super::types::{Request, RequestKind, Response};
use crate::engine::{Engine, Status};
use crate::TARGET_PIPELINE;

/// Fixed-size worker pool applying queued requests to the engine.
pub struct Pipeline {
    engine: Arc<Engine>,
    queue: RequestQueue,
    responses: ResponseTable,
    ready: AtomicBool,
    worker_count: usize,
}

impl Pipeline {
    pub fn new(engine: Arc<Engine>, worker_count: usize) -> Arc<Self> {
        Arc::new(Self {
            engine,
            queue: RequestQueue::new(),
            responses: ResponseTable::new(),
            ready: AtomicBool::new(false),
            worker_count: worker_count.max(1),
        })
    }

    pub fn engine(&self) -> &Arc<Engine> {
        &self.engine
    }

    /// Spawns the workers and returns their handles. Workers run until the
    /// pipeline is dropped.
    pub fn start(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        info!(target: TARGET_PIPELINE, "Starting {} pipeline workers", self.worker_count);

        (0..self.worker_count)
            .map(|worker_id| {
                let pipeline = Arc::clone(self);
                tokio::spawn(async move {
                    pipeline.worker_loop(worker_id).await;
                })
            })
            .collect()
    }

    /// One-time bulk load of the index directory. Requests are served only
    /// after it completes.
    pub async fn load(self: &Arc<Self>) -> Result<usize> {
        let started = Instant::now();
        let loaded = self.engine.load_index().await?;
        self.ready.store(true, Ordering::SeqCst);
        info!(
            target: TARGET_PIPELINE,
            "Pipeline ready after loading {} articles in {:?}",
            loaded,
            started.elapsed()
        );
        Ok(loaded)
    }

    pub fn is_ready(&self) -> bool {
        self.ready.load(Ordering::SeqCst)
    }

    /// Enqueues a request. The response is delivered to the returned ticket,
    /// or discarded if the ticket is dropped first.
    pub fn submit(&self, kind: RequestKind) -> Ticket {
        self.queue.push(kind, &self.responses)
    }

    /// Submits a request and waits for its response.
    pub async fn call(&self, kind: RequestKind) -> Response {
        self.submit(kind).wait().await
    }

    /// Submitted requests whose response has not been published yet.
    pub fn pending(&self) -> usize {
        self.responses.pending()
    }

    async fn worker_loop(&self, worker_id: usize) {
        debug!(target: TARGET_PIPELINE, "Worker {} started", worker_id);

        while let Some(request) = self.queue.pop().await {
            let started = Instant::now();
            let summary = request.to_string();
            let response = self.process(request).await;
            let status = response.status;
            let delivered = self.responses.publish(response);
            debug!(
                target: TARGET_PIPELINE,
                "Worker {} answered {} with {} in {:?}{} ({} pending)",
                worker_id,
                summary,
                status,
                started.elapsed(),
                if delivered { "" } else { ", caller gone" },
                self.pending()
            );
        }

        debug!(target: TARGET_PIPELINE, "Worker {} stopped", worker_id);
    }

    async fn process(&self, request: Request) -> Response {
        let Request { id, kind } = request;

        if !self.is_ready() {
            return Response::empty(id, Status::Unavailable);
        }

        match kind {
            RequestKind::Index { key, ttl, content } => {
                Response::empty(id, self.engine.index(&key, ttl, content).await)
            }
            RequestKind::Remove { key } => Response::empty(id, self.engine.remove(&key).await),
            RequestKind::Rank {
                period,
                language,
                category,
            } => {
                let (status, body) = self.engine.rank(period, &language, &category).await;
                Response { id, status, body }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::Classifier;
    use crate::engine::RankClock;
    use crate::storage::DocumentRepository;
    use crate::store::ArticleStore;

    const PAGE: &str = "<html><head>\
        <meta property=\"article:published_time\" content=\"2020-05-01T12:00:00+00:00\"/>\
        </head><body><h1>Senate passes the new bill</h1>\
        <p>The Senate passed the new bill on Tuesday. Lawmakers in Washington said it was a good day for the country.</p>\
        </body></html>";

    fn pipeline(dir: &std::path::Path, workers: usize) -> Arc<Pipeline> {
        let engine = Engine::new(
            Classifier::default(),
            ArticleStore::default(),
            DocumentRepository::new(dir),
        )
        .with_rank_clock(RankClock::Newest);
        Pipeline::new(Arc::new(engine), workers)
    }

    fn index(key: &str) -> RequestKind {
        RequestKind::Index {
            key: key.to_string(),
            ttl: 3600,
            content: PAGE.as_bytes().to_vec(),
        }
    }

    #[tokio::test]
    async fn test_requests_before_load_are_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), 2);
        pipeline.start();

        assert_eq!(pipeline.call(index("1.html")).await.status, Status::Unavailable);
        let rank = RequestKind::Rank {
            period: 3600,
            language: "en".to_string(),
            category: "any".to_string(),
        };
        assert_eq!(pipeline.call(rank).await.status, Status::Unavailable);
        assert!(!dir.path().join("1.html").exists());

        pipeline.load().await.unwrap();
        assert!(pipeline.is_ready());
        assert_eq!(pipeline.call(index("1.html")).await.status, Status::Created);
    }

    #[tokio::test]
    async fn test_index_remove_remove() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), 3);
        pipeline.start();
        pipeline.load().await.unwrap();

        assert_eq!(pipeline.call(index("1.html")).await.status, Status::Created);
        let remove = || RequestKind::Remove {
            key: "1.html".to_string(),
        };
        assert_eq!(pipeline.call(remove()).await.status, Status::NoContent);
        assert_eq!(pipeline.call(remove()).await.status, Status::NotFound);
    }

    #[tokio::test]
    async fn test_response_is_delivered_once() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), 1);
        pipeline.start();
        pipeline.load().await.unwrap();

        let mut ticket = pipeline.submit(RequestKind::Remove {
            key: "missing.html".to_string(),
        });
        let id = ticket.id();
        let response = loop {
            if let Some(response) = ticket.try_take() {
                break response;
            }
            tokio::task::yield_now().await;
        };
        assert_eq!(response.id, id);
        assert_eq!(response.status, Status::NotFound);
        assert!(ticket.try_take().is_none());
        assert_eq!(pipeline.pending(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_callers_leave_nothing_pending() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), 1);
        pipeline.start();
        pipeline.load().await.unwrap();

        for i in 0..100 {
            let call = pipeline.call(RequestKind::Remove {
                key: format!("{}.html", i),
            });
            tokio::pin!(call);
            // Poll once so the request is queued, then give up on it
            tokio::select! {
                biased;
                _ = &mut call => {}
                _ = std::future::ready(()) => {}
            }
        }

        // A single worker answers in queue order, so every abandoned request
        // has been handled once this one returns
        let last = pipeline
            .call(RequestKind::Remove {
                key: "last.html".to_string(),
            })
            .await;
        assert_eq!(last.status, Status::NotFound);
        assert_eq!(pipeline.pending(), 0);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submitters_all_get_answers() {
        let dir = tempfile::tempdir().unwrap();
        let pipeline = pipeline(dir.path(), 4);
        pipeline.start();
        pipeline.load().await.unwrap();

        let handles: Vec<_> = (0..40)
            .map(|i| {
                let pipeline = Arc::clone(&pipeline);
                tokio::spawn(async move {
                    let kind = if i % 2 == 0 {
                        index(&format!("{}.html", i))
                    } else {
                        RequestKind::Rank {
                            period: 3600,
                            language: "en".to_string(),
                            category: "any".to_string(),
                        }
                    };
                    let ticket = pipeline.submit(kind);
                    let id = ticket.id();
                    (id, ticket.wait().await)
                })
            })
            .collect();

        let mut ids = Vec::new();
        for handle in handles {
            let (id, response) = handle.await.unwrap();
            assert_eq!(response.id, id);
            assert!(matches!(response.status, Status::Created | Status::Ok));
            ids.push(id);
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 40);
        assert_eq!(pipeline.engine().article_count().await, 20);
    }
}
