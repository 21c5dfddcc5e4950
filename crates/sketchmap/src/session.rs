//! Latest-result-wins processing session.
//!
//! Every submission takes a monotonically increasing [`Ticket`]. Stages run on
//! the blocking pool, and between stages a submission checks whether a newer
//! one has started; if so it stops early. A finished result is only published
//! when its ticket is still the newest, so observers never see a stale graph
//! replace a fresher one.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use log::{debug, info};
use tokio::{sync::watch, task};

use crate::{ProcessedSketch, SketchPipeline, error::SketchError};

/// Sequence number of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    /// Returns the sequence number.
    pub fn sequence(self) -> u64 {
        self.0
    }
}

/// How a submission ended.
#[derive(Debug)]
pub enum Outcome {
    Ready(ProcessedSketch),
    Failed(SketchError),
}

/// The result visible to observers.
#[derive(Debug)]
pub struct Published {
    sequence: u64,
    outcome: Outcome,
}

impl Published {
    /// Returns the sequence number of the submission that produced this result.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns how the submission ended.
    pub fn outcome(&self) -> &Outcome {
        &self.outcome
    }

    /// The laid-out sketch, if the submission succeeded.
    pub fn sketch(&self) -> Option<&ProcessedSketch> {
        match &self.outcome {
            Outcome::Ready(sketch) => Some(sketch),
            Outcome::Failed(_) => None,
        }
    }

    /// The error, if the submission failed.
    pub fn error(&self) -> Option<&SketchError> {
        match &self.outcome {
            Outcome::Ready(_) => None,
            Outcome::Failed(err) => Some(err),
        }
    }
}

type Slot = Option<Arc<Published>>;

/// Shared handle; clones submit into and observe the same session.
#[derive(Clone)]
pub struct Session {
    pipeline: Arc<SketchPipeline>,
    latest: Arc<AtomicU64>,
    sender: Arc<watch::Sender<Slot>>,
}

impl Session {
    /// Creates a session around `pipeline` with nothing published yet.
    pub fn new(pipeline: SketchPipeline) -> Self {
        let (sender, _) = watch::channel(None);
        Self {
            pipeline: Arc::new(pipeline),
            latest: Arc::new(AtomicU64::new(0)),
            sender: Arc::new(sender),
        }
    }

    /// Returns the pipeline submissions run through.
    pub fn pipeline(&self) -> &SketchPipeline {
        &self.pipeline
    }

    /// Receives every newly published result.
    pub fn subscribe(&self) -> watch::Receiver<Slot> {
        self.sender.subscribe()
    }

    /// The most recently published result.
    pub fn current(&self) -> Slot {
        self.sender.borrow().clone()
    }

    /// Starts a submission, superseding every earlier one.
    pub fn begin(&self) -> Ticket {
        Ticket(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Whether no submission started after `ticket`.
    pub fn is_current(&self, ticket: Ticket) -> bool {
        self.latest.load(Ordering::SeqCst) == ticket.0
    }

    /// Publishes `outcome` unless `ticket` has been superseded.
    ///
    /// Returns whether the outcome became visible.
    pub fn complete(&self, ticket: Ticket, outcome: Outcome) -> bool {
        let published = Arc::new(Published {
            sequence: ticket.0,
            outcome,
        });

        let accepted = self.sender.send_if_modified(|slot| {
            if !self.is_current(ticket) {
                return false;
            }
            if slot.as_ref().is_some_and(|current| current.sequence >= ticket.0) {
                return false;
            }
            *slot = Some(published);
            true
        });

        if accepted {
            info!(sequence = ticket.0; "Result published");
        } else {
            debug!(sequence = ticket.0; "Discarding stale result");
        }
        accepted
    }

    /// Processes a sketch and publishes the result if it is still the newest.
    ///
    /// Returns whether this submission's outcome became visible.
    pub async fn submit(&self, bytes: Vec<u8>, mime: impl Into<String>) -> bool {
        let ticket = self.begin();
        debug!(sequence = ticket.0, size = bytes.len(); "Submission started");

        let outcome = match self.run(ticket, bytes, mime.into()).await {
            Ok(Some(sketch)) => Outcome::Ready(sketch),
            Ok(None) => {
                debug!(sequence = ticket.0; "Submission superseded");
                return false;
            }
            Err(err) => Outcome::Failed(err),
        };
        self.complete(ticket, outcome)
    }

    /// Runs the stages, returning `None` once `ticket` is superseded.
    async fn run(
        &self,
        ticket: Ticket,
        bytes: Vec<u8>,
        mime: String,
    ) -> Result<Option<ProcessedSketch>, SketchError> {
        let pipeline = Arc::clone(&self.pipeline);
        let primitives = task::spawn_blocking(move || {
            let bitmap = pipeline.ingest(&bytes, &mime)?;
            pipeline.extract(&bitmap)
        })
        .await
        .map_err(|err| SketchError::Task(err.to_string()))??;
        if !self.is_current(ticket) {
            return Ok(None);
        }

        let pipeline = Arc::clone(&self.pipeline);
        let graph = task::spawn_blocking(move || pipeline.infer(&primitives))
            .await
            .map_err(|err| SketchError::Task(err.to_string()))??;
        if !self.is_current(ticket) {
            return Ok(None);
        }

        let pipeline = Arc::clone(&self.pipeline);
        let (graph, report) = task::spawn_blocking(move || {
            let mut graph = graph;
            let report = pipeline.layout(&mut graph);
            (graph, report)
        })
        .await
        .map_err(|err| SketchError::Task(err.to_string()))?;

        Ok(Some(ProcessedSketch { graph, report }))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{GrayImage, ImageFormat, Luma};

    use super::*;

    fn ring_png() -> Vec<u8> {
        let mut image = GrayImage::from_pixel(200, 200, Luma([255]));
        for y in 0..200 {
            for x in 0..200 {
                let d = ((x as f32 - 100.0).powi(2) + (y as f32 - 100.0).powi(2)).sqrt();
                if (38.0..=41.0).contains(&d) {
                    image.put_pixel(x, y, Luma([0]));
                }
            }
        }
        let mut bytes = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn test_stale_completion_is_discarded() {
        let session = Session::new(SketchPipeline::default());
        let first = session.begin();
        let second = session.begin();
        assert!(!session.is_current(first));

        assert!(!session.complete(first, Outcome::Failed(SketchError::EmptySketch)));
        assert!(session.current().is_none());

        assert!(session.complete(second, Outcome::Failed(SketchError::EmptySketch)));
        assert_eq!(session.current().unwrap().sequence(), 2);

        // Republishing the same ticket changes nothing
        assert!(!session.complete(second, Outcome::Failed(SketchError::EmptySketch)));
    }

    #[tokio::test]
    async fn test_newest_submission_wins() {
        let session = Session::new(SketchPipeline::default());
        let mut receiver = session.subscribe();

        let (first, second) = tokio::join!(
            session.submit(ring_png(), "image/png"),
            session.submit(ring_png(), "image/png"),
        );
        assert!(!first);
        assert!(second);

        assert!(receiver.has_changed().unwrap());
        let published = receiver.borrow_and_update().clone().unwrap();
        assert_eq!(published.sequence(), 2);

        let sketch = published.sketch().unwrap();
        assert_eq!(sketch.graph().node_count(), 1);
        assert!(sketch.graph().is_positioned());
    }

    #[tokio::test]
    async fn test_failures_are_published() {
        let session = Session::new(SketchPipeline::default());
        assert!(session.submit(vec![0, 1, 2], "image/bmp").await);

        let published = session.current().unwrap();
        assert!(matches!(
            published.error(),
            Some(SketchError::UnsupportedFormat { .. })
        ));
        assert!(published.sketch().is_none());
    }
}
