//! Reading the page for a pass.
//!
//! A [`Sampler`] either answers a request on the spot ([`InlineSampler`]) or
//! hands it to a worker thread that owns the source and posts the markup
//! back as [`Event::Sampled`] ([`ThreadSampler`]). Either way the rest of
//! the pass runs on the controller's thread.

use std::sync::mpsc;
use std::thread;

use super::scheduler::Waker;
use super::Event;
use crate::net::{PageSource, SourceError};

/// Markup read for one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    pub html: Result<String, SourceError>,
    /// Render even when the text length has not moved.
    pub force: bool,
}

pub trait Sampler {
    /// Ask for the current page. `Some` when the sample is ready now,
    /// `None` when it will arrive later as [`Event::Sampled`].
    fn request(&mut self, force: bool) -> Option<Sample>;
}

/// Reads the source on the caller's thread.
pub struct InlineSampler<P: PageSource> {
    source: P,
}

impl<P: PageSource> InlineSampler<P> {
    pub fn new(source: P) -> Self {
        Self { source }
    }

    pub fn source_mut(&mut self) -> &mut P {
        &mut self.source
    }
}

impl<P: PageSource> Sampler for InlineSampler<P> {
    fn request(&mut self, force: bool) -> Option<Sample> {
        Some(Sample {
            html: self.source.snapshot(),
            force,
        })
    }
}

/// Worker thread that owns the source. Requests that pile up while a read
/// is in flight are folded into one.
pub struct ThreadSampler {
    requests: mpsc::Sender<bool>,
}

impl ThreadSampler {
    pub fn spawn<P>(source: P, tx: mpsc::Sender<Event>, waker: Option<Waker>) -> Self
    where
        P: PageSource + Send + 'static,
    {
        let (requests, pending) = mpsc::channel::<bool>();
        let origin = source.describe();

        thread::spawn(move || {
            let mut source = source;
            while let Ok(mut force) = pending.recv() {
                while let Ok(more) = pending.try_recv() {
                    force |= more;
                }
                let html = source.snapshot();
                if tx.send(Event::Sampled(Sample { html, force })).is_err() {
                    break;
                }
                if let Some(ref wake) = waker {
                    wake();
                }
            }
            log::debug!("Token Gauge: sampler for {} finished", origin);
        });

        Self { requests }
    }
}

impl Sampler for ThreadSampler {
    fn request(&mut self, force: bool) -> Option<Sample> {
        if self.requests.send(force).is_err() {
            log::warn!("Token Gauge: sampler thread is gone");
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{StaticSource, UrlSource, FETCH_TIMEOUT};
    use std::net::TcpListener;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    /// Accepts connections and never answers them.
    fn silent_host() -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        thread::spawn(move || {
            let mut held = Vec::new();
            for stream in listener.incoming() {
                match stream {
                    Ok(stream) => held.push(stream),
                    Err(_) => break,
                }
            }
        });
        format!("http://127.0.0.1:{}/chat", port)
    }

    #[test]
    fn inline_sampler_answers_immediately() {
        let mut sampler = InlineSampler::new(StaticSource::new("<p>hi</p>"));
        assert_eq!(
            sampler.request(true),
            Some(Sample {
                html: Ok("<p>hi</p>".into()),
                force: true,
            })
        );
    }

    #[test]
    fn thread_sampler_posts_samples_and_wakes() {
        let (tx, rx) = mpsc::channel();
        let woken = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&woken);
        let mut sampler = ThreadSampler::spawn(
            StaticSource::new("<p>hi</p>"),
            tx,
            Some(Arc::new(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })),
        );

        assert_eq!(sampler.request(false), None);
        match rx.recv_timeout(Duration::from_secs(5)) {
            Ok(Event::Sampled(sample)) => assert_eq!(sample.html, Ok("<p>hi</p>".into())),
            other => panic!("expected a sample, got {other:?}"),
        }
        assert!(woken.load(Ordering::SeqCst) >= 1);
    }

    #[test]
    fn unresponsive_host_does_not_block_the_requester() {
        let (tx, rx) = mpsc::channel();
        let source = UrlSource::new(&silent_host()).unwrap();
        let mut sampler = ThreadSampler::spawn(source, tx, None);

        let started = Instant::now();
        assert_eq!(sampler.request(false), None);
        assert_eq!(sampler.request(true), None);
        assert!(started.elapsed() < Duration::from_millis(500));

        // The worker gives up on its own after the fetch timeout.
        match rx.recv_timeout(FETCH_TIMEOUT + Duration::from_secs(10)) {
            Ok(Event::Sampled(sample)) => assert!(sample.html.is_err()),
            other => panic!("expected a failed sample, got {other:?}"),
        }
    }
}
