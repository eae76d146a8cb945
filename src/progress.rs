// src/progress.rs
/// Progress reporting for the listing fetch.
/// Reports are advisory; a sink never influences what the pipeline computes.
pub trait ProgressSink {
    /// Called after each page with the cumulative record count and, when the
    /// catalog advertises one, the expected total.
    fn report(&mut self, done: usize, total: Option<usize>);
}

/// A no-op progress sink.
#[cfg(test)]
pub struct NullProgress;

#[cfg(test)]
impl ProgressSink for NullProgress {
    fn report(&mut self, _done: usize, _total: Option<usize>) {}
}

/// Emits one `info` event per report, tagged with the pipeline variant.
pub struct LogProgress {
    label: &'static str,
}

impl LogProgress {
    pub fn new(label: &'static str) -> Self {
        Self { label }
    }
}

impl ProgressSink for LogProgress {
    fn report(&mut self, done: usize, total: Option<usize>) {
        match total {
            Some(total) => {
                tracing::info!(variant = self.label, fetched = done, total, "fetching listings")
            }
            None => tracing::info!(variant = self.label, fetched = done, "fetching listings"),
        }
    }
}

/// Closures work as sinks, which keeps tests short.
impl<F> ProgressSink for F
where
    F: FnMut(usize, Option<usize>),
{
    fn report(&mut self, done: usize, total: Option<usize>) {
        self(done, total)
    }
}
