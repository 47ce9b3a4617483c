use std::fmt;
use std::time::Duration;

use crate::error::AutolinkError;

/// Progress of an index rebuild, as shown in a status line.
#[derive(Clone, Debug, PartialEq)]
pub enum RebuildStatus {
    Searching {
        processed: usize,
        total: usize,
        /// Estimated seconds until every document has been read.
        eta_seconds: Option<f64>,
    },
    Indexing,
    Updated {
        elapsed: Duration,
    },
    Failed,
}

impl fmt::Display for RebuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RebuildStatus::Searching {
                processed,
                total,
                eta_seconds,
            } => {
                write!(f, "Searching files... {processed}/{total} processed")?;
                if let Some(eta) = eta_seconds {
                    write!(f, " ({eta:.1}s)")?;
                }
                Ok(())
            }
            RebuildStatus::Indexing => f.write_str("Indexing link database..."),
            RebuildStatus::Updated { elapsed } => {
                write!(f, "Updated in {}ms", elapsed.as_millis())
            }
            RebuildStatus::Failed => f.write_str("Error updating index"),
        }
    }
}

/// Receives rebuild progress.
pub trait RebuildObserver: Send + Sync {
    fn report(&self, status: &RebuildStatus);

    fn report_error(&self, err: &AutolinkError) {
        let _ = err;
        self.report(&RebuildStatus::Failed);
    }
}

/// Observer that writes status lines to the `tracing` pipeline.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl RebuildObserver for TracingObserver {
    fn report(&self, status: &RebuildStatus) {
        match status {
            RebuildStatus::Searching { .. } => tracing::trace!("{status}"),
            RebuildStatus::Failed => tracing::warn!("{status}"),
            _ => tracing::debug!("{status}"),
        }
    }

    fn report_error(&self, err: &AutolinkError) {
        tracing::warn!(error = %err, "{}", RebuildStatus::Failed);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_lines_render_like_a_status_bar() {
        let searching = RebuildStatus::Searching {
            processed: 3,
            total: 10,
            eta_seconds: Some(2.0),
        };
        assert_eq!(searching.to_string(), "Searching files... 3/10 processed (2.0s)");

        let starting = RebuildStatus::Searching {
            processed: 0,
            total: 10,
            eta_seconds: None,
        };
        assert_eq!(starting.to_string(), "Searching files... 0/10 processed");

        assert_eq!(RebuildStatus::Indexing.to_string(), "Indexing link database...");
        assert_eq!(
            RebuildStatus::Updated {
                elapsed: Duration::from_millis(42)
            }
            .to_string(),
            "Updated in 42ms"
        );
        assert_eq!(RebuildStatus::Failed.to_string(), "Error updating index");
    }
}
