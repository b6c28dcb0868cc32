// Decision trail for the pairing engine
//
// Every match decision flows through an injected sink so callers and tests
// can observe the trail without parsing log output. The default sink
// forwards to the log facade.

use std::path::PathBuf;

use super::classify::MediaVersion;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    ExtensionMismatch,
    OrdinalMismatch,
}

#[derive(Debug, Clone)]
pub enum DecisionEvent {
    /// A media filename was classified into a descriptor.
    MediaClassified {
        media: PathBuf,
        stem: String,
        version: MediaVersion,
        ordinal: Option<u32>,
    },
    /// The "(1)" heuristic decided between edited variant and duplicate copy.
    EditedHeuristic { stem: String, edited: bool },
    /// A stem-matching record was ruled out.
    CandidateRejected {
        media: PathBuf,
        record: PathBuf,
        reason: RejectReason,
    },
    /// A record passed stem and ordinal filtering.
    CandidateAccepted {
        media: PathBuf,
        record: PathBuf,
        similarity: f64,
    },
    /// The winning record for a media file. `tied` reports that another
    /// candidate scored equally and lost only on record order.
    Assigned {
        media: PathBuf,
        record: PathBuf,
        similarity: f64,
        tied: bool,
    },
    MediaUnmatched { media: PathBuf },
    RecordUnmatched { record: PathBuf },
}

pub trait DecisionSink {
    fn record(&mut self, event: DecisionEvent);
}

/// Default sink: forwards the trail to the log facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl DecisionSink for LogSink {
    fn record(&mut self, event: DecisionEvent) {
        match event {
            DecisionEvent::MediaClassified {
                media,
                stem,
                version,
                ordinal,
            } => {
                log::debug!(
                    "classified {} -> stem '{}' {:?} ordinal {:?}",
                    media.display(),
                    stem,
                    version,
                    ordinal
                );
            }
            DecisionEvent::EditedHeuristic { stem, edited } => {
                let reading = if edited {
                    "edited marker"
                } else {
                    "duplicate counter"
                };
                log::debug!("'(1)' suffix on stem '{}' read as {}", stem, reading);
            }
            DecisionEvent::CandidateRejected {
                media,
                record,
                reason,
            } => {
                log::debug!(
                    "found but not matched: {} vs {} ({:?})",
                    media.display(),
                    record.display(),
                    reason
                );
            }
            DecisionEvent::CandidateAccepted {
                media,
                record,
                similarity,
            } => {
                log::debug!(
                    "candidate {} for {} (similarity {:.3})",
                    record.display(),
                    media.display(),
                    similarity
                );
            }
            DecisionEvent::Assigned {
                media,
                record,
                similarity,
                tied,
            } => {
                if tied {
                    log::warn!(
                        "similarity tie for {}; kept first record {}",
                        media.display(),
                        record.display()
                    );
                } else {
                    log::debug!(
                        "assigned {} -> {} (similarity {:.3})",
                        media.display(),
                        record.display(),
                        similarity
                    );
                }
            }
            DecisionEvent::MediaUnmatched { media } => {
                log::warn!("no matching record for {}", media.display());
            }
            DecisionEvent::RecordUnmatched { record } => {
                log::warn!("no media matched record {}", record.display());
            }
        }
    }
}

/// Collects the trail in memory for tests and diagnostics.
#[derive(Debug, Default)]
pub struct CollectingSink {
    pub events: Vec<DecisionEvent>,
}

impl DecisionSink for CollectingSink {
    fn record(&mut self, event: DecisionEvent) {
        self.events.push(event);
    }
}
