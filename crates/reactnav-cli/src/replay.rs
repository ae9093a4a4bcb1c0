//! JSON-lines replay: one `ScanMessage` per line, fed through the
//! navigation loop in file order.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use reactnav_runtime::{LoopSummary, NavLoop};
use reactnav_types::{NavError, ScanMessage};
use tokio::sync::watch;
use tracing::{info, warn};

/// Iterator over the messages of a replay file.
///
/// Blank lines are skipped.  A line that is not a valid message yields
/// [`NavError::Parsing`] tagged with its line number; a read error ends the
/// replay.
pub struct ReplayReader<R> {
    lines: std::io::Lines<R>,
    line_no: usize,
}

impl<R: BufRead> ReplayReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            lines: reader.lines(),
            line_no: 0,
        }
    }
}

impl ReplayReader<BufReader<File>> {
    /// # Errors
    ///
    /// [`NavError::Config`] when the file cannot be opened.
    pub fn open(path: &Path) -> Result<Self, NavError> {
        let file = File::open(path).map_err(|e| {
            NavError::Config(format!("cannot open replay file {}: {e}", path.display()))
        })?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> Iterator for ReplayReader<R> {
    type Item = Result<ScanMessage, NavError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => {
                    warn!(line = self.line_no + 1, error = %e, "replay read failed; stopping");
                    return None;
                }
            };
            self.line_no += 1;
            if line.trim().is_empty() {
                continue;
            }
            return Some(serde_json::from_str(&line).map_err(|e| {
                NavError::Parsing(format!("replay line {}: {e}", self.line_no))
            }));
        }
    }
}

/// Feed every message through `nav` until the file ends, `shutdown` fires or
/// `nav` has counted `max_cycles` cycles.  Unreadable lines count as skipped
/// cycles.  The robot is stopped at the
/// end.
///
/// # Errors
///
/// Returns the first fatal error.
pub fn run_replay<R: BufRead>(
    reader: ReplayReader<R>,
    nav: &mut NavLoop,
    shutdown: &watch::Receiver<bool>,
    max_cycles: Option<u64>,
) -> Result<LoopSummary, NavError> {
    let mut result = Ok(());
    for message in reader {
        if *shutdown.borrow() {
            info!("shutdown requested");
            break;
        }
        let cycles = nav.summary().cycles;
        if max_cycles.is_some_and(|max| cycles >= max) {
            info!(cycles, "cycle limit reached");
            break;
        }
        let outcome = match message {
            Ok(msg) => nav.process_message(msg),
            Err(e) => nav.reject(e),
        };
        if let Err(e) = outcome {
            result = Err(e);
            break;
        }
    }
    nav.halt();
    result.map(|()| nav.summary())
}
