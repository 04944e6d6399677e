/// Progress reporting for the compression pipeline
///
/// The pipeline owns the 0-50 range of the progress bar; the remaining
/// 50-100 belongs to the caller's upload phase, so a reporter never emits
/// a value above [`UPLOAD_HANDOFF`].

/// The pipeline's terminal progress value; upload progress starts here
pub const UPLOAD_HANDOFF: u8 = 50;

/// Wraps the caller's progress callback and enforces the reporting
/// contract: values are strictly increasing within one compression call
/// and capped at [`UPLOAD_HANDOFF`]. Repeated or regressing values are
/// swallowed rather than surfaced.
pub struct ProgressReporter {
    callback: Box<dyn FnMut(u8) + Send>,
    last: Option<u8>,
}

impl ProgressReporter {
    /// Wrap a progress callback
    pub fn new(callback: impl FnMut(u8) + Send + 'static) -> Self {
        Self {
            callback: Box::new(callback),
            last: None,
        }
    }

    /// Report progress, clamped to the pipeline's range.
    /// Values that do not advance past the previous report are dropped.
    pub fn emit(&mut self, percent: u8) {
        let percent = percent.min(UPLOAD_HANDOFF);
        if self.last.map_or(true, |last| percent > last) {
            self.last = Some(percent);
            (self.callback)(percent);
        }
    }

    /// Report the terminal value for the pipeline's half of the bar
    pub fn finish(&mut self) {
        self.emit(UPLOAD_HANDOFF);
    }
}
