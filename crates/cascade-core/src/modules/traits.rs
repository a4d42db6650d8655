use crate::domain::{CascadeResult, LineArena, LineRecord, LineRef};

/// Read-only access to transition records addressed by [`LineRef`].
pub trait TransitionSource {
    fn transition(&self, line: LineRef) -> CascadeResult<&LineRecord>;
}

impl TransitionSource for LineArena {
    fn transition(&self, line: LineRef) -> CascadeResult<&LineRecord> {
        self.line(line)
    }
}
