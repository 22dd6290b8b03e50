/// Something that invalidates the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// A fresh flight snapshot arrived
    Flights,
    /// The selected flight changed
    Selection,
    /// Pan, zoom or resize
    Viewport,
}

/// Why a frame is being redrawn; several triggers can fold into one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RedrawReasons {
    pub flights: bool,
    pub selection: bool,
    pub viewport: bool,
}

impl RedrawReasons {
    fn add(&mut self, trigger: Trigger) {
        match trigger {
            Trigger::Flights => self.flights = true,
            Trigger::Selection => self.selection = true,
            Trigger::Viewport => self.viewport = true,
        }
    }
}

/// A redraw the host should run now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRequest {
    pub frame_sequence_id: u64,
    pub reasons: RedrawReasons,
    /// Triggers folded into this frame
    pub triggers: u32,
}

/// Coalesces redraw triggers into at most one pending frame.
///
/// Triggers only mark the frame dirty. Nothing is computed until the host's
/// frame callback calls [`RenderScheduler::take_frame`], so the redraw sees
/// whatever state is current at that moment.
#[derive(Debug, Clone, Default)]
pub struct RenderScheduler {
    pending: Option<RedrawReasons>,
    triggers: u32,
    frame_sequence_id: u64,
}

impl RenderScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the next frame dirty. Returns `true` if this trigger scheduled a
    /// frame, `false` if one was already pending and absorbed it.
    pub fn request(&mut self, trigger: Trigger) -> bool {
        self.triggers = self.triggers.saturating_add(1);
        match &mut self.pending {
            Some(reasons) => {
                reasons.add(trigger);
                false
            }
            None => {
                let mut reasons = RedrawReasons::default();
                reasons.add(trigger);
                self.pending = Some(reasons);
                true
            }
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Frame callback: hand out the pending redraw, if any, and disarm
    pub fn take_frame(&mut self) -> Option<FrameRequest> {
        let reasons = self.pending.take()?;
        self.frame_sequence_id += 1;
        let triggers = std::mem::take(&mut self.triggers);
        Some(FrameRequest {
            frame_sequence_id: self.frame_sequence_id,
            reasons,
            triggers,
        })
    }

    /// Drop a pending redraw without running it
    pub fn cancel(&mut self) {
        self.pending = None;
        self.triggers = 0;
    }

    /// Frames handed out so far
    pub fn frames_issued(&self) -> u64 {
        self.frame_sequence_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_scheduler_has_no_frame() {
        let mut scheduler = RenderScheduler::new();
        assert!(!scheduler.is_pending());
        assert_eq!(scheduler.take_frame(), None);
    }

    #[test]
    fn burst_of_triggers_folds_into_one_frame() {
        let mut scheduler = RenderScheduler::new();
        assert!(scheduler.request(Trigger::Viewport));
        for _ in 0..3 {
            assert!(!scheduler.request(Trigger::Viewport));
            assert!(!scheduler.request(Trigger::Selection));
            assert!(!scheduler.request(Trigger::Flights));
        }

        let frame = scheduler.take_frame().unwrap();
        assert_eq!(frame.frame_sequence_id, 1);
        assert_eq!(frame.triggers, 10);
        assert_eq!(
            frame.reasons,
            RedrawReasons {
                flights: true,
                selection: true,
                viewport: true
            }
        );
        assert_eq!(scheduler.take_frame(), None);
    }

    #[test]
    fn trigger_after_frame_schedules_next() {
        let mut scheduler = RenderScheduler::new();
        scheduler.request(Trigger::Flights);
        scheduler.take_frame();
        assert!(scheduler.request(Trigger::Selection));
        let frame = scheduler.take_frame().unwrap();
        assert_eq!(frame.frame_sequence_id, 2);
        assert!(frame.reasons.selection && !frame.reasons.flights);
    }

    #[test]
    fn cancel_drops_pending_frame() {
        let mut scheduler = RenderScheduler::new();
        scheduler.request(Trigger::Viewport);
        scheduler.cancel();
        assert_eq!(scheduler.take_frame(), None);
        assert_eq!(scheduler.frames_issued(), 0);
    }
}
