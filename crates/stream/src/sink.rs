use cubecast_common::{CubeId, Resolution};
use std::sync::Mutex;

/// One published camera frame: tightly packed RGB pixels plus identity.
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub camera_id: CubeId,
    pub frame_counter: u64,
    pub resolution: Resolution,
    pub pixels: Vec<u8>,
}

impl CameraFrame {
    /// True if the pixel payload matches the stated resolution.
    pub fn is_well_formed(&self) -> bool {
        self.pixels.len() == self.resolution.byte_len()
    }
}

/// Destination for streamed frames. Implementations must tolerate being
/// called from multiple camera worker threads at once.
pub trait FrameSink: Send + Sync {
    fn publish(&self, frame: CameraFrame);
}

/// Sink that retains every published frame, for tests and offline capture.
#[derive(Debug, Default)]
pub struct CollectingSink {
    frames: Mutex<Vec<CameraFrame>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame_count(&self) -> usize {
        self.frames.lock().expect("sink mutex poisoned").len()
    }

    pub fn take_frames(&self) -> Vec<CameraFrame> {
        std::mem::take(&mut *self.frames.lock().expect("sink mutex poisoned"))
    }

    /// Frames for one camera, in publish order.
    pub fn frames_for(&self, camera_id: CubeId) -> Vec<CameraFrame> {
        self.frames
            .lock()
            .expect("sink mutex poisoned")
            .iter()
            .filter(|f| f.camera_id == camera_id)
            .cloned()
            .collect()
    }
}

impl FrameSink for CollectingSink {
    fn publish(&self, frame: CameraFrame) {
        self.frames.lock().expect("sink mutex poisoned").push(frame);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_well_formedness_checks_byte_length() {
        let res = Resolution::new(4, 4);
        let good = CameraFrame {
            camera_id: CubeId::new(),
            frame_counter: 1,
            resolution: res,
            pixels: vec![0; res.byte_len()],
        };
        assert!(good.is_well_formed());

        let bad = CameraFrame {
            pixels: vec![0; 10],
            ..good.clone()
        };
        assert!(!bad.is_well_formed());
    }

    #[test]
    fn collecting_sink_separates_cameras() {
        let sink = CollectingSink::new();
        let a = CubeId::new();
        let b = CubeId::new();
        for i in 0..3 {
            sink.publish(CameraFrame {
                camera_id: a,
                frame_counter: i,
                resolution: Resolution::new(1, 1),
                pixels: vec![0; 3],
            });
        }
        sink.publish(CameraFrame {
            camera_id: b,
            frame_counter: 0,
            resolution: Resolution::new(1, 1),
            pixels: vec![0; 3],
        });

        assert_eq!(sink.frame_count(), 4);
        assert_eq!(sink.frames_for(a).len(), 3);
        assert_eq!(sink.frames_for(b).len(), 1);
    }
}
