//! Fixed-rate frame loop.
//!
//! Each frame forwards scripted input to the game and draws one frame.
//! A frame that fails is logged and skipped; the loop carries on.

use std::time::{Duration, Instant};

use platformer_core::{DrawSurface, Game, Key};
use tracing::{debug, error, info, warn};

/// Configuration for the frame loop.
#[derive(Debug, Clone)]
pub struct FrameLoopConfig {
    /// Target frames per second.
    pub frame_rate: f64,
    /// Maximum number of frames to run (0 = unlimited).
    pub max_frames: u64,
}

impl Default for FrameLoopConfig {
    fn default() -> Self {
        Self {
            frame_rate: 60.0,
            max_frames: 0,
        }
    }
}

#[derive(Debug)]
pub struct FrameLoop {
    config: FrameLoopConfig,
    frame: u64,
    failed: u64,
    /// Frame on which jump is held for one frame.
    jump_at: Option<u64>,
}

impl FrameLoop {
    #[must_use]
    pub fn new(config: FrameLoopConfig) -> Self {
        Self {
            config,
            frame: 0,
            failed: 0,
            jump_at: None,
        }
    }

    /// Hold jump during frame `frame`.
    #[must_use]
    pub fn with_jump_at(mut self, frame: Option<u64>) -> Self {
        self.jump_at = frame;
        self
    }

    /// Frames run so far.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Frames that ended in an error.
    #[must_use]
    pub fn failed(&self) -> u64 {
        self.failed
    }

    /// Run a single frame.
    pub fn step(&mut self, game: &mut Game, surface: &mut dyn DrawSurface) {
        match self.jump_at {
            Some(at) if at == self.frame => {
                debug!(frame = self.frame, "jump pressed");
                game.key_down(Key::Space);
            }
            Some(at) if at + 1 == self.frame => game.key_up(Key::Space),
            _ => {}
        }

        if let Err(e) = game.draw_frame(surface) {
            self.failed += 1;
            error!(frame = self.frame, error = %e, "frame failed, skipping");
        }
        self.frame += 1;
    }

    /// Run frames at the configured rate until `max_frames` is reached, or
    /// forever.
    pub fn run(&mut self, game: &mut Game, surface: &mut dyn DrawSurface) {
        let frame_duration = Duration::from_secs_f64(1.0 / self.config.frame_rate);
        info!(
            frame_rate = self.config.frame_rate,
            max_frames = self.config.max_frames,
            "starting frame loop"
        );

        loop {
            let start = Instant::now();
            self.step(game, surface);

            if self.config.max_frames > 0 && self.frame >= self.config.max_frames {
                info!(frames = self.frame, failed = self.failed, "frame loop complete");
                break;
            }

            let elapsed = start.elapsed();
            if elapsed < frame_duration {
                std::thread::sleep(frame_duration - elapsed);
            } else {
                warn!(
                    frame = self.frame,
                    elapsed_ms = elapsed.as_millis() as u64,
                    budget_ms = frame_duration.as_millis() as u64,
                    "frame exceeded time budget"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use platformer_core::{Database, GameConfig};

    use super::*;
    use crate::host::CountingSurface;

    #[test]
    fn test_failed_frames_are_skipped() {
        // No resources were created, so every frame fails.
        let mut game = Game::with_database(GameConfig::default(), Database::with_seed(1));
        let mut surface = CountingSurface::default();
        let mut frames = FrameLoop::new(FrameLoopConfig {
            frame_rate: 1000.0,
            max_frames: 5,
        });
        frames.run(&mut game, &mut surface);

        assert_eq!(frames.frame(), 5);
        assert_eq!(frames.failed(), 5);
        assert_eq!(surface.lines, 0);
    }

    #[test]
    fn test_jump_is_held_for_one_frame() {
        let mut game = Game::with_database(GameConfig::default(), Database::with_seed(1));
        let mut surface = CountingSurface::default();
        let mut frames = FrameLoop::new(FrameLoopConfig::default()).with_jump_at(Some(1));

        frames.step(&mut game, &mut surface);
        assert!(!game.keys().jump());
        frames.step(&mut game, &mut surface);
        assert!(game.keys().jump());
        frames.step(&mut game, &mut surface);
        assert!(!game.keys().jump());
    }
}
