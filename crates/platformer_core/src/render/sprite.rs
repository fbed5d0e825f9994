//! Frame-cycling sprites.
//!
//! All three animation kinds share one [`Sprite`] type and differ only in
//! their [`Animation`] tag:
//!
//! - `Plain` hands out the current frame and moves to the next one.
//! - `Timed` holds each frame for `delay` calls; on the call that reaches
//!   the delay it moves to the next frame and returns it.
//! - `Directional` is timed and adds a second frame set shown while
//!   `reverse` is set.
//!
//! A delay of 0 or 1 advances on every call and behaves like `Plain`.

use crate::data::DataMap;
use crate::error::{CoreError, Result};
use crate::host::Bitmap;

/// The animation kind of a [`Sprite`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Animation {
    Plain,
    Timed {
        delay: u8,
    },
    Directional {
        delay: u8,
        reverse_frames: Vec<Bitmap>,
        reverse: bool,
    },
}

impl Animation {
    fn delay(&self) -> u8 {
        match self {
            Animation::Plain => 0,
            Animation::Timed { delay } | Animation::Directional { delay, .. } => *delay,
        }
    }
}

/// A cyclic sequence of frames with its own playback position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sprite {
    frames: Vec<Bitmap>,
    index: usize,
    tick: u8,
    animation: Animation,
}

impl Sprite {
    /// A sprite that advances on every call.
    ///
    /// # Errors
    ///
    /// [`CoreError::EmptySprite`] if `frames` is empty.
    pub fn plain(frames: Vec<Bitmap>) -> Result<Self> {
        Self::build(frames, Animation::Plain)
    }

    /// A sprite that holds each frame for `delay` calls.
    ///
    /// # Errors
    ///
    /// [`CoreError::EmptySprite`] if `frames` is empty.
    pub fn timed(frames: Vec<Bitmap>, delay: u8) -> Result<Self> {
        Self::build(frames, Animation::Timed { delay })
    }

    /// A timed sprite with a mirrored frame set.
    ///
    /// # Errors
    ///
    /// [`CoreError::EmptySprite`] if `frames` is empty,
    /// [`CoreError::FrameCountMismatch`] if the two sets differ in length.
    pub fn directional(frames: Vec<Bitmap>, reverse_frames: Vec<Bitmap>, delay: u8) -> Result<Self> {
        if frames.len() != reverse_frames.len() {
            return Err(CoreError::FrameCountMismatch {
                forward: frames.len(),
                reverse: reverse_frames.len(),
            });
        }
        Self::build(
            frames,
            Animation::Directional {
                delay,
                reverse_frames,
                reverse: false,
            },
        )
    }

    fn build(frames: Vec<Bitmap>, animation: Animation) -> Result<Self> {
        if frames.is_empty() {
            return Err(CoreError::EmptySprite);
        }
        Ok(Self {
            frames,
            index: 0,
            tick: 0,
            animation,
        })
    }

    /// Build a sprite from a loaded sprite data map and lock the map.
    ///
    /// Reads `length`, the optional `timed` and `directional` flags, `wait`
    /// when timed, and the images `frame0..` (plus `rframe0..` when
    /// directional).
    ///
    /// # Errors
    ///
    /// [`CoreError::ConsumedDataMap`] if the map is already locked,
    /// [`CoreError::MissingProperty`] listing every absent key, or a
    /// property type error.
    pub fn from_data_map(map: &mut DataMap) -> Result<Self> {
        if map.is_locked() {
            return Err(CoreError::ConsumedDataMap);
        }
        map.lock();

        map.check_for_set(&["length"])?;
        let length = map.byte("length")?;
        let timed = map.has("timed") && map.bool("timed")?;
        let directional = map.has("directional") && map.bool("directional")?;

        let mut required: Vec<String> = (0..length).map(|n| format!("frame{n}")).collect();
        if directional {
            required.extend((0..length).map(|n| format!("rframe{n}")));
        }
        if timed {
            required.push("wait".to_string());
        }
        let required: Vec<&str> = required.iter().map(String::as_str).collect();
        map.check_for_set(&required)?;

        let frames = (0..length)
            .map(|n| map.image(&format!("frame{n}")))
            .collect::<Result<Vec<_>>>()?;
        let delay = if timed { map.byte("wait")? } else { 0 };

        if directional {
            let reverse = (0..length)
                .map(|n| map.image(&format!("rframe{n}")))
                .collect::<Result<Vec<_>>>()?;
            Self::directional(frames, reverse, delay)
        } else if timed {
            Self::timed(frames, delay)
        } else {
            Self::plain(frames)
        }
    }

    /// Number of frames.
    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn animation(&self) -> &Animation {
        &self.animation
    }

    /// Position of the frame that will be shown next.
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn is_directional(&self) -> bool {
        matches!(self.animation, Animation::Directional { .. })
    }

    #[must_use]
    pub fn reverse(&self) -> bool {
        matches!(self.animation, Animation::Directional { reverse: true, .. })
    }

    /// Switch between the forward and reverse frame sets. A change rewinds
    /// the sprite to its first frame. Ignored by non-directional sprites.
    pub fn set_reverse(&mut self, value: bool) {
        if let Animation::Directional { reverse, .. } = &mut self.animation {
            if *reverse != value {
                *reverse = value;
                self.index = 0;
            }
        }
    }

    /// Rewind to the first frame.
    pub fn reset(&mut self) {
        self.index = 0;
    }

    /// Returns the frame to draw for this call and advances the animation.
    ///
    /// Reversed playback always advances before returning, whatever the delay.
    pub fn next_frame(&mut self) -> Bitmap {
        let delay = self.animation.delay();
        if delay <= 1 && !self.reverse() {
            let shown = self.index;
            self.advance();
            return self.frame_at(shown);
        }
        self.tick += 1;
        if self.tick >= delay {
            self.tick = 0;
            self.advance();
        }
        self.frame_at(self.index)
    }

    fn advance(&mut self) {
        self.index += 1;
        if self.index >= self.frames.len() {
            self.index = 0;
        }
    }

    fn frame_at(&self, index: usize) -> Bitmap {
        match &self.animation {
            Animation::Directional {
                reverse: true,
                reverse_frames,
                ..
            } => reverse_frames[index],
            _ => self.frames[index],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Value;

    const A: Bitmap = Bitmap(10);
    const B: Bitmap = Bitmap(11);
    const C: Bitmap = Bitmap(12);
    const D: Bitmap = Bitmap(13);

    fn take(sprite: &mut Sprite, n: usize) -> Vec<Bitmap> {
        (0..n).map(|_| sprite.next_frame()).collect()
    }

    #[test]
    fn test_plain_cycles_through_frames() {
        let mut sprite = Sprite::plain(vec![A, B, C, D]).unwrap();
        assert_eq!(take(&mut sprite, 6), vec![A, B, C, D, A, B]);
    }

    #[test]
    fn test_timed_holds_each_frame() {
        let mut sprite = Sprite::timed(vec![A, B], 3).unwrap();
        assert_eq!(take(&mut sprite, 6), vec![A, A, B, B, B, A]);
    }

    #[test]
    fn test_timed_with_small_delay_behaves_like_plain() {
        let mut timed = Sprite::timed(vec![A, B, C], 1).unwrap();
        let mut plain = Sprite::plain(vec![A, B, C]).unwrap();
        assert_eq!(take(&mut timed, 5), take(&mut plain, 5));
    }

    #[test]
    fn test_directional_uses_reverse_frames() {
        let mut sprite = Sprite::directional(vec![A, B], vec![C, D], 0).unwrap();
        assert_eq!(take(&mut sprite, 2), vec![A, B]);
        sprite.set_reverse(true);
        assert!(sprite.reverse());
        assert_eq!(take(&mut sprite, 3), vec![D, C, D]);
    }

    #[test]
    fn test_untimed_reverse_advances_before_returning() {
        let mut sprite = Sprite::directional(vec![A, B, C], vec![D, C, B], 0).unwrap();
        sprite.set_reverse(true);
        assert_eq!(take(&mut sprite, 4), vec![C, B, D, C]);
        sprite.set_reverse(false);
        assert_eq!(take(&mut sprite, 2), vec![A, B]);
    }

    #[test]
    fn test_directional_toggle_rewinds() {
        let mut sprite = Sprite::directional(vec![A, B, C], vec![D, D, D], 2).unwrap();
        sprite.next_frame();
        sprite.next_frame();
        assert_eq!(sprite.index(), 1);
        sprite.set_reverse(true);
        assert_eq!(sprite.index(), 0);
        // Setting the same value again does not rewind.
        sprite.next_frame();
        sprite.next_frame();
        sprite.set_reverse(true);
        assert_eq!(sprite.index(), 1);
    }

    #[test]
    fn test_directional_reverse_keeps_timing() {
        let mut sprite = Sprite::directional(vec![A, B], vec![C, D], 2).unwrap();
        sprite.set_reverse(true);
        assert_eq!(take(&mut sprite, 4), vec![C, D, D, C]);
    }

    #[test]
    fn test_set_reverse_ignored_for_plain() {
        let mut sprite = Sprite::plain(vec![A, B]).unwrap();
        sprite.next_frame();
        sprite.set_reverse(true);
        assert!(!sprite.reverse());
        assert_eq!(sprite.index(), 1);
    }

    #[test]
    fn test_constructor_errors() {
        assert!(matches!(Sprite::plain(vec![]), Err(CoreError::EmptySprite)));
        assert!(matches!(
            Sprite::directional(vec![A, B], vec![C], 0),
            Err(CoreError::FrameCountMismatch { forward: 2, reverse: 1 })
        ));
    }

    #[test]
    fn test_from_data_map_builds_timed_sprite() {
        let mut map = DataMap::new(0);
        map.insert("length", Value::Byte(2));
        map.insert("timed", Value::Bool(true));
        map.insert("wait", Value::Byte(4));
        map.insert("frame0", Value::Image(A));
        map.insert("frame1", Value::Image(B));

        let sprite = Sprite::from_data_map(&mut map).unwrap();
        assert_eq!(sprite.animation(), &Animation::Timed { delay: 4 });
        assert_eq!(sprite.len(), 2);
        assert!(map.is_locked());
        assert!(matches!(
            Sprite::from_data_map(&mut map),
            Err(CoreError::ConsumedDataMap)
        ));
    }

    #[test]
    fn test_from_data_map_reports_all_missing_frames() {
        let mut map = DataMap::new(0);
        map.insert("length", Value::Byte(2));
        map.insert("directional", Value::Bool(true));
        map.insert("frame0", Value::Image(A));

        match Sprite::from_data_map(&mut map) {
            Err(CoreError::MissingProperty(missing)) => {
                assert_eq!(missing, vec!["frame1", "rframe0", "rframe1"]);
            }
            other => panic!("expected MissingProperty, got {other:?}"),
        }
    }
}
