use anyhow::Result;
use tracing::{debug, warn};

use crate::config::Config;
use crate::hand::Landmark;
use crate::normalizer::{HandFrame, HandPoseNormalizer};
use crate::source::{Detection, LandmarkSource};

/// 1フレームの処理結果
#[derive(Debug)]
pub enum FrameOutcome {
    /// 手なし。パイプラインは実行しない
    NoHand,
    /// 推定できた
    Hand {
        landmarks: Vec<Landmark>,
        frame: HandFrame,
    },
    /// 前提条件違反で破棄したフレーム
    Rejected(anyhow::Error),
}

/// 検出器からの入力を1フレームずつ推定器に流す
pub struct HandSession<S> {
    source: S,
    normalizer: HandPoseNormalizer,
    frames: u64,
    hands: u64,
}

impl<S: LandmarkSource> HandSession<S> {
    pub fn new(source: S, config: &Config) -> Result<Self> {
        let mut normalizer = HandPoseNormalizer::from_config(config)?;
        if let Some((height, width)) = source.frame_size() {
            normalizer.set_size(height, width)?;
        }
        Ok(Self {
            source,
            normalizer,
            frames: 0,
            hands: 0,
        })
    }

    pub fn normalizer(&self) -> &HandPoseNormalizer {
        &self.normalizer
    }

    /// 処理したフレーム数と手が見つかったフレーム数
    pub fn counts(&self) -> (u64, u64) {
        (self.frames, self.hands)
    }

    /// 新しいセッション（基準姿勢をリセット）
    pub fn reset(&mut self) {
        self.normalizer.reset();
    }

    /// 次のフレームを処理。ストリーム終端で None
    ///
    /// 入力の読み取りエラーは返し、ランドマークの前提条件違反は
    /// `FrameOutcome::Rejected` としてフレーム単位で捨てる。
    pub fn step(&mut self) -> Result<Option<FrameOutcome>> {
        let detection = match self.source.next_detection()? {
            Some(d) => d,
            None => return Ok(None),
        };
        self.frames += 1;

        let landmarks = match detection {
            Detection::NoHand => {
                debug!(frame = self.frames, "no hand detected");
                return Ok(Some(FrameOutcome::NoHand));
            }
            Detection::Hand(landmarks) => landmarks,
        };

        match self.normalizer.process(&landmarks) {
            Ok(frame) => {
                self.hands += 1;
                Ok(Some(FrameOutcome::Hand { landmarks, frame }))
            }
            Err(e) => {
                warn!(frame = self.frames, "frame rejected: {:#}", e);
                Ok(Some(FrameOutcome::Rejected(e)))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalizer::tests::synthetic_hand;
    use std::collections::VecDeque;

    struct QueueSource {
        frames: VecDeque<Detection>,
        size: Option<(u32, u32)>,
    }

    impl LandmarkSource for QueueSource {
        fn next_detection(&mut self) -> Result<Option<Detection>> {
            Ok(self.frames.pop_front())
        }

        fn frame_size(&self) -> Option<(u32, u32)> {
            self.size
        }
    }

    fn session(frames: Vec<Detection>) -> HandSession<QueueSource> {
        let source = QueueSource {
            frames: frames.into(),
            size: Some((600, 800)),
        };
        HandSession::new(source, &Config::default()).unwrap()
    }

    #[test]
    fn test_no_hand_skips_pipeline() {
        let mut s = session(vec![Detection::NoHand]);
        assert!(matches!(s.step().unwrap(), Some(FrameOutcome::NoHand)));
        assert!(!s.normalizer().has_reference());
        assert!(s.step().unwrap().is_none());
        assert_eq!(s.counts(), (1, 0));
    }

    #[test]
    fn test_reference_from_first_hand_after_no_hand() {
        let first = synthetic_hand((300.0, 500.0), 0.0, 1.0);
        let second = synthetic_hand((300.0, 500.0), 0.0, 1.5);
        let mut s = session(vec![
            Detection::NoHand,
            Detection::Hand(first),
            Detection::Hand(second),
        ]);

        s.step().unwrap();
        s.step().unwrap();
        let reference = s.normalizer().reference().cloned();
        assert!(reference.is_some());

        match s.step().unwrap() {
            Some(FrameOutcome::Hand { frame, .. }) => assert!(frame.depth > 0.0),
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(s.normalizer().reference().cloned(), reference);
        assert_eq!(s.counts(), (3, 2));
    }

    #[test]
    fn test_malformed_hand_is_rejected_not_fatal() {
        let short = synthetic_hand((300.0, 500.0), 0.0, 1.0)[..10].to_vec();
        let mut s = session(vec![
            Detection::Hand(short),
            Detection::Hand(synthetic_hand((300.0, 500.0), 0.0, 1.0)),
        ]);

        assert!(matches!(s.step().unwrap(), Some(FrameOutcome::Rejected(_))));
        assert!(!s.normalizer().has_reference());
        assert!(matches!(s.step().unwrap(), Some(FrameOutcome::Hand { .. })));
        assert!(s.normalizer().has_reference());
    }

    #[test]
    fn test_source_frame_size_overrides_config() {
        let s = session(vec![]);
        assert_eq!(s.normalizer().transform().height(), 600.0);
        assert_eq!(s.normalizer().transform().width(), 800.0);
    }

    #[test]
    fn test_reset_clears_reference() {
        let mut s = session(vec![Detection::Hand(synthetic_hand((300.0, 500.0), 0.0, 1.0))]);
        s.step().unwrap();
        s.reset();
        assert!(!s.normalizer().has_reference());
    }
}
