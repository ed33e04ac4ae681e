use anyhow::{bail, Result};
use serde::Deserialize;

/// 手ランドマークの 21 点インデックス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum HandLandmark {
    Wrist = 0,
    ThumbCmc = 1,
    ThumbMcp = 2,
    ThumbIp = 3,
    ThumbTip = 4,
    IndexMcp = 5,
    IndexPip = 6,
    IndexDip = 7,
    IndexTip = 8,
    MiddleMcp = 9,
    MiddlePip = 10,
    MiddleDip = 11,
    MiddleTip = 12,
    RingMcp = 13,
    RingPip = 14,
    RingDip = 15,
    RingTip = 16,
    PinkyMcp = 17,
    PinkyPip = 18,
    PinkyDip = 19,
    PinkyTip = 20,
}

impl HandLandmark {
    pub const COUNT: usize = 21;
}

/// 検出器から受け取る単一ランドマーク (画像ピクセル座標, 原点左上, y下向き)
///
/// 記録ファイルでは `[id, x, y]` の3要素配列として表現される。
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(from = "(u32, f32, f32)")]
pub struct Landmark {
    pub id: u32,
    pub x: f32,
    pub y: f32,
}

impl Landmark {
    pub fn new(id: u32, x: f32, y: f32) -> Self {
        Self { id, x, y }
    }
}

impl From<(u32, f32, f32)> for Landmark {
    fn from((id, x, y): (u32, f32, f32)) -> Self {
        Self::new(id, x, y)
    }
}

impl Default for Landmark {
    fn default() -> Self {
        Self {
            id: 0,
            x: 0.0,
            y: 0.0,
        }
    }
}

/// 1フレーム分の生ランドマーク (ちょうど21点)
#[derive(Debug, Clone)]
pub struct RawLandmarks {
    pub landmarks: [Landmark; HandLandmark::COUNT],
}

impl RawLandmarks {
    /// 検出結果を検証して取り込む
    ///
    /// 空の検出（手なし）と点数不一致はどちらもエラー。
    /// 手なしフレームはパイプラインに渡す前に呼び出し側で除外すること。
    pub fn new(landmarks: &[Landmark]) -> Result<Self> {
        if landmarks.is_empty() {
            bail!("No hand landmarks provided");
        }
        if landmarks.len() != HandLandmark::COUNT {
            bail!(
                "Expected {} hand landmarks, got {}",
                HandLandmark::COUNT,
                landmarks.len()
            );
        }

        let mut out = [Landmark::default(); HandLandmark::COUNT];
        out.copy_from_slice(landmarks);
        Ok(Self { landmarks: out })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hand(n: usize) -> Vec<Landmark> {
        (0..n)
            .map(|i| Landmark::new(i as u32, i as f32 * 10.0, 400.0 - i as f32 * 5.0))
            .collect()
    }

    #[test]
    fn test_hand_landmark_count() {
        assert_eq!(HandLandmark::COUNT, 21);
    }

    #[test]
    fn test_raw_landmarks_accepts_21() {
        let raw = RawLandmarks::new(&hand(21)).unwrap();
        let tip = &raw.landmarks[HandLandmark::MiddleTip as usize];
        assert_eq!(tip.id, 12);
        assert_eq!(tip.x, 120.0);
    }

    #[test]
    fn test_raw_landmarks_rejects_empty() {
        let err = RawLandmarks::new(&[]).unwrap_err();
        assert!(err.to_string().contains("No hand"));
    }

    #[test]
    fn test_raw_landmarks_rejects_wrong_count() {
        assert!(RawLandmarks::new(&hand(20)).is_err());
        assert!(RawLandmarks::new(&hand(22)).is_err());
    }

    #[test]
    fn test_landmark_deserialize_from_triple() {
        let lm: Landmark = serde_json::from_str("[4, 120.5, 300]").unwrap();
        assert_eq!(lm, Landmark::new(4, 120.5, 300.0));
    }
}
