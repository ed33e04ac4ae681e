use crate::hand::HandLandmark;

/// 手の骨格の接続定義 (開始ランドマーク, 終了ランドマーク)
pub const HAND_CONNECTIONS: [(HandLandmark, HandLandmark); 21] = [
    // 掌
    (HandLandmark::Wrist, HandLandmark::ThumbCmc),
    (HandLandmark::Wrist, HandLandmark::IndexMcp),
    (HandLandmark::Wrist, HandLandmark::PinkyMcp),
    (HandLandmark::IndexMcp, HandLandmark::MiddleMcp),
    (HandLandmark::MiddleMcp, HandLandmark::RingMcp),
    (HandLandmark::RingMcp, HandLandmark::PinkyMcp),
    // 親指
    (HandLandmark::ThumbCmc, HandLandmark::ThumbMcp),
    (HandLandmark::ThumbMcp, HandLandmark::ThumbIp),
    (HandLandmark::ThumbIp, HandLandmark::ThumbTip),
    // 人差し指
    (HandLandmark::IndexMcp, HandLandmark::IndexPip),
    (HandLandmark::IndexPip, HandLandmark::IndexDip),
    (HandLandmark::IndexDip, HandLandmark::IndexTip),
    // 中指
    (HandLandmark::MiddleMcp, HandLandmark::MiddlePip),
    (HandLandmark::MiddlePip, HandLandmark::MiddleDip),
    (HandLandmark::MiddleDip, HandLandmark::MiddleTip),
    // 薬指
    (HandLandmark::RingMcp, HandLandmark::RingPip),
    (HandLandmark::RingPip, HandLandmark::RingDip),
    (HandLandmark::RingDip, HandLandmark::RingTip),
    // 小指
    (HandLandmark::PinkyMcp, HandLandmark::PinkyPip),
    (HandLandmark::PinkyPip, HandLandmark::PinkyDip),
    (HandLandmark::PinkyDip, HandLandmark::PinkyTip),
];

/// pitch 推定に使うランドマーク（強調表示）
pub const PITCH_LANDMARKS: [HandLandmark; 3] = [
    HandLandmark::ThumbTip,
    HandLandmark::IndexMcp,
    HandLandmark::IndexPip,
];

/// ランドマークの色 (RGB)
pub const LANDMARK_COLOR: u32 = 0x00FFFF; // シアン

/// 強調ランドマークの色 (RGB)
pub const HIGHLIGHT_COLOR: u32 = 0x00FF00; // 緑

/// 骨格線の色 (RGB)
pub const SKELETON_COLOR: u32 = 0xFF0000; // 赤

/// 向きベクトルの色 (RGB)
pub const ORIENTATION_COLOR: u32 = 0x0619DC; // 青
