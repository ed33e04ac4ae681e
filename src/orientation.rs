use nalgebra::{Matrix3, Vector2};

use crate::config::OrientationConfig;
use crate::geometry::PointSet;
use crate::hand::HandLandmark;

/// 手の向き [度]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Orientation {
    /// 視線軸まわり
    pub roll: f32,
    /// 鉛直軸まわり
    pub yaw: f32,
    /// 水平軸まわり
    pub pitch: f32,
}

impl Orientation {
    pub fn new(roll: f32, yaw: f32, pitch: f32) -> Self {
        Self { roll, yaw, pitch }
    }
}

/// 二次圧縮とソフトクランプの係数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OrientationEstimator {
    roll_deadband: f32,
    yaw_gain: f32,
    pitch_gain: f32,
    clamp_limit: f32,
    clamp_damping: f32,
}

impl OrientationEstimator {
    pub fn new() -> Self {
        Self::from_config(&OrientationConfig::default())
    }

    pub fn from_config(config: &OrientationConfig) -> Self {
        Self {
            roll_deadband: config.roll_deadband,
            yaw_gain: config.yaw_gain,
            pitch_gain: config.pitch_gain,
            clamp_limit: config.clamp_limit,
            clamp_damping: config.clamp_damping,
        }
    }

    /// 上向きに回転済みの手から roll / yaw / pitch を求める
    ///
    /// `theta` は回転で打ち消した面内角 [rad]
    pub fn estimate<P: PointSet>(&self, hand: &P, theta: f32) -> Orientation {
        let roll = compute_roll(theta);
        let yaw = self.compute_yaw(hand, roll);
        let pitch = self.compute_pitch(hand);
        Orientation::new(roll, yaw, pitch)
    }

    /// 指1本の曲がりから yaw を求める
    ///
    /// |roll| が不感帯以内なら中指、超えたら人差し指の関節を使う。
    pub fn compute_yaw<P: PointSet>(&self, hand: &P, roll: f32) -> f32 {
        let (p, q, r) = if roll < -self.roll_deadband || roll > self.roll_deadband {
            (HandLandmark::IndexMcp, HandLandmark::IndexPip, HandLandmark::IndexDip)
        } else {
            (HandLandmark::MiddleMcp, HandLandmark::MiddlePip, HandLandmark::MiddleDip)
        };

        self.orientation_test(hand.landmark(p), hand.landmark(q), hand.landmark(r))
    }

    /// `p → q → r` の回転方向を角度に変換。時計回り（行列式が負）で正
    pub fn orientation_test(&self, p: Vector2<f32>, q: Vector2<f32>, r: Vector2<f32>) -> f32 {
        let det = orientation_determinant(p, q, r);
        self.soft_clamp(squash(det, self.yaw_gain))
    }

    /// 人差し指 MCP/PIP の中点に対する親指先端の高さから pitch を求める
    pub fn compute_pitch<P: PointSet>(&self, hand: &P) -> f32 {
        let thumb_tip = hand.landmark(HandLandmark::ThumbTip);
        let index_mcp = hand.landmark(HandLandmark::IndexMcp);
        let index_pip = hand.landmark(HandLandmark::IndexPip);

        let point_zero = (index_mcp.y + index_pip.y) / 2.0;
        let offset = point_zero - thumb_tip.y;

        self.soft_clamp(squash(offset, self.pitch_gain))
    }

    /// ±limit を超えた分は `damping` 倍に減衰
    pub fn soft_clamp(&self, value: f32) -> f32 {
        let limit = self.clamp_limit;
        if value < -limit {
            -limit + (value + limit) * self.clamp_damping
        } else if value > limit {
            limit + (value - limit) * self.clamp_damping
        } else {
            value
        }
    }
}

impl Default for OrientationEstimator {
    fn default() -> Self {
        Self::new()
    }
}

/// roll = -theta [度]（圧縮なし）
pub fn compute_roll(theta: f32) -> f32 {
    -theta.to_degrees()
}

/// det [[1, px, py], [1, qx, qy], [1, rx, ry]]。反時計回りで正
pub fn orientation_determinant(p: Vector2<f32>, q: Vector2<f32>, r: Vector2<f32>) -> f32 {
    #[rustfmt::skip]
    let m = Matrix3::new(
        1.0, p.x, p.y,
        1.0, q.x, q.y,
        1.0, r.x, r.y,
    );
    m.determinant()
}

/// 0 付近で平坦な二次応答。符号は反転する（負の入力で正）
pub fn squash(value: f32, gain: f32) -> f32 {
    if value < 0.0 {
        value * value / gain
    } else {
        -(value * value) / gain
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::CartesianPoints;

    fn upright_hand() -> CartesianPoints {
        // 正規化済みの上向きの手 (作業スケール)
        let mut pts = [Vector2::zeros(); HandLandmark::COUNT];
        pts[HandLandmark::Wrist as usize] = Vector2::new(0.0, -50.0);
        pts[HandLandmark::ThumbTip as usize] = Vector2::new(-30.0, 0.0);
        pts[HandLandmark::IndexMcp as usize] = Vector2::new(-15.0, 0.0);
        pts[HandLandmark::IndexPip as usize] = Vector2::new(-15.0, 20.0);
        pts[HandLandmark::IndexDip as usize] = Vector2::new(-15.0, 35.0);
        pts[HandLandmark::MiddleMcp as usize] = Vector2::new(0.0, 0.0);
        pts[HandLandmark::MiddlePip as usize] = Vector2::new(0.0, 25.0);
        pts[HandLandmark::MiddleDip as usize] = Vector2::new(0.0, 40.0);
        pts[HandLandmark::MiddleTip as usize] = Vector2::new(0.0, 50.0);
        CartesianPoints::new(pts)
    }

    #[test]
    fn test_roll_is_negative_theta_degrees() {
        assert_eq!(compute_roll(0.5), -(0.5f32.to_degrees()));
        assert!((compute_roll(-std::f32::consts::FRAC_PI_2) - 90.0).abs() < 1e-4);
        assert_eq!(compute_roll(0.0), 0.0);
    }

    #[test]
    fn test_determinant_sign_counter_clockwise() {
        let p = Vector2::new(0.0, 0.0);
        let q = Vector2::new(10.0, 0.0);
        let r = Vector2::new(10.0, 10.0);
        assert!((orientation_determinant(p, q, r) - 100.0).abs() < 1e-3);
        assert!((orientation_determinant(p, r, q) + 100.0).abs() < 1e-3);
    }

    #[test]
    fn test_orientation_test_sign_inverted() {
        let est = OrientationEstimator::new();
        let p = Vector2::new(0.0, 0.0);
        let q = Vector2::new(10.0, 0.0);
        let r = Vector2::new(10.0, 10.0);
        // 反時計回り (det > 0) → 負の応答
        let ccw = est.orientation_test(p, q, r);
        assert!((ccw + 100.0 * 100.0 / 1666.0).abs() < 1e-3);
        // 時計回り → 正の応答
        let cw = est.orientation_test(p, r, q);
        assert!((cw - 100.0 * 100.0 / 1666.0).abs() < 1e-3);
    }

    #[test]
    fn test_orientation_test_sign_swaps_and_scaling() {
        let est = OrientationEstimator::new();
        let p = Vector2::new(1.0, 2.0);
        let q = Vector2::new(4.0, 3.0);
        let r = Vector2::new(2.0, 7.0);
        let base = est.orientation_test(p, q, r).signum();

        for (a, b, c) in [(q, p, r), (r, q, p), (p, r, q)] {
            assert_eq!(est.orientation_test(a, b, c).signum(), -base);
        }
        for k in [0.01f32, 3.0, 250.0] {
            assert_eq!(est.orientation_test(p * k, q * k, r * k).signum(), base);
        }
    }

    #[test]
    fn test_squash_quadratic_and_inverted() {
        assert!((squash(-31.0, 31.0) - 31.0).abs() < 1e-4);
        assert!((squash(31.0, 31.0) + 31.0).abs() < 1e-4);
        assert_eq!(squash(0.0, 31.0), 0.0);
    }

    #[test]
    fn test_soft_clamp() {
        let est = OrientationEstimator::new();
        assert_eq!(est.soft_clamp(45.0), 45.0);
        assert!((est.soft_clamp(190.0) - 100.0).abs() < 1e-4);
        assert!((est.soft_clamp(-190.0) + 100.0).abs() < 1e-4);
    }

    #[test]
    fn test_straight_upright_hand_has_zero_yaw() {
        let est = OrientationEstimator::new();
        let hand = upright_hand();
        assert_eq!(est.compute_yaw(&hand, 0.0), 0.0);
    }

    #[test]
    fn test_yaw_switches_finger_with_roll() {
        let est = OrientationEstimator::new();
        let mut pts = *upright_hand().points();
        // 人差し指だけ曲げる: index_dip を右へ
        pts[HandLandmark::IndexDip as usize] = Vector2::new(-5.0, 35.0);
        let hand = CartesianPoints::new(pts);

        // roll ≈ 0 → 中指 (真っ直ぐ) を使う
        assert_eq!(est.compute_yaw(&hand, 2.0), 0.0);
        // |roll| > 5 → 人差し指を使う（右に曲がる = 時計回り → 正）
        let left = est.compute_yaw(&hand, -30.0);
        let right = est.compute_yaw(&hand, 30.0);
        assert!(left > 0.0);
        assert_eq!(left, right);
    }

    #[test]
    fn test_pitch_from_thumb_offset() {
        let est = OrientationEstimator::new();
        let mut pts = *upright_hand().points();
        // index MCP/PIP 中点 y = 10, 親指先 y = 0 → offset = 10 → 負
        let hand = CartesianPoints::new(pts);
        let pitch = est.compute_pitch(&hand);
        assert!((pitch + 100.0 / 31.0).abs() < 1e-4);

        // 親指先を上へ → offset < 0 → 正
        pts[HandLandmark::ThumbTip as usize] = Vector2::new(-30.0, 20.0);
        let hand = CartesianPoints::new(pts);
        assert!((est.compute_pitch(&hand) - 100.0 / 31.0).abs() < 1e-4);
    }

    #[test]
    fn test_estimate_combines_all_three() {
        let est = OrientationEstimator::new();
        let hand = upright_hand();
        let o = est.estimate(&hand, 0.0);
        assert_eq!(o.roll, 0.0);
        assert_eq!(o.yaw, 0.0);
        assert_eq!(o.pitch, est.compute_pitch(&hand));
    }
}
