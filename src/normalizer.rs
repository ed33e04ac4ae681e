use anyhow::{Context, Result};
use nalgebra::Vector2;
use tracing::debug;

use crate::config::{Config, OrientationConfig};
use crate::geometry::{CartesianPoints, HomogeneousPoints, PointSet, PointTransform};
use crate::hand::{HandLandmark, Landmark, RawLandmarks};
use crate::orientation::{Orientation, OrientationEstimator};

/// 原点を左下に移した1フレーム分の手
#[derive(Debug, Clone)]
pub struct FlippedHand {
    pub points: CartesianPoints,
    /// 21点の重心（反転後の座標系）
    pub mean: Vector2<f32>,
}

/// 重心を原点に移し、最大距離で正規化した手
#[derive(Debug, Clone)]
pub struct NormalizedHand {
    /// 中指先端と手首のなす角 [rad]
    pub theta: f32,
    pub mean: Vector2<f32>,
    /// 重心移動のみ（スケール前）
    pub unscaled: HomogeneousPoints,
    /// 最大距離 = 1
    pub scaled: HomogeneousPoints,
}

impl NormalizedHand {
    /// ジェスチャー分類器への入力 (x0, y0, ..., x20, y20)
    pub fn features(&self) -> Vec<f32> {
        self.scaled.flatten_xy()
    }
}

/// 上向きに回転した作業スケールの手。姿勢推定はこの座標系で行う。
#[derive(Debug, Clone)]
pub struct CanonicalHand {
    pub points: CartesianPoints,
    pub theta: f32,
}

/// セッションで最初に観測した手（重心移動のみ、スケール前）
#[derive(Debug, Clone, PartialEq)]
pub struct ReferencePose {
    points: HomogeneousPoints,
}

impl ReferencePose {
    pub fn points(&self) -> &HomogeneousPoints {
        &self.points
    }
}

/// 1フレーム分の推定結果
#[derive(Debug, Clone)]
pub struct HandFrame {
    pub normalized: NormalizedHand,
    pub canonical: CanonicalHand,
    pub orientation: Orientation,
    pub depth: f32,
}

/// ランドマークから手の向きと相対的な奥行きを推定する
///
/// 基準姿勢はセッション中に一度だけ設定され、`reset` まで変わらない。
pub struct HandPoseNormalizer {
    transform: PointTransform,
    estimator: OrientationEstimator,
    working_scale: f32,
    reference: Option<ReferencePose>,
    current: Option<HomogeneousPoints>,
    zcoord: f32,
}

impl HandPoseNormalizer {
    pub fn new(height: u32, width: u32) -> Result<Self> {
        Self::with_orientation(height, width, &OrientationConfig::default())
    }

    /// 設定から作成
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::with_orientation(config.frame.height, config.frame.width, &config.orientation)
    }

    pub fn with_orientation(height: u32, width: u32, orientation: &OrientationConfig) -> Result<Self> {
        orientation.validate()?;
        Ok(Self {
            transform: PointTransform::new(height, width)?,
            estimator: OrientationEstimator::from_config(orientation),
            working_scale: orientation.working_scale,
            reference: None,
            current: None,
            zcoord: 0.0,
        })
    }

    /// フレームサイズを更新（基準姿勢は保持）
    pub fn set_size(&mut self, height: u32, width: u32) -> Result<()> {
        self.transform.set_size(height, width)
    }

    pub fn transform(&self) -> &PointTransform {
        &self.transform
    }

    pub fn reference(&self) -> Option<&ReferencePose> {
        self.reference.as_ref()
    }

    pub fn current(&self) -> Option<&HomogeneousPoints> {
        self.current.as_ref()
    }

    pub fn has_reference(&self) -> bool {
        self.reference.is_some()
    }

    /// 最後に計算した奥行き
    pub fn zcoord(&self) -> f32 {
        self.zcoord
    }

    /// 新しいセッションを開始する（基準姿勢を破棄）
    pub fn reset(&mut self) {
        self.reference = None;
        self.current = None;
        self.zcoord = 0.0;
        debug!("hand session reset");
    }

    /// 1フレーム分の全処理
    pub fn process(&mut self, landmarks: &[Landmark]) -> Result<HandFrame> {
        let flipped = self.set_array(landmarks)?;
        let normalized = self.normalize(&flipped)?;
        let canonical = self.rotate_points(&normalized);
        let orientation = self.compute_orientation(&canonical);
        let depth = self.compute_depth(&orientation)?;

        Ok(HandFrame {
            normalized,
            canonical,
            orientation,
            depth,
        })
    }

    /// ランドマークを取り込み、原点を反転して重心を求める
    pub fn set_array(&self, landmarks: &[Landmark]) -> Result<FlippedHand> {
        let raw = RawLandmarks::new(landmarks)?;
        let points = CartesianPoints::from_fn(|i| {
            let lm = &raw.landmarks[i];
            self.transform.convert_origin_bottom_left(Vector2::new(lm.x, lm.y))
        });

        let sum = points.points().iter().fold(Vector2::<f32>::zeros(), |acc, p| acc + p);
        let mean = sum / HandLandmark::COUNT as f32;

        Ok(FlippedHand { points, mean })
    }

    /// 角度算出・重心移動・最大距離正規化
    ///
    /// スケール前の姿勢を現在姿勢として保存し、最初の1回は基準姿勢にもする。
    pub fn normalize(&mut self, flipped: &FlippedHand) -> Result<NormalizedHand> {
        let theta = self.transform.find_angle(
            flipped.points.landmark(HandLandmark::MiddleTip),
            flipped.points.landmark(HandLandmark::Wrist),
        );

        let mut unscaled = flipped.points.to_homogeneous();
        self.transform
            .translate(&mut unscaled, -flipped.mean.x, -flipped.mean.y);

        let mut scaled = unscaled.clone();
        self.transform.scale_max_distance(&mut scaled)?;

        if self.reference.is_none() {
            debug!(theta, "reference hand pose captured");
            self.reference = Some(ReferencePose {
                points: unscaled.clone(),
            });
        }
        self.current = Some(unscaled.clone());

        Ok(NormalizedHand {
            theta,
            mean: flipped.mean,
            unscaled,
            scaled,
        })
    }

    /// 作業スケールに拡大して theta 回転し、手を上向きに揃える
    pub fn rotate_points(&self, normalized: &NormalizedHand) -> CanonicalHand {
        let mut points = normalized.scaled.clone();
        self.transform.scale(&mut points, self.working_scale);
        self.transform.rotate(&mut points, normalized.theta);

        CanonicalHand {
            points: points.to_cartesian(),
            theta: normalized.theta,
        }
    }

    /// roll, yaw, pitch [deg]
    pub fn compute_orientation(&self, canonical: &CanonicalHand) -> Orientation {
        self.estimator.estimate(&canonical.points, canonical.theta)
    }

    /// 基準姿勢を現在の向きに回転させ、平均半径の差を奥行きとする
    ///
    /// 正の値は基準より手が大きく見える（近づいた）ことを表す。
    pub fn compute_depth(&mut self, orientation: &Orientation) -> Result<f32> {
        let reference = self
            .reference
            .as_ref()
            .context("No reference hand pose yet")?;
        let current = self.current.as_ref().context("No current hand pose yet")?;

        self.zcoord = estimate_depth(&self.transform, reference.points(), current, orientation);
        Ok(self.zcoord)
    }
}

/// 回転補正した基準姿勢と現在姿勢の平均半径の差
pub fn estimate_depth<P: PointSet + Clone>(
    transform: &PointTransform,
    reference: &P,
    current: &P,
    orientation: &Orientation,
) -> f32 {
    let mut rotated = reference.clone();
    transform.rotate_3d(&mut rotated, orientation.roll, orientation.yaw, orientation.pitch);

    current.mean_radial_distance() - rotated.mean_radial_distance()
}
