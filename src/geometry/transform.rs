use anyhow::{ensure, Result};
use nalgebra::{Matrix3, Rotation2, Rotation3, Vector2, Vector3};
use std::f32::consts::PI;

use super::points::PointSet;

/// フレームサイズに依存する点群の幾何変換
///
/// 画像座標（原点左上, y下向き）から原点左下・y上向きへの反転、
/// 平行移動、回転、最大距離での正規化を提供する。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointTransform {
    height: f32,
    width: f32,
}

impl PointTransform {
    /// フレームサイズを指定して作成（高さ・幅とも正であること）
    pub fn new(height: u32, width: u32) -> Result<Self> {
        ensure!(
            height > 0 && width > 0,
            "Frame size must be positive, got {}x{}",
            width,
            height
        );
        Ok(Self {
            height: height as f32,
            width: width as f32,
        })
    }

    /// フレームサイズを更新（リサイズ時）
    pub fn set_size(&mut self, height: u32, width: u32) -> Result<()> {
        *self = Self::new(height, width)?;
        Ok(())
    }

    pub fn height(&self) -> f32 {
        self.height
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    /// 原点を左上から左下へ移す: y' = height - y
    pub fn convert_origin_bottom_left(&self, point: Vector2<f32>) -> Vector2<f32> {
        Vector2::new(point.x, self.height - point.y)
    }

    /// ベクトル p - q の +y軸（上方向）からの符号付き角度 [rad]
    ///
    /// 反時計回りが正、範囲は (-π, π]。-θ回転すると p - q が +y軸に揃う。
    pub fn find_angle(&self, p: Vector2<f32>, q: Vector2<f32>) -> f32 {
        let v = p - q;
        let theta = f32::atan2(-v.x, v.y);
        if theta <= -PI {
            PI
        } else {
            theta
        }
    }

    /// 全点の (x, y) に (dx, dy) を加える
    pub fn translate<P: PointSet>(&self, points: &mut P, dx: f32, dy: f32) {
        points.apply_affine(&Matrix3::new_translation(&Vector2::new(dx, dy)));
    }

    /// 原点からの最大距離で割り、手の大きさを1に揃える
    pub fn scale_max_distance<P: PointSet>(&self, points: &mut P) -> Result<()> {
        let max_dist = points.max_radial_distance();
        ensure!(
            max_dist > f32::EPSILON,
            "Cannot scale degenerate hand: all landmarks at the origin"
        );
        points.apply_affine(&Matrix3::new_scaling(1.0 / max_dist));
        Ok(())
    }

    /// 原点を中心に一様拡大
    pub fn scale<P: PointSet>(&self, points: &mut P, factor: f32) {
        points.apply_affine(&Matrix3::new_scaling(factor));
    }

    /// 全点を原点まわりに -theta 回転
    pub fn rotate<P: PointSet>(&self, points: &mut P, theta: f32) {
        points.apply_affine(&Rotation2::new(-theta).to_homogeneous());
    }

    /// z=0 とみなした2D点群に3D回転を適用し、xy平面へ正射影する
    ///
    /// 角度は度。roll は視線軸(z)、yaw は鉛直軸(y)、pitch は水平軸(x) まわり。
    /// 2D投影からの近似であり、正確な3D再投影ではない。
    pub fn rotate_3d<P: PointSet>(&self, points: &mut P, roll: f32, yaw: f32, pitch: f32) {
        let rotation = Rotation3::from_euler_angles(
            pitch.to_radians(),
            yaw.to_radians(),
            roll.to_radians(),
        );
        points.map_xy(|p| {
            let rotated = rotation * Vector3::new(p.x, p.y, 0.0);
            rotated.xy()
        });
    }
}
