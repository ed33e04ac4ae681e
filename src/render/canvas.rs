use anyhow::{ensure, Result};
use nalgebra::Vector2;

use crate::geometry::{PointSet, PointTransform};
use crate::hand::{HandLandmark, Landmark};
use crate::normalizer::ReferencePose;
use crate::orientation::Orientation;
use crate::render::skeleton::{
    HAND_CONNECTIONS, HIGHLIGHT_COLOR, LANDMARK_COLOR, ORIENTATION_COLOR, PITCH_LANDMARKS,
    SKELETON_COLOR,
};

/// 変換後の手を描く中心 (原点左下の座標系)
pub const TRANSFORMED_HAND_OFFSET: (f32, f32) = (130.0, 350.0);

/// 基準姿勢の手を描く中心 (原点左下の座標系)
pub const FIXED_HAND_OFFSET: (f32, f32) = (130.0, 100.0);

/// 向きベクトルの長さ（手首→中指先端の倍率）
const ORIENTATION_VECTOR_GAIN: f32 = 1.2;

/// 矢じりの長さ（矢印全長に対する比）
const ARROW_TIP_RATIO: f32 = 0.3;

const LANDMARK_RADIUS: i32 = 2;

/// 画面外の座標はキャンバス寸法のこの倍数に丸める
const PIXEL_CLAMP_FACTOR: f32 = 4.0;

/// 呼び出し側が持つ 0RGB バッファへの描画
pub struct Canvas<'a> {
    buffer: &'a mut [u32],
    width: usize,
    height: usize,
}

impl<'a> Canvas<'a> {
    pub fn new(buffer: &'a mut [u32], width: usize, height: usize) -> Result<Self> {
        ensure!(
            buffer.len() == width * height,
            "Buffer size {} does not match {}x{}",
            buffer.len(),
            width,
            height
        );
        Ok(Self {
            buffer,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn clear(&mut self, color: u32) {
        self.buffer.fill(color);
    }

    /// 正規化後（作業スケール、回転前）の手を描画
    pub fn draw_all_hand_transformed<P: PointSet>(&mut self, hand: &P) {
        let mut pts = hand.flatten_xy();
        let (dx, dy) = TRANSFORMED_HAND_OFFSET;
        for p in pts.chunks_mut(2) {
            p[0] += dx;
            p[1] += dy;
        }
        self.draw_hand(&pts);
    }

    /// 基準姿勢を現在の向きに回転して描画
    pub fn draw_fixed_hand(
        &mut self,
        transform: &PointTransform,
        reference: &ReferencePose,
        orientation: &Orientation,
        scale: f32,
    ) -> Result<()> {
        let mut hand = reference.points().clone();
        transform.scale_max_distance(&mut hand)?;
        transform.rotate_3d(&mut hand, orientation.roll, orientation.yaw, orientation.pitch);
        transform.scale(&mut hand, scale);
        let (dx, dy) = FIXED_HAND_OFFSET;
        transform.translate(&mut hand, dx, dy);

        self.draw_hand(&hand.flatten_xy());
        Ok(())
    }

    /// 手首から中指先端方向への矢印（画像座標）
    pub fn draw_orientation_vector(&mut self, landmarks: &[Landmark]) -> Result<()> {
        ensure!(
            landmarks.len() == HandLandmark::COUNT,
            "Expected {} hand landmarks, got {}",
            HandLandmark::COUNT,
            landmarks.len()
        );
        let wrist = &landmarks[HandLandmark::Wrist as usize];
        let tip = &landmarks[HandLandmark::MiddleTip as usize];

        let start = Vector2::new(wrist.x, wrist.y);
        let end = start + (Vector2::new(tip.x, tip.y) - start) * ORIENTATION_VECTOR_GAIN;
        self.draw_arrow(start, end, ORIENTATION_COLOR);
        Ok(())
    }

    /// 原点左下の座標列 [x0, y0, ...] を y 反転して骨格ごと描く
    fn draw_hand(&mut self, xy: &[f32]) {
        let h = self.height as f32;
        let pixels: [(i32, i32); HandLandmark::COUNT] =
            std::array::from_fn(|i| self.clamp_pixel(Vector2::new(xy[2 * i], h - xy[2 * i + 1])));

        for (start, end) in HAND_CONNECTIONS.iter() {
            let (x1, y1) = pixels[*start as usize];
            let (x2, y2) = pixels[*end as usize];
            self.draw_line(x1, y1, x2, y2, SKELETON_COLOR);
        }

        for &(px, py) in pixels.iter() {
            self.draw_circle(px, py, LANDMARK_RADIUS, LANDMARK_COLOR);
        }

        for lm in PITCH_LANDMARKS.iter() {
            let (px, py) = pixels[*lm as usize];
            self.draw_circle(px, py, LANDMARK_RADIUS, HIGHLIGHT_COLOR);
        }
    }

    /// 矢じりは本体から ±45°
    fn draw_arrow(&mut self, start: Vector2<f32>, end: Vector2<f32>, color: u32) {
        let (x0, y0) = self.clamp_pixel(start);
        let (x1, y1) = self.clamp_pixel(end);
        self.draw_line(x0, y0, x1, y1, color);

        let back = start - end;
        let len = back.norm();
        if len < 1.0 {
            return;
        }
        let back = back / len * (len * ARROW_TIP_RATIO);
        let (s, c) = std::f32::consts::FRAC_PI_4.sin_cos();
        for sign in [1.0f32, -1.0] {
            let wing = Vector2::new(
                back.x * c - sign * back.y * s,
                sign * back.x * s + back.y * c,
            );
            let (tx, ty) = self.clamp_pixel(end + wing);
            self.draw_line(x1, y1, tx, ty, color);
        }
    }

    /// 画素座標へ丸める（±寸法×4 に制限、NaN は下限）
    fn clamp_pixel(&self, p: Vector2<f32>) -> (i32, i32) {
        let clamp = |v: f32, size: usize| {
            let m = size.max(1) as f32 * PIXEL_CLAMP_FACTOR;
            if v.is_nan() {
                -m
            } else {
                v.clamp(-m, m)
            }
        };
        (clamp(p.x, self.width) as i32, clamp(p.y, self.height) as i32)
    }

    /// Bresenhamのアルゴリズムで線を描画
    pub fn draw_line(&mut self, x0: i32, y0: i32, x1: i32, y1: i32, color: u32) {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        let sx = if x0 < x1 { 1 } else { -1 };
        let sy = if y0 < y1 { 1 } else { -1 };
        let mut err = dx + dy;

        let mut x = x0;
        let mut y = y0;

        loop {
            self.set_pixel(x, y, color);

            if x == x1 && y == y1 {
                break;
            }

            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                x += sx;
            }
            if e2 <= dx {
                err += dx;
                y += sy;
            }
        }
    }

    /// 円を描画（塗りつぶし）
    pub fn draw_circle(&mut self, cx: i32, cy: i32, radius: i32, color: u32) {
        for dy in -radius..=radius {
            for dx in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.set_pixel(cx + dx, cy + dy, color);
                }
            }
        }
    }

    /// ピクセルをセット（境界チェック付き）
    pub fn set_pixel(&mut self, x: i32, y: i32, color: u32) {
        if x >= 0 && x < self.width as i32 && y >= 0 && y < self.height as i32 {
            self.buffer[y as usize * self.width + x as usize] = color;
        }
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<u32> {
        if x < self.width && y < self.height {
            Some(self.buffer[y * self.width + x])
        } else {
            None
        }
    }
}
