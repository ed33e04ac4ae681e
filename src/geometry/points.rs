use nalgebra::{Matrix3, Vector2, Vector3};

use crate::hand::HandLandmark;

/// 21点の点群に共通する操作
///
/// 同次座標かデカルト座標かに関わらず、x, y の2成分のみを扱う。
pub trait PointSet {
    /// i番目の点の (x, y)
    fn xy(&self, index: usize) -> Vector2<f32>;

    /// 3x3 アフィン行列を全点に適用
    fn apply_affine(&mut self, m: &Matrix3<f32>);

    /// (x, y) を直接書き換える
    fn map_xy<F: FnMut(Vector2<f32>) -> Vector2<f32>>(&mut self, f: F);

    fn len(&self) -> usize {
        HandLandmark::COUNT
    }

    fn is_empty(&self) -> bool {
        false
    }

    /// ランドマーク指定で (x, y) を取得
    fn landmark(&self, index: HandLandmark) -> Vector2<f32> {
        self.xy(index as usize)
    }

    /// 原点からの最大距離
    fn max_radial_distance(&self) -> f32 {
        (0..self.len())
            .map(|i| self.xy(i).norm())
            .fold(0.0f32, f32::max)
    }

    /// 原点からの平均距離
    fn mean_radial_distance(&self) -> f32 {
        let sum: f32 = (0..self.len()).map(|i| self.xy(i).norm()).sum();
        sum / self.len() as f32
    }

    /// [x0, y0, x1, y1, ...] に平坦化（ジェスチャー分類器の入力形式）
    fn flatten_xy(&self) -> Vec<f32> {
        (0..self.len())
            .flat_map(|i| {
                let p = self.xy(i);
                [p.x, p.y]
            })
            .collect()
    }
}

/// デカルト座標の点群 (x, y)
#[derive(Debug, Clone, PartialEq)]
pub struct CartesianPoints {
    points: [Vector2<f32>; HandLandmark::COUNT],
}

impl CartesianPoints {
    pub fn new(points: [Vector2<f32>; HandLandmark::COUNT]) -> Self {
        Self { points }
    }

    pub fn from_fn<F: FnMut(usize) -> Vector2<f32>>(f: F) -> Self {
        Self::new(std::array::from_fn(f))
    }

    /// 同次座標 (x, y, 1) に変換
    pub fn to_homogeneous(&self) -> HomogeneousPoints {
        HomogeneousPoints::new(self.points.map(|p| p.push(1.0)))
    }

    pub fn points(&self) -> &[Vector2<f32>; HandLandmark::COUNT] {
        &self.points
    }
}

impl PointSet for CartesianPoints {
    fn xy(&self, index: usize) -> Vector2<f32> {
        self.points[index]
    }

    fn apply_affine(&mut self, m: &Matrix3<f32>) {
        for p in self.points.iter_mut() {
            *p = (m * p.push(1.0)).xy();
        }
    }

    fn map_xy<F: FnMut(Vector2<f32>) -> Vector2<f32>>(&mut self, mut f: F) {
        for p in self.points.iter_mut() {
            *p = f(*p);
        }
    }
}

/// 同次座標の点群 (x, y, 1)
#[derive(Debug, Clone, PartialEq)]
pub struct HomogeneousPoints {
    points: [Vector3<f32>; HandLandmark::COUNT],
}

impl HomogeneousPoints {
    pub fn new(points: [Vector3<f32>; HandLandmark::COUNT]) -> Self {
        Self { points }
    }

    /// 同次成分を落としてデカルト座標に戻す
    pub fn to_cartesian(&self) -> CartesianPoints {
        CartesianPoints::new(self.points.map(|p| p.xy()))
    }

    pub fn points(&self) -> &[Vector3<f32>; HandLandmark::COUNT] {
        &self.points
    }
}

impl PointSet for HomogeneousPoints {
    fn xy(&self, index: usize) -> Vector2<f32> {
        self.points[index].xy()
    }

    fn apply_affine(&mut self, m: &Matrix3<f32>) {
        for p in self.points.iter_mut() {
            *p = m * *p;
        }
    }

    fn map_xy<F: FnMut(Vector2<f32>) -> Vector2<f32>>(&mut self, mut f: F) {
        for p in self.points.iter_mut() {
            let xy = f(p.xy());
            p.x = xy.x;
            p.y = xy.y;
        }
    }
}
