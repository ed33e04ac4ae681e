use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::hand::Landmark;

/// 1フレーム分の検出結果
#[derive(Debug, Clone, PartialEq)]
pub enum Detection {
    /// 手が見つからなかった
    NoHand,
    /// 検出器が返したランドマーク
    Hand(Vec<Landmark>),
}

/// フレームごとにランドマークを供給する外部検出器
pub trait LandmarkSource {
    /// 次のフレームの検出結果。ストリーム終端で None
    fn next_detection(&mut self) -> Result<Option<Detection>>;

    /// フレームサイズ (height, width)。不明なら None
    fn frame_size(&self) -> Option<(u32, u32)> {
        None
    }
}

/// 記録済みランドマークの再生
///
/// 1行1フレームの JSON 配列。`[]` は手なし、それ以外は `[[id, x, y], ...]`。
/// 空行は読み飛ばす。
pub struct JsonLinesSource<R> {
    reader: R,
    line: String,
    line_no: usize,
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .with_context(|| format!("Failed to open landmark file {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            line_no: 0,
        }
    }
}

impl<R: BufRead> LandmarkSource for JsonLinesSource<R> {
    fn next_detection(&mut self) -> Result<Option<Detection>> {
        loop {
            self.line.clear();
            let n = self
                .reader
                .read_line(&mut self.line)
                .context("Failed to read landmark line")?;
            if n == 0 {
                return Ok(None);
            }
            self.line_no += 1;

            let trimmed = self.line.trim();
            if trimmed.is_empty() {
                continue;
            }

            let landmarks: Vec<Landmark> = serde_json::from_str(trimmed)
                .with_context(|| format!("Invalid landmarks on line {}", self.line_no))?;

            let detection = if landmarks.is_empty() {
                Detection::NoHand
            } else {
                Detection::Hand(landmarks)
            };
            return Ok(Some(detection));
        }
    }
}
