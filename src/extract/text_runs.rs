//! Grouping of glyph runs into text blocks.
//!
//! A single greedy pass: each run is compared against the most recently
//! added run of the open block. If it sits within half a font size
//! vertically and less than two font sizes after it horizontally, it
//! joins the block; otherwise the block is closed and a new one starts.
//! There is no backtracking and no column or reading-order analysis.

use serde::{Deserialize, Serialize};

use super::glyph::{GlyphRun, PlacedRun};
use crate::error::Result;
use crate::geometry::Rect;

/// Vertical merge threshold as a fraction of the incoming run's font size.
pub const VERTICAL_MERGE_FACTOR: f32 = 0.5;

/// Horizontal merge threshold as a multiple of the incoming run's font size.
pub const HORIZONTAL_MERGE_FACTOR: f32 = 2.0;

/// A finalized cluster of contiguous glyph runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    /// Run texts joined with single spaces.
    pub text: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Font size of the block's first run.
    pub font_size: f32,
}

impl TextBlock {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// The open block plus the run most recently added to it.
#[derive(Debug)]
struct OpenBlock {
    block: TextBlock,
    last: PlacedRun,
}

impl OpenBlock {
    fn seed(text: &str, run: PlacedRun) -> Self {
        Self {
            block: TextBlock {
                text: text.to_string(),
                x: run.x,
                y: run.y,
                width: run.width,
                height: run.height,
                font_size: run.font_size,
            },
            last: run,
        }
    }

    fn accepts(&self, run: &PlacedRun) -> bool {
        let distance_y = (run.y - self.last.y).abs();
        let distance_x = run.x - (self.last.x + self.last.width);
        distance_y < run.font_size * VERTICAL_MERGE_FACTOR
            && distance_x < run.font_size * HORIZONTAL_MERGE_FACTOR
    }

    /// Append a run and grow the bounding box so it still covers every run.
    ///
    /// For runs that advance left to right on one baseline this is exactly
    /// `width = run.right − block.x` and `height = max(height, run.height)`.
    fn extend(&mut self, text: &str, run: PlacedRun) {
        let block = &mut self.block;
        block.text.push(' ');
        block.text.push_str(text);

        let left = block.x.min(run.x);
        let top = block.y.min(run.y);
        let right = (block.x + block.width).max(run.x + run.width);
        let bottom = (block.y + block.height).max(run.y + run.height);

        block.x = left;
        block.y = top;
        block.width = right - left;
        block.height = bottom - top;
        self.last = run;
    }
}

/// Incremental text-block builder for one page.
#[derive(Debug, Default)]
pub struct TextBlockBuilder {
    open: Option<OpenBlock>,
    done: Vec<TextBlock>,
}

impl TextBlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed the next run in content order.
    pub fn push(&mut self, text: &str, run: PlacedRun) {
        match self.open.as_mut() {
            Some(open) if open.accepts(&run) => open.extend(text, run),
            _ => {
                self.close();
                self.open = Some(OpenBlock::seed(text, run));
            }
        }
    }

    fn close(&mut self) {
        if let Some(open) = self.open.take() {
            if open.block.text.trim().is_empty() {
                log::debug!("Dropping whitespace-only block at ({}, {})", open.block.x, open.block.y);
            } else {
                self.done.push(open.block);
            }
        }
    }

    /// Close the pending block and return all blocks in order.
    pub fn finish(mut self) -> Vec<TextBlock> {
        self.close();
        self.done
    }
}

/// Group one page's glyph runs into text blocks.
///
/// Fails with [`crate::Error::MalformedGlyphRun`] on the first run that
/// has no usable geometry.
pub fn group_runs(runs: &[GlyphRun], viewport_height: f32, page: u32) -> Result<Vec<TextBlock>> {
    let mut builder = TextBlockBuilder::new();
    for (index, run) in runs.iter().enumerate() {
        let placed = run.place(viewport_height, page, index)?;
        builder.push(&run.text, placed);
    }
    Ok(builder.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::extract::glyph::Transform;

    const VH: f32 = 1000.0;

    /// Run whose flipped y equals `y`.
    fn run(text: &str, x: f32, y: f32, width: f32, size: f32) -> GlyphRun {
        GlyphRun::new(
            text,
            Transform::new(size, 0.0, 0.0, size, x, VH - y),
            width,
            size,
        )
    }

    #[test]
    fn test_same_line_runs_merge() {
        let runs = vec![
            run("Hello", 100.0, 100.0, 40.0, 16.0),
            run("world", 145.0, 100.0, 40.0, 16.0),
        ];
        let blocks = group_runs(&runs, VH, 1).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "Hello world");
        assert_eq!(blocks[0].x, 100.0);
        assert_eq!(blocks[0].width, 85.0);
        assert_eq!(blocks[0].height, 16.0);
    }

    #[test]
    fn test_far_runs_split() {
        let runs = vec![
            run("Title", 100.0, 100.0, 40.0, 16.0),
            run("Body", 100.0, 200.0, 40.0, 16.0),
            run("Aside", 400.0, 200.0, 40.0, 16.0),
        ];
        let blocks = group_runs(&runs, VH, 1).unwrap();
        let texts: Vec<&str> = blocks.iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["Title", "Body", "Aside"]);
    }

    #[test]
    fn test_thresholds_are_strict() {
        // Exactly 0.5 × font size apart vertically: not merged.
        let runs = vec![
            run("a", 0.0, 100.0, 10.0, 16.0),
            run("b", 10.0, 108.0, 10.0, 16.0),
        ];
        assert_eq!(group_runs(&runs, VH, 1).unwrap().len(), 2);

        // Exactly 2 × font size gap horizontally: not merged.
        let runs = vec![
            run("a", 0.0, 100.0, 10.0, 16.0),
            run("b", 42.0, 100.0, 10.0, 16.0),
        ];
        assert_eq!(group_runs(&runs, VH, 1).unwrap().len(), 2);
    }

    #[test]
    fn test_compares_against_last_run_not_first() {
        // Each step is small, the total drift is large.
        let runs = vec![
            run("a", 0.0, 100.0, 10.0, 10.0),
            run("b", 12.0, 104.0, 10.0, 10.0),
            run("c", 24.0, 108.0, 10.0, 10.0),
        ];
        let blocks = group_runs(&runs, VH, 1).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "a b c");
    }

    #[test]
    fn test_identical_position_merges() {
        let runs = vec![
            run("x", 50.0, 50.0, 0.0, 12.0),
            run("y", 50.0, 50.0, 0.0, 12.0),
        ];
        assert_eq!(group_runs(&runs, VH, 1).unwrap().len(), 1);
    }

    #[test]
    fn test_whitespace_blocks_dropped() {
        let runs = vec![
            run("   ", 0.0, 10.0, 10.0, 12.0),
            run("text", 0.0, 300.0, 10.0, 12.0),
            run(" ", 0.0, 600.0, 10.0, 12.0),
        ];
        let blocks = group_runs(&runs, VH, 1).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].text, "text");
    }

    #[test]
    fn test_font_size_comes_from_first_run() {
        let runs = vec![
            run("big", 0.0, 100.0, 30.0, 20.0),
            run("small", 32.0, 100.0, 20.0, 12.0),
        ];
        let blocks = group_runs(&runs, VH, 1).unwrap();
        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].font_size, 20.0);
        assert_eq!(blocks[0].height, 20.0);
    }

    #[test]
    fn test_bounds_cover_every_run() {
        let runs = vec![
            run("a", 100.0, 100.0, 30.0, 16.0),
            run("b", 90.0, 97.0, 20.0, 18.0),
            run("c", 115.0, 103.0, 5.0, 16.0),
            run("d", 125.0, 99.0, 40.0, 14.0),
        ];
        let blocks = group_runs(&runs, VH, 1).unwrap();
        assert_eq!(blocks.len(), 1);
        let bounds = blocks[0].bounds();
        for r in &runs {
            let p = r.place(VH, 1, 0).unwrap();
            assert!(bounds.contains_rect(&Rect::new(p.x, p.y, p.width, p.height)));
        }
    }

    #[test]
    fn test_malformed_run_fails() {
        let mut runs = vec![run("ok", 0.0, 0.0, 1.0, 12.0)];
        runs.push(GlyphRun {
            text: "bad".to_string(),
            transform: None,
            width: 1.0,
            height: 1.0,
        });
        let err = group_runs(&runs, VH, 5).unwrap_err();
        assert!(matches!(err, Error::MalformedGlyphRun { page: 5, index: 1, .. }));
    }

    #[test]
    fn test_empty_input() {
        assert!(group_runs(&[], VH, 1).unwrap().is_empty());
    }
}
