//! Character-grid renderer for terminals and logs

use super::{DrawList, Renderer, SpriteKind};
use crate::sim::EnemyKind;

/// Rasterizes a [`DrawList`] onto a coarse character grid
#[derive(Debug, Clone)]
pub struct TextRenderer {
    cols: usize,
    rows: usize,
    last: String,
}

impl TextRenderer {
    pub fn new(cols: usize, rows: usize) -> Self {
        Self {
            cols: cols.max(1),
            rows: rows.max(1),
            last: String::new(),
        }
    }

    /// The most recently drawn frame
    pub fn output(&self) -> &str {
        &self.last
    }

    fn glyph(kind: SpriteKind) -> char {
        match kind {
            SpriteKind::Player => 'A',
            SpriteKind::PlayerBullet => '|',
            SpriteKind::EnemyBullet => '!',
            SpriteKind::Enemy(EnemyKind::Boat) => 'b',
            SpriteKind::Enemy(EnemyKind::Helicopter) => 'h',
            SpriteKind::Enemy(EnemyKind::FastBoat) => 'f',
            SpriteKind::Enemy(EnemyKind::HeavyBoat) => 'H',
            SpriteKind::Enemy(EnemyKind::ShooterBoat) => 's',
            SpriteKind::Fuel => 'F',
            SpriteKind::BridgeSection => '=',
        }
    }
}

impl Renderer for TextRenderer {
    fn draw(&mut self, frame: &DrawList) {
        if frame.width <= 0.0 || frame.height <= 0.0 {
            self.last.clear();
            return;
        }
        let sx = self.cols as f32 / frame.width;
        let sy = self.rows as f32 / frame.height;
        let col_of = |x: f32| ((x * sx).floor().max(0.0) as usize).min(self.cols);
        let row_of = |y: f32| ((y * sy).floor().max(0.0) as usize).min(self.rows);

        let (bank_left, bank_right) = (col_of(frame.channel.0), col_of(frame.channel.1));
        let mut grid: Vec<Vec<char>> = (0..self.rows)
            .map(|_| {
                (0..self.cols)
                    .map(|c| if c < bank_left || c >= bank_right { '#' } else { ' ' })
                    .collect()
            })
            .collect();

        for sprite in &frame.sprites {
            let rect = sprite.rect;
            if rect.bottom() < 0.0 || rect.top() > frame.height {
                continue;
            }
            let (c0, c1) = (col_of(rect.left()), col_of(rect.right()).max(col_of(rect.left()) + 1));
            let (r0, r1) = (row_of(rect.top()), row_of(rect.bottom()).max(row_of(rect.top()) + 1));
            let glyph = Self::glyph(sprite.kind);
            for row in grid.iter_mut().take(r1.min(self.rows)).skip(r0) {
                for cell in row.iter_mut().take(c1.min(self.cols)).skip(c0) {
                    *cell = glyph;
                }
            }
        }

        let hud = &frame.hud;
        let mut out = format!(
            "score {}  fuel {:.0}  lives {}  section {}  x{:.1}  {:?}\n",
            hud.score, hud.fuel, hud.lives, hud.section, hud.difficulty, hud.phase
        );
        if let Some(banner) = frame.banner {
            out.push_str(&format!("-- section {} complete --\n", banner.section));
        }
        for row in grid {
            out.extend(row);
            out.push('\n');
        }
        self.last = out;
    }
}
